//! Domain-specific errors.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failure to bring up the global keyboard hook. Always fatal to startup.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("global keyboard hooks are not supported on {platform}")]
    Unsupported { platform: &'static str },
    #[error(
        "failed to install the keyboard event tap ({0}); grant Input Monitoring and Accessibility permissions in System Settings"
    )]
    InstallDenied(String),
}

/// Error returned when a chord description such as `cmd+x` cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    #[error("chord is empty")]
    Empty,
    #[error("'{0}' is neither a modifier nor a supported key")]
    UnknownKey(String),
    #[error("chord '{0}' names no key")]
    MissingKey(String),
    #[error("chord '{0}' needs at least one modifier")]
    MissingModifier(String),
    #[error("chord '{0}' names more than one key")]
    MultipleKeys(String),
    #[error("cut and paste are both bound to '{0}'")]
    Duplicate(String),
    #[error("'{broad}' also matches '{narrow}', so one of them could never fire")]
    Overlapping { broad: String, narrow: String },
}

/// Failure talking to the file manager. Never leaves the provider adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to launch osascript: {0}")]
    Spawn(#[source] io::Error),
    #[error("script exited with {status}: {stderr}")]
    Script { status: ExitStatus, stderr: String },
    #[error("script did not finish within {0:?}")]
    Timeout(Duration),
    #[error("failed waiting for script: {0}")]
    Io(#[source] io::Error),
    #[error("script printed unexpected output: {0}")]
    Malformed(#[source] serde_json::Error),
}
