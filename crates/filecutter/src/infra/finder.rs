//! Finder integration through `osascript` and JavaScript for Automation.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::errors::ProviderError;
use crate::infra::config::FinderSettings;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

// Both scripts print JSON so that names containing newlines survive the trip intact.
const SELECTION_SCRIPT: &str = r#"
ObjC.import("Foundation");
const paths = [];
for (const item of Application("Finder").selection()) {
    try {
        paths.push($.NSURL.URLWithString(item.url()).path.js);
    } catch (e) {}
}
JSON.stringify(paths);
"#;

const DIRECTORY_SCRIPT: &str = r#"
ObjC.import("Foundation");
let target = null;
try {
    const url = Application("Finder").finderWindows[0].target().url();
    target = $.NSURL.URLWithString(url).path.js;
} catch (e) {}
JSON.stringify(target);
"#;

const ACTIVATE_PREFIX: &str = "Application(\"Finder\").activate();\n";

/// Answers "what is selected" and "where am I" for the active file manager window.
///
/// Implementations never fail outward: anything that goes wrong is reported as an empty
/// selection or an absent directory.
pub trait SelectionProvider: Send + Sync {
    /// Absolute paths of the selected items, empty when nothing is selected or the query failed.
    fn current_selection(&self) -> Vec<PathBuf>;

    /// Directory shown by the front window, `None` when it cannot be resolved.
    fn current_directory(&self) -> Option<PathBuf>;
}

impl<T: SelectionProvider + ?Sized> SelectionProvider for Arc<T> {
    fn current_selection(&self) -> Vec<PathBuf> {
        (**self).current_selection()
    }

    fn current_directory(&self) -> Option<PathBuf> {
        (**self).current_directory()
    }
}

/// Queries Finder by running JavaScript for Automation through `osascript`.
#[derive(Debug, Clone)]
pub struct FinderProvider {
    timeout: Duration,
    activate: bool,
}

impl FinderProvider {
    pub fn new(timeout: Duration, activate: bool) -> Self {
        Self { timeout, activate }
    }

    pub fn from_settings(settings: &FinderSettings) -> Self {
        Self::new(settings.timeout(), settings.activate())
    }

    fn script(&self, body: &str) -> String {
        if self.activate {
            format!("{ACTIVATE_PREFIX}{body}")
        } else {
            body.to_owned()
        }
    }

    fn run(&self, body: &str) -> Result<String, ProviderError> {
        run_osascript(&self.script(body), self.timeout)
    }
}

impl SelectionProvider for FinderProvider {
    fn current_selection(&self) -> Vec<PathBuf> {
        match self
            .run(SELECTION_SCRIPT)
            .and_then(|output| parse_selection(&output))
        {
            Ok(paths) => {
                tracing::debug!(count = paths.len(), "finder selection");
                paths
            }
            Err(err) => {
                tracing::warn!(error = %err, "finder selection unavailable");
                Vec::new()
            }
        }
    }

    fn current_directory(&self) -> Option<PathBuf> {
        match self
            .run(DIRECTORY_SCRIPT)
            .and_then(|output| parse_directory(&output))
        {
            Ok(directory) => {
                tracing::debug!(directory = ?directory, "finder directory");
                directory
            }
            Err(err) => {
                tracing::warn!(error = %err, "finder directory unavailable");
                None
            }
        }
    }
}

/// Run a JavaScript for Automation script, killing `osascript` if it outlives `timeout`.
fn run_osascript(script: &str, timeout: Duration) -> Result<String, ProviderError> {
    let mut child = Command::new("osascript")
        .args(["-l", "JavaScript", "-e", script])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ProviderError::Spawn)?;

    // Drain both pipes on helper threads so a large selection cannot fill a pipe and stall us.
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = wait_with_deadline(&mut child, timeout)?;
    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if !status.success() {
        return Err(ProviderError::Script {
            status,
            stderr: stderr.trim().to_owned(),
        });
    }
    Ok(stdout)
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<std::process::ExitStatus, ProviderError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(ProviderError::Io)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProviderError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// A JSON array of POSIX paths, one element per selected item. Relative entries are dropped.
pub fn parse_selection(output: &str) -> Result<Vec<PathBuf>, ProviderError> {
    let paths: Vec<String> =
        serde_json::from_str(output.trim()).map_err(ProviderError::Malformed)?;
    Ok(paths
        .into_iter()
        .filter(|path| path.starts_with('/'))
        .map(PathBuf::from)
        .collect())
}

/// A JSON string holding one POSIX path, or `null` when Finder has no window to report.
pub fn parse_directory(output: &str) -> Result<Option<PathBuf>, ProviderError> {
    let path: Option<String> =
        serde_json::from_str(output.trim()).map_err(ProviderError::Malformed)?;
    Ok(path.filter(|path| path.starts_with('/')).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_in_order() -> Result<(), ProviderError> {
        let output = "[\"/Users/a/doc.txt\",\"/Users/a/Pictures\"]\n";
        assert_eq!(
            parse_selection(output)?,
            vec![
                PathBuf::from("/Users/a/doc.txt"),
                PathBuf::from("/Users/a/Pictures"),
            ]
        );
        Ok(())
    }

    #[test]
    fn newline_in_a_name_stays_one_path() -> Result<(), ProviderError> {
        let output = r#"["/Users/a/Downloads/evil\n/Users/a/Documents"]"#;
        assert_eq!(
            parse_selection(output)?,
            vec![PathBuf::from("/Users/a/Downloads/evil\n/Users/a/Documents")]
        );
        Ok(())
    }

    #[test]
    fn selection_drops_relative_entries() -> Result<(), ProviderError> {
        assert!(parse_selection("[]\n")?.is_empty());
        assert_eq!(
            parse_selection(r#"["missing value", "/ok"]"#)?,
            vec![PathBuf::from("/ok")]
        );
        Ok(())
    }

    #[test]
    fn selection_keeps_paths_with_spaces() -> Result<(), ProviderError> {
        assert_eq!(
            parse_selection(r#"["/Users/a/My File .txt"]"#)?,
            vec![PathBuf::from("/Users/a/My File .txt")]
        );
        Ok(())
    }

    #[test]
    fn non_json_output_is_malformed() {
        assert!(matches!(
            parse_selection("/Users/a/doc.txt\n"),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(parse_directory(""), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn missing_window_is_absent() -> Result<(), ProviderError> {
        assert_eq!(parse_directory("null\n")?, None);
        Ok(())
    }

    #[test]
    fn directory_is_kept_verbatim() -> Result<(), ProviderError> {
        assert_eq!(parse_directory("\"/\"\n")?, Some(PathBuf::from("/")));
        assert_eq!(
            parse_directory(r#""/Users/a/Line\nBreak""#)?,
            Some(PathBuf::from("/Users/a/Line\nBreak"))
        );
        Ok(())
    }

    #[test]
    fn activation_is_prepended_only_when_enabled() {
        let quiet = FinderProvider::new(Duration::from_secs(1), false);
        assert!(!quiet.script(DIRECTORY_SCRIPT).contains("activate"));

        let loud = FinderProvider::new(Duration::from_secs(1), true);
        assert!(loud.script(DIRECTORY_SCRIPT).starts_with(ACTIVATE_PREFIX));
    }

    #[cfg(unix)]
    #[test]
    fn slow_process_times_out() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let started = Instant::now();
        let result = wait_with_deadline(&mut child, Duration::from_millis(50));
        assert!(matches!(result, Err(ProviderError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn missing_osascript_reports_unavailable() {
        let provider = FinderProvider::new(Duration::from_millis(200), false);
        assert!(provider.current_selection().is_empty());
        assert_eq!(provider.current_directory(), None);
    }
}
