//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static USER_CONFIG_PATH: &str = "filecutter/config.toml";

/// Layered configuration loaded from defaults, user config, an explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub chords: Chords,
    #[serde(default)]
    pub finder: FinderSettings,
    #[serde(default)]
    pub dispatch: Dispatch,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Chords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cut: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paste: Option<String>,
}

impl Chords {
    fn default_cut() -> &'static str {
        "cmd+x"
    }

    fn default_paste() -> &'static str {
        "cmd+v"
    }

    pub fn cut(&self) -> &str {
        self.cut.as_deref().unwrap_or(Self::default_cut())
    }

    pub fn paste(&self) -> &str {
        self.paste.as_deref().unwrap_or(Self::default_paste())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FinderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    activate: Option<bool>,
}

impl FinderSettings {
    fn default_timeout_ms() -> u64 {
        2_000
    }

    /// Upper bound on a single Finder query; a query that runs longer counts as unavailable.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or_else(Self::default_timeout_ms))
    }

    pub fn activate(&self) -> bool {
        self.activate.unwrap_or(false)
    }
}

/// Where recognized chords are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Synchronously on the hook thread.
    #[default]
    Inline,
    /// On a background worker, so the hook returns immediately.
    Worker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Dispatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<DispatchMode>,
}

impl Dispatch {
    pub fn mode(&self) -> DispatchMode {
        self.mode.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Logging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<String>,
}

impl Logging {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    cut: Option<String>,
    paste: Option<String>,
    log_level: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            cut: env::var("FILECUTTER_CUT_CHORD").ok(),
            paste: env::var("FILECUTTER_PASTE_CHORD").ok(),
            log_level: env::var("FILECUTTER_LOG").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(cut: &str, paste: &str) -> Self {
        Self {
            cut: Some(cut.to_owned()),
            paste: Some(paste.to_owned()),
            log_level: None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the user config dir, an explicit file, and env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        Self::load_with_layers(user_config_path(), explicit.map(Path::to_path_buf), env)
    }

    fn load_with_layers(
        user: Option<PathBuf>,
        explicit: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(user_path) = user.filter(|path| path.exists()) {
            layers.push(Self::from_file(&user_path)?);
        }

        if let Some(explicit_path) = explicit {
            if !explicit_path.exists() {
                bail!("config file not found: {}", explicit_path.display());
            }
            layers.push(Self::from_file(&explicit_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    fn merge(self, other: Self) -> Self {
        Self {
            chords: Chords {
                cut: other.chords.cut.or(self.chords.cut),
                paste: other.chords.paste.or(self.chords.paste),
            },
            finder: FinderSettings {
                timeout_ms: other.finder.timeout_ms.or(self.finder.timeout_ms),
                activate: other.finder.activate.or(self.finder.activate),
            },
            dispatch: Dispatch {
                mode: other.dispatch.mode.or(self.dispatch.mode),
            },
            logging: Logging {
                level: other.logging.level.or(self.logging.level),
            },
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join(USER_CONFIG_PATH))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(cut) = env.cut {
        config.chords.cut = Some(cut);
    }
    if let Some(paste) = env.paste {
        config.chords.paste = Some(paste);
    }
    if let Some(level) = env.log_level {
        config.logging.level = Some(level);
    }
    config
}
