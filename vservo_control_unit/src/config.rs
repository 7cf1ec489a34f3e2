//! Tracker configuration loading.
//!
//! Loads a [`TrackerConfig`] from TOML and validates it. A missing file at
//! the default location falls back to built-in defaults; an explicitly
//! requested file must exist.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use vservo_common::config::{ConfigError, ConfigLoader, Validate};
use vservo_common::tracker::config::TrackerConfig;

/// Validated configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub tracker: TrackerConfig,
    /// Source file, `None` when built-in defaults are used.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Built-in defaults (always valid).
    pub fn defaults() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            source: None,
        }
    }

    /// Select a different backend and re-validate.
    pub fn with_driver(mut self, name: &str) -> Result<Self, ConfigError> {
        self.tracker.driver.name = name.to_string();
        self.tracker.validate()?;
        Ok(self)
    }
}

/// Load and validate the tracker configuration from `path`.
///
/// # Errors
/// `FileNotFound` if `path` does not exist, `ParseError` for malformed TOML
/// or unknown value types, `ValidationError` for out-of-range values.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let tracker = TrackerConfig::load_validated(path)?;
    debug!("Loaded tracker config from {}", path.display());
    Ok(LoadedConfig {
        tracker,
        source: Some(path.to_path_buf()),
    })
}

/// Parse and validate a TOML document.
pub fn load_config_from_str(toml: &str) -> Result<LoadedConfig, ConfigError> {
    let tracker = TrackerConfig::from_toml_str(toml)?;
    tracker.validate()?;
    Ok(LoadedConfig {
        tracker,
        source: None,
    })
}

/// Like [`load_config`], but a missing file yields [`LoadedConfig::defaults`].
pub fn load_config_or_default(path: &Path) -> Result<LoadedConfig, ConfigError> {
    match load_config(path) {
        Err(ConfigError::FileNotFound) => {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            Ok(LoadedConfig::defaults())
        }
        other => other,
    }
}
