//! Configuration management for trackmark.
//!
//! Settings are read from `{config_dir}/trackmark/config.json`. Every field
//! is optional; a missing file yields [`TrackerConfig::default`].
//!
//! # State directory resolution
//!
//! 1. explicit override (the CLI `--state-dir` flag, which clap also fills
//!    from the [`STATE_DIR_ENV`] environment variable)
//! 2. `state_dir` from the config file
//! 3. `{data_dir}/trackmark/state`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackError};

/// Environment variable the CLI reads as a fallback for `--state-dir`.
pub const STATE_DIR_ENV: &str = "TRACKMARK_STATE_DIR";

/// Application directory name under platform config/data dirs.
pub const APP_DIR_NAME: &str = "trackmark";

/// Config file name.
pub const CONFIG_FILENAME: &str = "config.json";

/// Tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Directory holding per-file state; `None` means the platform default.
    pub state_dir: Option<PathBuf>,
    /// Copy the previous state file to `.bak` before each overwrite.
    pub backups: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            backups: true,
        }
    }
}

impl TrackerConfig {
    /// Default config file path using the platform's config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR_NAME).join(CONFIG_FILENAME))
    }

    /// Default state directory using the platform's data directory.
    #[must_use]
    pub fn default_state_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join(APP_DIR_NAME).join("state"))
    }

    /// Load configuration from `path`, falling back to defaults if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Config`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TrackError::config_with_path(format!("failed to read config: {e}"), path.to_path_buf())
        })?;

        serde_json::from_str(&content).map_err(|e| {
            TrackError::config_with_path(format!("failed to parse config: {e}"), path.to_path_buf())
        })
    }

    /// Load from the platform default location.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Set an explicit state directory.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Enable or disable backups.
    #[must_use]
    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backups = enabled;
        self
    }

    /// Resolve the effective state directory.
    ///
    /// `override_dir` wins, then the config file, then the platform default.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Config`] if no directory can be determined.
    pub fn resolve_state_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        Self::default_state_dir()
            .ok_or_else(|| TrackError::config("could not determine a data directory for state"))
    }
}
