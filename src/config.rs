//! On-disk configuration
//!
//! A small JSON file under the user config directory. Grid dimensions,
//! the shell to run, the TERM value and the default colors all come from
//! here; everything has a sensible default so the file is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::Rgb;

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid height in rows
    pub rows: usize,
    /// Grid width in columns
    pub cols: usize,
    /// Shell to spawn; `None` means `$SHELL` (then `/bin/sh`)
    pub shell: Option<String>,
    /// Value exported as `TERM` in the child
    pub term: String,
    /// Default colors, used where cells say `Default`
    pub colors: ColorConfig,
}

/// The two configurable default colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            foreground: Rgb::new(0xE5, 0xE5, 0xE5),
            background: Rgb::new(0x10, 0x10, 0x10),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            shell: None,
            term: crate::pty::DEFAULT_TERM.to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        if config.rows == 0 || config.cols == 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: config.rows,
                cols: config.cols,
            });
        }
        Ok(config)
    }

    /// Write pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location. A missing file yields the
    /// defaults silently; an unreadable or malformed file yields the
    /// defaults with a warning.
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring bad config file");
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// `~/.config/dango/config.json`, if a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("dango")
                .join("config.json")
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid dimensions must be non-zero, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
}
