//! Startup configuration
//!
//! Read once from TOML at startup. Only device paths, names and timing live
//! here; the key tables are fixed.

use crate::mapping::Player;
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use xarcade_io::{XARCADE_DEVICE_NAME, XARCADE_DEVICE_PATH};

/// Errors from loading or saving the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Complete remapper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapConfig {
    /// Event node of the control panel
    #[serde(default = "default_device")]
    pub device: PathBuf,
    /// Substring the kernel device name must contain (empty disables the check)
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Name of the virtual keyboard
    #[serde(default = "default_keyboard_name")]
    pub keyboard_name: String,
    /// Name prefix of the virtual gamepads; the player number is appended
    #[serde(default = "default_gamepad_name")]
    pub gamepad_name: String,
    /// Mode at startup
    #[serde(default)]
    pub mode: Mode,
    /// Pause between press and release of synthetic taps
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_device() -> PathBuf {
    PathBuf::from(XARCADE_DEVICE_PATH)
}
fn default_device_name() -> String {
    XARCADE_DEVICE_NAME.to_string()
}
fn default_keyboard_name() -> String {
    "Xarcade-to-Keyboard".to_string()
}
fn default_gamepad_name() -> String {
    "Xarcade-to-Gamepad Device".to_string()
}
fn default_settle_delay_ms() -> u64 {
    xarcade_io::DEFAULT_SETTLE_DELAY.as_millis() as u64
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            device_name: default_device_name(),
            keyboard_name: default_keyboard_name(),
            gamepad_name: default_gamepad_name(),
            mode: Mode::default(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl RemapConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("xarcade2joystick")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_err)
    }

    /// Name filter for the input device, `None` if disabled
    pub fn name_filter(&self) -> Option<&str> {
        Some(self.device_name.as_str()).filter(|name| !name.is_empty())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Virtual gamepad name for a player, e.g. `"Xarcade-to-Gamepad Device 1"`
    pub fn gamepad_device_name(&self, player: Player) -> String {
        format!("{} {}", self.gamepad_name, player.number())
    }
}
