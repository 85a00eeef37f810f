//! Demo configuration
//!
//! Board tables stay compiled in; the TOML file only picks a board and
//! overrides input paths, LED polarity, the identity prefix and the matrix
//! bus. A missing file falls back to defaults so a bare board still runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn, Level};

use crate::board::{BoardKind, DEFAULT_NAME_PREFIX};
use crate::output::gpio::DEFAULT_CHIP;
use crate::output::matrix::{DEFAULT_ADDRESS, DEFAULT_BUS};

pub const CONFIG_ENV: &str = "PTC_WINGS_CONFIG";
const CONFIG_DIR: &str = "ptc-wings";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Per-widget device node overrides; unset entries use the board defaults
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InputOverrides {
    pub buttons: Option<PathBuf>,
    pub slider: Option<PathBuf>,
    pub wheel: Option<PathBuf>,
    pub slider_x: Option<PathBuf>,
    pub slider_y: Option<PathBuf>,
}

/// I2C location of the ATQT2 LED matrix
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct MatrixConfig {
    pub bus: u8,
    pub address: u16,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            bus: DEFAULT_BUS,
            address: DEFAULT_ADDRESS,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DemoConfig {
    pub board: BoardKind,
    pub device_name_prefix: String,
    pub gpio_chip: PathBuf,
    pub gpio_active_low: bool,
    pub log_level: String,
    pub inputs: InputOverrides,
    pub matrix: MatrixConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            board: BoardKind::default(),
            device_name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            gpio_chip: PathBuf::from(DEFAULT_CHIP),
            gpio_active_low: true,
            log_level: "info".to_string(),
            inputs: InputOverrides::default(),
            matrix: MatrixConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Load from `$PTC_WINGS_CONFIG`, else `<config dir>/ptc-wings/config.toml`
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Config file {} does not exist, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        debug!("{:?}", config);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn name_prefix(&self) -> &str {
        &self.device_name_prefix
    }

    /// Maximum tracing level; unknown names fall back to `INFO`
    pub fn max_level(&self) -> Level {
        match self.log_level.parse::<Level>() {
            Ok(level) => level,
            Err(_) => {
                warn!("Unknown log level {:?}, using info", self.log_level);
                Level::INFO
            }
        }
    }
}
