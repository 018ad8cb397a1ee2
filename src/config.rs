//! Configuration file loading.
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/scope-reparent/` on Linux). A missing default file means
//! built-in defaults; a file named explicitly with `--config` must exist.
//!
//! ```toml
//! log_level = "info"
//!
//! [guarantor]
//! blacklist = ["HoudiniLayerInfo", "MetadataInfo", "SceneInfo"]
//!
//! [writer]
//! overwrite = false
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::constants;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: Option<String>,
    pub guarantor: GuarantorConfig,
    pub writer: WriterConfig,
}

/// Settings for choosing a default prim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuarantorConfig {
    /// Root prim names that are pipeline metadata, never scene content.
    pub blacklist: BTreeSet<String>,
}

impl Default for GuarantorConfig {
    fn default() -> Self {
        Self {
            blacklist: constants::DEFAULT_BLACKLIST
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Settings for writing the container layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    /// Replace an existing file at the output path.
    pub overwrite: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named with `--config` or the environment.
    Explicit(PathBuf),
    /// Found in the platform config directory.
    UserDir(PathBuf),
    /// No file; built-in defaults.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{} (explicit)", path.display()),
            Self::UserDir(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(constants::CONFIG_DIR_NAME)
                .join(constants::CONFIG_FILE_NAME)
        })
    }

    /// Load from `explicit` if given, else from [`Config::default_path`].
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            let config = Self::from_file(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                let config = Self::from_file(&path)?;
                Ok((config, ConfigSource::UserDir(path)))
            }
            _ => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
