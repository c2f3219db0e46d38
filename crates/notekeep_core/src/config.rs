//! Core configuration.
//!
//! # Responsibility
//! - Describe how the host wants the core opened (storage, logging, queues).
//! - Validate settings before any resource is acquired.
//!
//! # Invariants
//! - `db_path = None` means an in-memory database.
//! - A logging section, when present, names an absolute directory.

use crate::controller::effects::DEFAULT_EFFECT_BUFFER;
use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file; `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    /// File logging; `None` leaves the `log` facade untouched.
    pub log: Option<LogConfig>,
    /// Per-subscriber effect queue depth for every controller.
    pub effect_buffer: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log: None,
            effect_buffer: DEFAULT_EFFECT_BUFFER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_level_string")]
    pub level: String,
    pub dir: PathBuf,
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroEffectBuffer,
    RelativeLogDir(PathBuf),
    UnsupportedLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroEffectBuffer => write!(f, "effect_buffer must be greater than zero"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log dir must be an absolute path, got `{}`", dir.display())
            }
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Config for a file-backed store without logging.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.effect_buffer == 0 {
            return Err(ConfigError::ZeroEffectBuffer);
        }
        if let Some(log) = &self.log {
            if normalize_level(&log.level).is_err() {
                return Err(ConfigError::UnsupportedLogLevel(log.level.clone()));
            }
            if !log.dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(log.dir.clone()));
            }
        }
        Ok(())
    }
}
