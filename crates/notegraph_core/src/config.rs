//! Core configuration.
//!
//! # Responsibility
//! - Define tunables for traversal, pagination and logging.
//! - Load them from a JSON file with per-field defaults.
//!
//! # Invariants
//! - A loaded config is always validated before use.

use crate::logging::{default_log_level, normalize_level};
use crate::model::note::Lang;
use crate::tree::paginate::DEFAULT_WINDOW_SIZE;
use crate::tree::{TreeOptions, DEFAULT_MAX_DEPTH, DEFAULT_SYNTHETIC_ROOT_ID};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config text is not valid JSON for `CoreConfig`.
    Parse(serde_json::Error),
    /// Config parsed but holds an unusable value.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Tunables for one core instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Depth levels per page.
    pub page_window: usize,
    /// Traversal depth ceiling.
    pub max_traversal_depth: usize,
    /// Preferred id of the virtual root.
    pub synthetic_root_id: String,
    /// Language used when a request does not name one.
    pub default_lang: Lang,
    /// `trace|debug|info|warn|error`.
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            page_window: DEFAULT_WINDOW_SIZE,
            max_traversal_depth: DEFAULT_MAX_DEPTH,
            synthetic_root_id: DEFAULT_SYNTHETIC_ROOT_ID.to_string(),
            default_lang: Lang::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates JSON config text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_window == 0 {
            return Err(ConfigError::Invalid(
                "page_window must be at least 1".to_string(),
            ));
        }
        if self.max_traversal_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_traversal_depth must be at least 1".to_string(),
            ));
        }
        if self.synthetic_root_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "synthetic_root_id must not be blank".to_string(),
            ));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Tree options derived from this config.
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            max_depth: self.max_traversal_depth,
            synthetic_root_id: self.synthetic_root_id.trim().to_string(),
            lang: self.default_lang,
        }
    }
}
