//! Search limits, loadable from TOML.
//!
//! ```
//! use swap_puzzle::SearchConfig;
//!
//! let config = SearchConfig::from_toml_str(r#"
//!     max_expansions = 50000
//!     exhaustive_cell_limit = 6
//! "#).unwrap();
//!
//! assert_eq!(config.max_expansions, Some(50_000));
//! assert_eq!(config.exhaustive_cell_limit, 6);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Limits shared by every search strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Give up after expanding this many states. `None` searches until the
    /// frontier is exhausted.
    pub max_expansions: Option<usize>,

    /// Largest `rows * cols` for which an exhaustive state graph may be built.
    pub exhaustive_cell_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_expansions: None,
            exhaustive_cell_limit: 9,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    pub fn with_exhaustive_cell_limit(mut self, limit: usize) -> Self {
        self.exhaustive_cell_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exhaustive_cell_limit == 0 {
            return Err(ConfigError::Invalid(
                "exhaustive_cell_limit must be at least 1".to_string(),
            ));
        }
        if self.max_expansions == Some(0) {
            return Err(ConfigError::Invalid(
                "max_expansions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
