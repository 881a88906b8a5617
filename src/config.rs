//! Registry configuration.
//!
//! [`RegistryConfig`] can be built in code or deserialized from JSON; absent
//! fields take their defaults.
//!
//! ```rust
//! use runtime_registry::RegistryConfig;
//!
//! let config: RegistryConfig = serde_json::from_str(r#"{"maxPageSize": 50}"#).unwrap();
//! assert_eq!(config.max_page_size, 50);
//! assert_eq!(config.effective_default_page_size(), 50);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 500;
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: usize = 5;

/// Tunable behavior of a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// Page size used when a list request omits `first`, capped at `max_page_size`.
    pub default_page_size: usize,

    /// Largest accepted `first`.
    pub max_page_size: usize,

    /// How many times a write is attempted when a label definition it relied
    /// on changed before the commit.
    pub max_commit_attempts: usize,

    /// Label newly registered runtimes and applications with
    /// `scenarios: ["DEFAULT"]` when they carry no scenarios label.
    pub assign_default_scenario: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
            assign_default_scenario: true,
        }
    }
}

impl RegistryConfig {
    /// Effective default page size, never above the maximum.
    pub fn effective_default_page_size(&self) -> usize {
        self.default_page_size.min(self.max_page_size)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> BuildResult<()> {
        if self.max_page_size == 0 {
            return Err(BuildError::InvalidConfiguration {
                message: "maxPageSize must be at least 1".to_string(),
            });
        }

        if self.default_page_size == 0 {
            return Err(BuildError::InvalidConfiguration {
                message: "defaultPageSize must be at least 1".to_string(),
            });
        }

        if self.max_commit_attempts == 0 {
            return Err(BuildError::InvalidConfiguration {
                message: "maxCommitAttempts must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
