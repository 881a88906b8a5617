//! Builder for configuring registry instances.

use crate::config::RegistryConfig;
use crate::error::BuildResult;
use crate::registry::Registry;
use crate::storage::{StorageError, StorageProvider};

/// Builder for configuring and creating [`Registry`] instances.
///
/// Starts from [`RegistryConfig::default`]; the configuration is validated
/// by [`build`](Self::build).
///
/// # Examples
///
/// ```rust
/// use runtime_registry::RegistryBuilder;
/// use runtime_registry::storage::InMemoryStorage;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = RegistryBuilder::new(InMemoryStorage::new())
///     .with_default_page_size(20)
///     .with_max_page_size(200)
///     .assign_default_scenario(false)
///     .build()?;
/// assert_eq!(registry.config().max_page_size, 200);
///
/// // Zero-sized pages are rejected
/// assert!(RegistryBuilder::new(InMemoryStorage::new())
///     .with_max_page_size(0)
///     .build()
///     .is_err());
/// # Ok(())
/// # }
/// ```
pub struct RegistryBuilder<S> {
    storage: S,
    config: RegistryConfig,
}

impl<S: StorageProvider<Error = StorageError>> RegistryBuilder<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: RegistryConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.config.default_page_size = size;
        self
    }

    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.config.max_page_size = size;
        self
    }

    /// Attempts per write before a concurrent modification error is returned.
    pub fn with_max_commit_attempts(mut self, attempts: usize) -> Self {
        self.config.max_commit_attempts = attempts;
        self
    }

    pub fn assign_default_scenario(mut self, enabled: bool) -> Self {
        self.config.assign_default_scenario = enabled;
        self
    }

    /// Validate the configuration and create the registry.
    pub fn build(self) -> BuildResult<Registry<S>> {
        Registry::with_config(self.storage, self.config)
    }
}
