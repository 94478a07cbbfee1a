use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{DealerRepository, RepositoryError};

/// Backend-agnostic connection configuration.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is handed to that factory as is.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `dealer.db`, `:memory:`             |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Opens (or creates) the store and returns a ready repository.
    /// Migrations and seeding happen here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DealerRepository>, RepositoryError>;
}

/// [`RepositoryFactory`] instances keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a backend, replacing any factory with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no such backend is registered.
    /// * Whatever the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DealerRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        tracing::debug!(backend = %config.backend, "opening repository");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
