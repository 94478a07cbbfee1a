use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use dealer_core::DealerRepository;
use dealer_core::db::{DbConfig, RepositoryRegistry};
use dealer_core::services::{CatalogService, InventoryService, ReportService};
use dealer_db_sqlite::SqliteRepositoryFactory;

/// Registry with every storage backend compiled into the binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// The services the commands work through, sharing one repository.
pub struct Services {
    pub inventory: InventoryService,
    pub catalogs: CatalogService,
    pub reports: ReportService,
}

impl Services {
    pub fn new(
        repository: Arc<dyn DealerRepository>,
        no_documents_required: bool,
    ) -> Self {
        Self {
            inventory: InventoryService::new(repository.clone())
                .with_no_documents_required(no_documents_required),
            catalogs: CatalogService::new(repository.clone()),
            reports: ReportService::new(repository),
        }
    }
}

/// Opens the configured backend.
pub async fn connect(config: &DbConfig) -> Result<Arc<dyn DealerRepository>> {
    debug!(backend = %config.backend, "connecting");
    let repository = build_registry()
        .create(config)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} database '{}'",
                config.backend, config.connection_string
            )
        })?;
    Ok(Arc::from(repository))
}
