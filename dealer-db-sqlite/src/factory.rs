use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use dealer_core::db::{DbConfig, DealerRepository, RepositoryError, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime.
///
/// Resolution order:
/// 1. `DEALER_DB_SQLITE_SEEDS_DIR`, when set.
/// 2. `./seeds`, when that directory exists in the working directory.
/// 3. `$CARGO_MANIFEST_DIR/seeds` for runs from the build tree.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DEALER_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use dealer_core::db::RepositoryRegistry;
/// use dealer_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens `config.connection_string` (a file path or `:memory:`), applies
    /// migrations and loads the starter catalogs.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DealerRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        debug!(seeds = %seeds.display(), "loading seed files");
        repo.run_seeds(&seeds)
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use dealer_core::CatalogKind;
    use dealer_core::db::{DbConfig, RepositoryFactory};

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_seeded_in_memory_repository() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = match SqliteRepositoryFactory.create(&config).await {
            Ok(repo) => repo,
            Err(e) => panic!("failed to create in-memory repository: {e:#?}"),
        };
        let expense_types = repo
            .list_catalog_entries(CatalogKind::ExpenseTypes, None, false)
            .await
            .expect("Should list expense types");

        assert_eq!(expense_types.len(), 5);
    }

    #[tokio::test]
    async fn unreachable_file_is_a_connection_error() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: "/nonexistent-dir/dealer.db".to_string(),
        };

        let result = SqliteRepositoryFactory.create(&config).await;

        assert!(matches!(
            result.err(),
            Some(dealer_core::RepositoryError::Connection(_))
        ));
    }
}
