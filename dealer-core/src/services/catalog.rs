use std::sync::Arc;

use tracing::{debug, info};

use crate::db::DealerRepository;
use crate::errors::DealerError;
use crate::models::{CatalogEntry, CatalogKind, NewCatalogEntry, ReviewState};

/// Result of resolving a typed-in catalog value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entry: CatalogEntry,
    /// `true` when no active entry matched and a pending one was inserted.
    pub created: bool,
}

/// Result of a review decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub entry: CatalogEntry,
    /// Records still pointing at the entry. Rejection leaves them in place.
    pub references: i64,
}

/// Catalog lookups, inline additions and back-office review.
pub struct CatalogService {
    repository: Arc<dyn DealerRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn DealerRepository>) -> Self {
        Self { repository }
    }

    /// Entries of `kind`, pending review first, then by name.
    pub async fn list(
        &self,
        kind: CatalogKind,
        parent_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntry>, DealerError> {
        let mut entries = self
            .repository
            .list_catalog_entries(kind, parent_id, include_inactive)
            .await?;
        entries.sort_by(|a, b| {
            b.review
                .needs_review()
                .cmp(&a.review.needs_review())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(entries)
    }

    /// Finds an active entry by name (case-insensitive), or inserts a new
    /// one flagged for review.
    ///
    /// # Errors
    /// * [`DealerError::EmptyCatalogName`] for a blank name.
    /// * [`DealerError::MissingParent`] for models or trims without a parent.
    pub async fn resolve(
        &self,
        kind: CatalogKind,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Resolution, DealerError> {
        self.resolve_entry(kind, name, parent_id, false).await
    }

    /// Like [`resolve`](Self::resolve) for document types, which also carry
    /// whether they block a sale.
    pub async fn resolve_document_type(
        &self,
        name: &str,
        is_critical: bool,
    ) -> Result<Resolution, DealerError> {
        self.resolve_entry(CatalogKind::DocTypes, name, None, is_critical)
            .await
    }

    async fn resolve_entry(
        &self,
        kind: CatalogKind,
        name: &str,
        parent_id: Option<i64>,
        is_critical: bool,
    ) -> Result<Resolution, DealerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DealerError::EmptyCatalogName);
        }
        let parent_id = if kind.parent_column().is_some() {
            Some(parent_id.ok_or(DealerError::MissingParent(kind))?)
        } else {
            None
        };

        let wanted = name.to_lowercase();
        let existing = self
            .repository
            .list_catalog_entries(kind, parent_id, false)
            .await?
            .into_iter()
            .find(|e| e.name.to_lowercase() == wanted);
        if let Some(entry) = existing {
            debug!(kind = %kind, id = entry.id, "reused catalog entry");
            return Ok(Resolution {
                entry,
                created: false,
            });
        }

        let entry = self
            .repository
            .create_catalog_entry(NewCatalogEntry {
                kind,
                name: name.to_string(),
                parent_id,
                is_critical,
                review: ReviewState::Pending,
            })
            .await?;
        info!(kind = %kind, id = entry.id, name = %entry.name, "catalog entry added for review");
        Ok(Resolution {
            entry,
            created: true,
        })
    }

    /// Approves or rejects a pending entry.
    ///
    /// Rejection deactivates the entry so it is no longer offered; records
    /// that already point at it keep doing so and are counted in the outcome.
    pub async fn review(
        &self,
        kind: CatalogKind,
        id: i64,
        decision: ReviewState,
    ) -> Result<ReviewOutcome, DealerError> {
        let mut entry = self.repository.get_catalog_entry(kind, id).await?;
        entry.review = entry.review.transition(decision)?;
        if entry.review == ReviewState::Rejected {
            entry.is_active = false;
        }
        self.repository.update_catalog_entry(&entry).await?;

        let references = self.repository.count_catalog_references(kind, id).await?;
        info!(kind = %kind, id, review = %entry.review, references, "catalog entry reviewed");
        Ok(ReviewOutcome { entry, references })
    }

    /// Flips `is_active`. Review state is left alone.
    pub async fn toggle_active(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<CatalogEntry, DealerError> {
        let mut entry = self.repository.get_catalog_entry(kind, id).await?;
        entry.is_active = !entry.is_active;
        self.repository.update_catalog_entry(&entry).await?;
        Ok(entry)
    }
}
