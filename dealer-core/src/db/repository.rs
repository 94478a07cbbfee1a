use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AuditEntry, CatalogEntry, CatalogKind, DocumentStatus, DocumentType, Expense, NewCatalogEntry,
    NewExpense, NewSale, NewVehicle, Sale, Vehicle, VehicleDocument, VehicleStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A unique constraint rejected the write.
    #[error("Duplicate {field}: {value}")]
    Duplicate { field: String, value: String },
}

/// Storage seam for the back office.
///
/// Services only ever see this trait; backends are created through a
/// [`RepositoryRegistry`](super::RepositoryRegistry).
#[async_trait]
pub trait DealerRepository: Send + Sync {
    // Catalogs
    async fn list_catalog_entries(
        &self,
        kind: CatalogKind,
        parent_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntry>, RepositoryError>;

    async fn get_catalog_entry(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<CatalogEntry, RepositoryError>;

    async fn create_catalog_entry(
        &self,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, RepositoryError>;

    /// Persists `is_active` and `review` of an existing entry and records the
    /// change in the audit trail.
    async fn update_catalog_entry(
        &self,
        entry: &CatalogEntry,
    ) -> Result<(), RepositoryError>;

    /// Number of vehicles (or, for expense and document types, records)
    /// pointing at the entry.
    async fn count_catalog_references(
        &self,
        kind: CatalogKind,
        id: i64,
    ) -> Result<i64, RepositoryError>;

    /// Every document type, active or not.
    async fn list_document_types(&self) -> Result<Vec<DocumentType>, RepositoryError>;

    // Vehicles
    async fn create_vehicle(
        &self,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError>;

    async fn update_vehicle(
        &self,
        id: i64,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError>;

    async fn get_vehicle(
        &self,
        id: i64,
    ) -> Result<Vehicle, RepositoryError>;

    async fn list_vehicles(
        &self,
        status: Option<VehicleStatus>,
    ) -> Result<Vec<Vehicle>, RepositoryError>;

    /// Moves an unsold vehicle between `in_stock` and `reserved`.
    /// Sold vehicles do not match and yield [`RepositoryError::NotFound`].
    async fn set_vehicle_status(
        &self,
        id: i64,
        status: VehicleStatus,
    ) -> Result<(), RepositoryError>;

    // Documents
    /// Records for one vehicle, or for every vehicle when `vehicle_id` is `None`.
    async fn list_vehicle_documents(
        &self,
        vehicle_id: Option<i64>,
    ) -> Result<Vec<VehicleDocument>, RepositoryError>;

    /// Inserts or updates the single record for the (vehicle, type) pair.
    async fn set_document_status(
        &self,
        vehicle_id: i64,
        doc_type_id: i64,
        status: DocumentStatus,
    ) -> Result<VehicleDocument, RepositoryError>;

    // Expenses
    async fn add_expense(
        &self,
        expense: NewExpense,
    ) -> Result<Expense, RepositoryError>;

    async fn delete_expense(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// Expenses of one vehicle, or of every vehicle when `vehicle_id` is `None`.
    async fn list_expenses(
        &self,
        vehicle_id: Option<i64>,
    ) -> Result<Vec<Expense>, RepositoryError>;

    // Sales
    /// Writes the sale, marks the vehicle sold and appends an audit entry in
    /// one transaction. A vehicle that is already sold yields
    /// [`RepositoryError::NotFound`] and nothing is written.
    async fn record_sale(
        &self,
        sale: NewSale,
    ) -> Result<Sale, RepositoryError>;

    /// Newest first.
    async fn list_sales(&self) -> Result<Vec<Sale>, RepositoryError>;

    // Audit
    /// Newest first, at most `limit` entries.
    async fn list_audit_entries(
        &self,
        limit: i64,
    ) -> Result<Vec<AuditEntry>, RepositoryError>;
}
