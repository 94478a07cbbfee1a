mod audit;
mod catalog;
mod document;
mod expense;
mod sale;
mod vehicle;

pub use audit::AuditEntry;
pub use catalog::{CatalogEntry, CatalogKind, NewCatalogEntry, ReviewState, ReviewTransitionError};
pub use document::{DocumentStatus, DocumentType, VehicleDocument};
pub use expense::{Expense, NewExpense};
pub use sale::{NewSale, Sale};
pub use vehicle::{
    NewVehicle, Vehicle, VehicleDraft, VehicleFinancials, VehicleStatus, normalize_plate,
};
