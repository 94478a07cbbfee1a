//! Back-office operations over an injected [`DealerRepository`](crate::DealerRepository).

mod catalog;
mod inventory;
mod reports;

pub use catalog::{CatalogService, Resolution, ReviewOutcome};
pub use inventory::{InventoryFilter, InventoryRow, InventoryService, SaleRequest, VehicleOverview};
pub use reports::{ReportService, SaleLine, SalesReport};
