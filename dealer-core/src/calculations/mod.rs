//! Pure evaluators shared by every view of a vehicle.
//!
//! Nothing in here touches storage. Callers load the inputs through a
//! [`DealerRepository`](crate::DealerRepository) and hand them over as plain
//! values; results are recomputed on every read.

pub mod common;
pub mod documents;
pub mod profitability;
pub mod summary;

pub use documents::{DocumentReadiness, DocumentRequirements, Signal};
pub use profitability::{Basis, Profitability, ProfitabilityInput, ProfitabilityResult};
pub use summary::{
    DashboardSummary, MonthlySales, PriceRange, expense_totals, pending_document_count,
};
