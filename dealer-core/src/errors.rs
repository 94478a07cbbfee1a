use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{CatalogKind, ReviewTransitionError, VehicleStatus};

/// Errors surfaced by the back-office services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("plate {0} is already registered to another vehicle")]
    DuplicatePlate(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("sale blocked: {} critical document(s) missing", missing_critical.len())]
    SaleBlocked { missing_critical: Vec<i64> },

    #[error("vehicle is {0} and cannot be sold")]
    NotForSale(VehicleStatus),

    #[error("sale price must be greater than zero")]
    InvalidSalePrice,

    #[error("expense amount cannot be negative")]
    NegativeExpense,

    #[error("catalog entry name cannot be empty")]
    EmptyCatalogName,

    #[error("{0} entries need a parent")]
    MissingParent(CatalogKind),

    #[error(transparent)]
    InvalidReviewTransition(#[from] ReviewTransitionError),
}
