pub mod calculations;
pub mod db;
pub mod errors;
pub mod format;
pub mod models;
pub mod services;

pub use db::repository::{DealerRepository, RepositoryError};
pub use errors::DealerError;
pub use models::*;
