//! SQLite storage for the dealership back office.

mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
