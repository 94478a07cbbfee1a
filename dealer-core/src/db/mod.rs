pub mod factory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{DealerRepository, RepositoryError};

#[cfg(test)]
pub(crate) mod memory;
