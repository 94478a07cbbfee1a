//! Command-line front end for the dealership back office: wiring, CSV
//! exports and logging.

pub mod app;
pub mod cli;
pub mod export;
pub mod logging;

pub use app::{Services, build_registry, connect};
pub use cli::{Cli, Command, execute, run};
pub use export::{ExportError, InventoryRecord, ReportExporter, SaleRecord};
pub use logging::init_logging;
