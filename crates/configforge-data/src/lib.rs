//! Raw data ingestion
//!
//! This crate handles:
//! - Discovering data files under a root directory
//! - Decoding bytes with a configured encoding into cell grids
//! - Deriving canonical table names and detecting collisions

pub mod error;
pub mod grid;
pub mod loader;
pub mod raw;

pub use error::DataError;
pub use grid::{CsvGridParser, GridParser};
pub use loader::{DataDb, LoadOptions, table_name};
pub use raw::{HeaderField, RawTable};
