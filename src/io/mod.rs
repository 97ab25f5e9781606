//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - forecast JSON, daily series CSV, sales spreadsheet (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
