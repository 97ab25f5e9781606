//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the `SaleRecord` capability the forecaster reads from
//! - inventory rows (`StockItem`, `SaleEntry`, `SaleLine`)
//! - forecast outputs (`ForecastResult`, `TrendForecast`, etc.)
//! - run configuration (`ForecastConfig`, `ReportConfig`)

pub mod types;

pub use types::*;
