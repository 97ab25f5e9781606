//! `profit-trend` library crate.
//!
//! The binary (`ptrend`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the forecaster can be embedded by other tools that already hold sales
//!   records in memory (anything implementing `domain::SaleRecord`)

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod inventory;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
