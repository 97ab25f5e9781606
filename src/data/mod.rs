//! Synthetic sales history for trying the forecaster without a shop database.

pub mod sample;

pub use sample::*;
