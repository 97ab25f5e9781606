//! Profit trend forecasting.
//!
//! - sale date parsing (`dates`)
//! - daily aggregation (`aggregate`)
//! - line fit + projection (`trend`)
//! - per-product fan-out (`by_product`)

pub mod aggregate;
pub mod by_product;
pub mod dates;
pub mod trend;

pub use aggregate::*;
pub use by_product::*;
pub use dates::*;
pub use trend::*;
