//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - series exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
