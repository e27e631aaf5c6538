//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - metric and layout enums (`Metric`, `SeriesKind`, `Schema`, `Layout`)
//! - validated source rows (`Observation`)
//! - series outputs (`Series`, `SeriesBundle`, `Group`)
//! - the static region tables (`regions`)

pub mod regions;
pub mod types;

pub use types::*;
