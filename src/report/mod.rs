//! Reporting utilities: per-metric summaries and formatted terminal output.

pub mod format;

pub use format::*;
