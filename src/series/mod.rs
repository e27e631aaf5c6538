//! The series builder: calendar arithmetic, per-unit extraction and roll-ups.
//!
//! Everything here is a pure function of the loaded rows and the static region
//! tables; no I/O happens below this module.

pub mod aggregate;
pub mod calendar;
pub mod extract;

pub use aggregate::{aggregate, national_rollup};
pub use calendar::{previous_calendar_day, previous_day};
pub use extract::{build_all_units, build_unit_series, differential, national_reported};
