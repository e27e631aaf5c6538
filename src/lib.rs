//! `covid-fr-series` library crate.
//!
//! The binary (`covfr`) is a thin wrapper around this library so that:
//!
//! - the series builder is testable without spawning processes
//! - modules are reusable from other front-ends or notebooks
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod series;
