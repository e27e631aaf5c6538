//! Remote data sources.

pub mod opencovid;

pub use opencovid::{DEFAULT_URL, OpenCovidClient, URL_ENV};
