//! HTTP fetch of the opencovid19-fr `chiffres-cles` dataset.

use reqwest::blocking::Client;
use tracing::info;

use crate::domain::Schema;
use crate::error::AppError;
use crate::io::ingest::{Dataset, parse_observations};

pub const DEFAULT_URL: &str =
    "https://raw.githubusercontent.com/opencovid19-fr/data/master/dist/chiffres-cles.csv";

/// Environment variable overriding [`DEFAULT_URL`].
pub const URL_ENV: &str = "COVFR_DATA_URL";

pub struct OpenCovidClient {
    client: Client,
    url: String,
}

impl OpenCovidClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Client for `COVFR_DATA_URL` (read from the environment or `.env`), or the
    /// public dataset when unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var(URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        Self::new(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the CSV body.
    pub fn fetch_csv(&self) -> Result<String, AppError> {
        info!(url = %self.url, "fetching dataset");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("Dataset request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Dataset request failed with status {}.", resp.status()),
            ));
        }

        resp.text()
            .map_err(|e| AppError::new(4, format!("Failed to read dataset body: {e}")))
    }

    /// Download and parse the dataset.
    pub fn fetch_dataset(&self, schema: Schema) -> Result<Dataset, AppError> {
        let body = self.fetch_csv()?;
        let dataset = parse_observations(body.as_bytes(), schema)?;
        info!(
            rows = dataset.stats.rows_used,
            units = dataset.stats.units,
            "parsed dataset"
        );
        Ok(dataset)
    }
}
