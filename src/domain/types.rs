//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built in-memory from the loaded table
//! - exported to JSON/CSV
//! - handed to the renderers without further reshaping

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One of the seven epidemiological counts tracked by the source dataset.
///
/// The variant order is the default display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Confirmed cases.
    #[value(name = "cas_confirmes")]
    CasConfirmes,
    /// Deaths (hospital).
    #[value(name = "deces")]
    Deces,
    /// Deaths in care facilities (EHPAD).
    #[value(name = "deces_ehpad")]
    DecesEhpad,
    /// Patients in intensive care.
    #[value(name = "reanimation")]
    Reanimation,
    /// Patients hospitalized.
    #[value(name = "hospitalises")]
    Hospitalises,
    /// Patients recovered.
    #[value(name = "gueris")]
    Gueris,
    /// People tested.
    #[value(name = "depistes")]
    Depistes,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::CasConfirmes,
        Metric::Deces,
        Metric::DecesEhpad,
        Metric::Reanimation,
        Metric::Hospitalises,
        Metric::Gueris,
        Metric::Depistes,
    ];

    /// Column name in the source CSV.
    pub fn column(self) -> &'static str {
        match self {
            Metric::CasConfirmes => "cas_confirmes",
            Metric::Deces => "deces",
            Metric::DecesEhpad => "deces_ehpad",
            Metric::Reanimation => "reanimation",
            Metric::Hospitalises => "hospitalises",
            Metric::Gueris => "gueris",
            Metric::Depistes => "depistes",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Metric::CasConfirmes => "confirmed cases",
            Metric::Deces => "deaths",
            Metric::DecesEhpad => "deaths (care homes)",
            Metric::Reanimation => "intensive care",
            Metric::Hospitalises => "hospitalized",
            Metric::Gueris => "recovered",
            Metric::Depistes => "tested",
        }
    }
}

/// The `granularite` column: which administrative level a row describes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Departement,
    Region,
    Pays,
    /// Any other value (`monde`, `collectivite-outremer`, ...).
    Other(String),
    /// The column is absent or empty.
    #[default]
    Unknown,
}

impl Granularity {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Granularity::Unknown;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Granularity::Unknown,
            "departement" => Granularity::Departement,
            "region" => Granularity::Region,
            "pays" => Granularity::Pays,
            other => Granularity::Other(other.to_string()),
        }
    }
}

/// One row of the source table, validated at load time.
///
/// Metric fields are `None` when the column is absent or the cell is empty;
/// [`Observation::value`] reads those as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub unit_code: String,
    pub date: NaiveDate,
    pub granularity: Granularity,
    pub unit_name: Option<String>,
    pub cas_confirmes: Option<f64>,
    pub deces: Option<f64>,
    pub deces_ehpad: Option<f64>,
    pub reanimation: Option<f64>,
    pub hospitalises: Option<f64>,
    pub gueris: Option<f64>,
    pub depistes: Option<f64>,
}

impl Observation {
    pub fn new(unit_code: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            unit_code: unit_code.into(),
            date,
            ..Self::default()
        }
    }

    /// Builder-style setter, mostly useful when assembling rows in tests.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        *self.slot_mut(metric) = Some(value);
        self
    }

    pub fn value(&self, metric: Metric) -> f64 {
        self.raw(metric).unwrap_or(0.0)
    }

    pub fn raw(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::CasConfirmes => self.cas_confirmes,
            Metric::Deces => self.deces,
            Metric::DecesEhpad => self.deces_ehpad,
            Metric::Reanimation => self.reanimation,
            Metric::Hospitalises => self.hospitalises,
            Metric::Gueris => self.gueris,
            Metric::Depistes => self.depistes,
        }
    }

    pub(crate) fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::CasConfirmes => &mut self.cas_confirmes,
            Metric::Deces => &mut self.deces,
            Metric::DecesEhpad => &mut self.deces_ehpad,
            Metric::Reanimation => &mut self.reanimation,
            Metric::Hospitalises => &mut self.hospitalises,
            Metric::Gueris => &mut self.gueris,
            Metric::Depistes => &mut self.depistes,
        }
    }
}

/// A date-ordered numeric series.
pub type Series = BTreeMap<NaiveDate, f64>;

/// Cumulative or day-over-day view of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Cumul,
    Diff,
}

impl SeriesKind {
    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Cumul => "CUMUL",
            SeriesKind::Diff => "DIFF",
        }
    }
}

/// Cumulative and differential series per metric for one unit or group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesBundle {
    pub cumul: BTreeMap<Metric, Series>,
    pub diff: BTreeMap<Metric, Series>,
}

impl SeriesBundle {
    /// A bundle holding an empty series for every requested metric.
    pub fn empty(metrics: &[Metric]) -> Self {
        let empty: BTreeMap<Metric, Series> =
            metrics.iter().map(|&m| (m, Series::new())).collect();
        Self {
            cumul: empty.clone(),
            diff: empty,
        }
    }

    pub fn series(&self, kind: SeriesKind) -> &BTreeMap<Metric, Series> {
        match kind {
            SeriesKind::Cumul => &self.cumul,
            SeriesKind::Diff => &self.diff,
        }
    }

    /// Union of the dates present in `metrics` for the given kind.
    pub fn date_index(&self, kind: SeriesKind, metrics: &[Metric]) -> Vec<NaiveDate> {
        let by_metric = self.series(kind);
        let mut dates: Vec<NaiveDate> = metrics
            .iter()
            .filter_map(|m| by_metric.get(m))
            .flat_map(|s| s.keys().copied())
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// Values of one metric over `index`, zero-filled where the series has no entry.
    pub fn aligned(&self, kind: SeriesKind, metric: Metric, index: &[NaiveDate]) -> Vec<f64> {
        let series = self.series(kind).get(&metric);
        index
            .iter()
            .map(|d| series.and_then(|s| s.get(d)).copied().unwrap_or(0.0))
            .collect()
    }
}

/// A named list of constituent unit codes to roll up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub units: Vec<String>,
}

impl Group {
    pub fn new<S: Into<String>>(name: impl Into<String>, units: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            units: units.into_iter().map(Into::into).collect(),
        }
    }
}

/// Which of the two source layouts the table follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// Department rows only, keyed by the two-letter code after `DEP-`.
    /// Regions are summed from their departments.
    Dept,
    /// Every row keyed by its full maille code (`DEP-75`, `REG-11`, `FRA`).
    /// Regions are read from region rows, the country from `pays` rows.
    Maille,
}

/// Which series of a bundle to report/plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KindSelection {
    Cumul,
    Diff,
    Both,
}

impl KindSelection {
    pub fn kinds(self) -> &'static [SeriesKind] {
        match self {
            KindSelection::Cumul => &[SeriesKind::Cumul],
            KindSelection::Diff => &[SeriesKind::Diff],
            KindSelection::Both => &[SeriesKind::Cumul, SeriesKind::Diff],
        }
    }
}

/// One panel per metric, or all metrics overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Separate,
    Merged,
}

/// Where the source table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    /// Fetch over HTTP; `None` uses the environment/default URL.
    Url(Option<String>),
}

/// Fully resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DataSource,
    pub schema: Schema,
    pub metrics: Vec<Metric>,
    pub kinds: KindSelection,
    pub layout: Layout,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}
