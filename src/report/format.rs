//! Formatted terminal output: load summary and per-bundle tables.
//!
//! We keep formatting code in one place so the series code stays free of
//! presentation concerns and output changes stay localized.

use chrono::NaiveDate;

use crate::domain::{Metric, Schema, SeriesBundle};
use crate::io::ingest::LoadStats;

/// Per-metric figures shown in the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub metric: Metric,
    pub n_dates: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub last_cumul: Option<f64>,
    pub last_diff: Option<f64>,
    /// Largest day-over-day increase and its date.
    pub peak_diff: Option<(NaiveDate, f64)>,
}

pub fn summarize_metric(bundle: &SeriesBundle, metric: Metric) -> MetricSummary {
    let cumul = bundle.cumul.get(&metric);
    let diff = bundle.diff.get(&metric);

    let peak_diff = diff.and_then(|s| {
        s.iter()
            .map(|(&d, &v)| (d, v))
            // First date wins on ties.
            .fold(None, |best: Option<(NaiveDate, f64)>, (d, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((d, v)),
            })
    });

    MetricSummary {
        metric,
        n_dates: cumul.map_or(0, |s| s.len()),
        first: cumul.and_then(|s| s.keys().next().copied()),
        last: cumul.and_then(|s| s.keys().next_back().copied()),
        last_cumul: cumul.and_then(|s| s.values().next_back().copied()),
        last_diff: diff.and_then(|s| s.values().next_back().copied()),
        peak_diff,
    }
}

/// Format the dataset load summary.
pub fn format_load_summary(stats: &LoadStats, schema: Schema, source: &str) -> String {
    let mut out = String::new();
    out.push_str("=== covfr - French COVID-19 series ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!("Schema: {schema:?}\n"));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={} | units={}\n",
        stats.rows_read, stats.rows_used, stats.rows_skipped, stats.units
    ));
    out.push_str(&format!(
        "Dates: [{}, {}]\n",
        fmt_date(stats.first_date),
        fmt_date(stats.last_date)
    ));
    let cols: Vec<&str> = stats.metric_columns.iter().map(|m| m.column()).collect();
    out.push_str(&format!("Metric columns: {}\n", cols.join(", ")));
    out
}

/// Format the summary table for one named bundle.
pub fn format_bundle_summary(name: &str, bundle: &SeriesBundle, metrics: &[Metric]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} / CUMUL+DIFF\n", name.to_uppercase()));
    out.push_str(&format!(
        "{:<14} {:>6} {:>10} {:>10} {:>12} {:>10} {:>10}  {:<10}\n",
        "metric", "dates", "first", "last", "cumul", "diff", "peak diff", "peak date"
    ));

    for &metric in metrics {
        let s = summarize_metric(bundle, metric);
        out.push_str(&format!(
            "{:<14} {:>6} {:>10} {:>10} {:>12} {:>10} {:>10}  {:<10}\n",
            metric.column(),
            s.n_dates,
            fmt_date(s.first),
            fmt_date(s.last),
            fmt_opt(s.last_cumul),
            fmt_opt(s.last_diff),
            fmt_opt(s.peak_diff.map(|(_, v)| v)),
            fmt_date(s.peak_diff.map(|(d, _)| d)),
        ));
    }
    out
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "-".to_string(),
    }
}
