//! Export series bundles to CSV and JSON.
//!
//! The CSV export is a wide table meant for spreadsheets; the JSON export keeps
//! the full bundle structure for downstream scripts.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{Metric, SeriesBundle, SeriesKind};
use crate::error::AppError;

/// Write one series kind of a bundle as `date,<metric>...` rows.
///
/// The date index is the union over the requested metrics; gaps are written as 0.
pub fn write_bundle_csv(
    path: &Path,
    bundle: &SeriesBundle,
    kind: SeriesKind,
    metrics: &[Metric],
) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let header: Vec<&str> = metrics.iter().map(|m| m.column()).collect();
    writeln!(file, "date,{}", header.join(","))
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    let index = bundle.date_index(kind, metrics);
    let columns: Vec<Vec<f64>> = metrics
        .iter()
        .map(|&m| bundle.aligned(kind, m, &index))
        .collect();

    for (i, date) in index.iter().enumerate() {
        let values: Vec<String> = columns.iter().map(|c| fmt_value(c[i])).collect();
        writeln!(file, "{date},{}", values.join(","))
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the named bundles as pretty JSON.
pub fn write_bundles_json(path: &Path, bundles: &BTreeMap<String, SeriesBundle>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, bundles)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// Derive a per-name, per-kind path from a base export path.
///
/// `out.csv` + (`Bretagne`, diff) -> `out_bretagne_diff.csv`. With a single name
/// and a single kind the base path is used unchanged.
pub fn export_path(base: &Path, name: &str, kind: SeriesKind, single: bool) -> PathBuf {
    if single {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("export");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let kind = match kind {
        SeriesKind::Cumul => "cumul",
        SeriesKind::Diff => "diff",
    };
    base.with_file_name(format!("{stem}_{slug}_{kind}.{ext}"))
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
