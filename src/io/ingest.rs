//! CSV ingest and normalization.
//!
//! This module turns the `chiffres-cles` CSV into typed [`Observation`] rows.
//!
//! Design goals:
//! - **Strict schema** for required fields (`maille_code` or `unit_code`, `date`)
//! - **Fail fast** on malformed cells: a bad date or number aborts the load with
//!   the offending line, since the differential transform cannot recover from it
//! - **Lenient metrics**: absent metric columns and empty cells read as zero
//! - **Separation of concerns**: no series logic here

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{Granularity, Metric, Observation, Schema};
use crate::error::{AppError, SeriesError};
use crate::series::calendar::parse_iso_date;

const DEPARTMENT_PREFIX: &str = "DEP-";
const UNIT_COLUMN: &str = "maille_code";
/// Accepted spelling of [`UNIT_COLUMN`].
const UNIT_COLUMN_ALIAS: &str = "unit_code";

/// Summary of what the loader read and kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows dropped because they don't belong to the selected schema.
    pub rows_skipped: usize,
    pub units: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Metric columns present in the header.
    pub metric_columns: Vec<Metric>,
}

/// Ingest output: rows + the schema they were keyed with + stats.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub schema: Schema,
    pub rows: Vec<Observation>,
    pub stats: LoadStats,
}

/// Load a local CSV file.
pub fn load_csv(path: &Path, schema: Schema) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let dataset = parse_observations(file, schema)?;
    info!(path = %path.display(), rows = dataset.stats.rows_used, "loaded CSV");
    Ok(dataset)
}

/// Parse CSV text into observations keyed according to `schema`.
pub fn parse_observations<R: Read>(reader: R, schema: Schema) -> Result<Dataset, SeriesError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| SeriesError::malformed(format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let metric_columns: Vec<Metric> = Metric::ALL
        .into_iter()
        .filter(|m| header_map.contains_key(m.column()))
        .collect();
    debug!(?metric_columns, "resolved metric columns");

    let mut rows = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for result in reader.records() {
        rows_read += 1;
        // Fallback assumes one physical line per record after the header.
        let fallback = rows_read as u64 + 1;

        let record = result.map_err(|e| {
            let line = e.position().map_or(fallback, |p| p.line());
            SeriesError::malformed(format!("line {line}: CSV parse error: {e}"))
        })?;
        // Quoted fields may span lines, so take the record's own start line.
        let line = record.position().map_or(fallback, |p| p.line());
        let row = parse_row(&record, &header_map, &metric_columns)
            .map_err(|e| SeriesError::malformed(format!("line {line}: {e}")))?;

        match key_for_schema(row, schema) {
            Some(row) => rows.push(row),
            None => rows_skipped += 1,
        }
    }

    let stats = compute_stats(&rows, rows_read, rows_skipped, metric_columns);
    Ok(Dataset {
        schema,
        rows,
        stats,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();
    if !map.contains_key(UNIT_COLUMN) {
        if let Some(&idx) = map.get(UNIT_COLUMN_ALIAS) {
            map.insert(UNIT_COLUMN.to_string(), idx);
        }
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), SeriesError> {
    if !header_map.contains_key(UNIT_COLUMN) {
        return Err(SeriesError::malformed(format!(
            "missing required column: `{UNIT_COLUMN}` (or `{UNIT_COLUMN_ALIAS}`)"
        )));
    }
    if !header_map.contains_key("date") {
        return Err(SeriesError::malformed("missing required column: `date`"));
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    metric_columns: &[Metric],
) -> Result<Observation, String> {
    let unit_code = get_required(record, header_map, UNIT_COLUMN)?.to_string();
    let date = parse_iso_date(get_required(record, header_map, "date")?).map_err(|e| match e {
        SeriesError::MalformedInput(msg) => msg,
        other => other.to_string(),
    })?;

    let mut row = Observation::new(unit_code, date);
    row.granularity = Granularity::parse(get_optional(record, header_map, "granularite"));
    row.unit_name = get_optional(record, header_map, "maille_nom").map(str::to_string);

    for &metric in metric_columns {
        *row.slot_mut(metric) = parse_opt_f64(get_optional(record, header_map, metric.column()))
            .map_err(|raw| format!("invalid `{}` value '{raw}'", metric.column()))?;
    }

    Ok(row)
}

/// Re-key a row for the schema, or drop it if it doesn't belong there.
fn key_for_schema(mut row: Observation, schema: Schema) -> Option<Observation> {
    match schema {
        Schema::Maille => Some(row),
        Schema::Dept => {
            let code = row.unit_code.strip_prefix(DEPARTMENT_PREFIX)?.to_string();
            row.unit_code = code;
            Some(row)
        }
    }
}

fn compute_stats(
    rows: &[Observation],
    rows_read: usize,
    rows_skipped: usize,
    metric_columns: Vec<Metric>,
) -> LoadStats {
    let units: BTreeSet<&str> = rows.iter().map(|r| r.unit_code.as_str()).collect();
    LoadStats {
        rows_read,
        rows_used: rows.len(),
        rows_skipped,
        units: units.len(),
        first_date: rows.iter().map(|r| r.date).min(),
        last_date: rows.iter().map(|r| r.date).max(),
        metric_columns,
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Empty -> `Ok(None)`; a non-finite or unparsable number -> `Err(raw)`.
fn parse_opt_f64(s: Option<&str>) -> Result<Option<f64>, String> {
    let Some(s) = s else { return Ok(None) };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(s.to_string()),
    }
}
