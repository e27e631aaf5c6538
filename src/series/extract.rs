//! Per-unit extraction: raw rows -> cumulative + differential series.
//!
//! Reported values are trusted as cumulative totals. The differential series is
//! derived against the previous *calendar* day, so a gap in reporting makes the
//! next value count from zero rather than from the last reported row.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{Granularity, Metric, Observation, Series, SeriesBundle};
use crate::error::SeriesError;
use crate::series::calendar::previous_day;

/// Build the series bundle for one unit.
///
/// An unknown `unit_code` is not an error: every requested metric gets an
/// empty series.
pub fn build_unit_series(
    rows: &[Observation],
    unit_code: &str,
    metrics: &[Metric],
) -> Result<SeriesBundle, SeriesError> {
    let unit_rows: Vec<&Observation> = rows.iter().filter(|r| r.unit_code == unit_code).collect();
    debug!(unit = unit_code, rows = unit_rows.len(), "building unit series");
    bundle_from_rows(unit_rows, metrics)
}

/// Build a bundle for every distinct unit code in `rows`.
///
/// Rows are grouped in a single pass; within a unit the original row order is
/// kept so duplicate dates resolve exactly as in [`build_unit_series`].
pub fn build_all_units(
    rows: &[Observation],
    metrics: &[Metric],
) -> Result<BTreeMap<String, SeriesBundle>, SeriesError> {
    let mut by_unit: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for row in rows {
        by_unit.entry(row.unit_code.as_str()).or_default().push(row);
    }

    let mut out = BTreeMap::new();
    for (code, unit_rows) in by_unit {
        out.insert(code.to_string(), bundle_from_rows(unit_rows, metrics)?);
    }
    debug!(units = out.len(), "built unit series");
    Ok(out)
}

/// National series from the pre-aggregated `pays` rows.
pub fn national_reported(
    rows: &[Observation],
    metrics: &[Metric],
) -> Result<SeriesBundle, SeriesError> {
    let national: Vec<&Observation> = rows
        .iter()
        .filter(|r| r.granularity == Granularity::Pays)
        .collect();
    debug!(rows = national.len(), "building national series from reported rows");
    bundle_from_rows(national, metrics)
}

fn bundle_from_rows(
    mut rows: Vec<&Observation>,
    metrics: &[Metric],
) -> Result<SeriesBundle, SeriesError> {
    // Stable: ties keep input order, and the last one wins below.
    rows.sort_by_key(|r| r.date);

    let mut bundle = SeriesBundle::empty(metrics);
    for &metric in metrics {
        let mut cumul = Series::new();
        for row in &rows {
            cumul.insert(row.date, row.value(metric));
        }
        let diff = differential(&cumul)?;
        bundle.cumul.insert(metric, cumul);
        bundle.diff.insert(metric, diff);
    }
    Ok(bundle)
}

/// Day-over-day change of a cumulative series.
///
/// `diff[d] = cumul[d] - cumul[d - 1 day]`, with a missing previous day read as 0.
pub fn differential(cumul: &Series) -> Result<Series, SeriesError> {
    let mut diff = Series::new();
    for (&date, &value) in cumul {
        let prev = cumul.get(&previous_day(date)?).copied().unwrap_or(0.0);
        diff.insert(date, value - prev);
    }
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn deces(unit: &str, date: NaiveDate, v: f64) -> Observation {
        Observation::new(unit, date).with(Metric::Deces, v)
    }

    #[test]
    fn paris_deaths_end_to_end() {
        let rows = vec![
            deces("75", d(2021, 1, 1), 5.0),
            deces("75", d(2021, 1, 2), 8.0),
            deces("75", d(2021, 1, 3), 8.0),
        ];
        let bundle = build_unit_series(&rows, "75", &Metric::ALL).unwrap();

        let cumul: Vec<f64> = bundle.cumul[&Metric::Deces].values().copied().collect();
        let diff: Vec<f64> = bundle.diff[&Metric::Deces].values().copied().collect();
        assert_eq!(cumul, vec![5.0, 8.0, 8.0]);
        assert_eq!(diff, vec![5.0, 3.0, 0.0]);

        // Metrics absent from the rows read as zero on every observed date.
        assert_eq!(bundle.cumul[&Metric::Gueris].len(), 3);
        assert!(bundle.cumul[&Metric::Gueris].values().all(|&v| v == 0.0));
    }

    #[test]
    fn rows_are_sorted_and_last_duplicate_wins() {
        let rows = vec![
            deces("13", d(2020, 3, 2), 4.0),
            deces("13", d(2020, 3, 1), 1.0),
            deces("13", d(2020, 3, 2), 6.0),
            deces("06", d(2020, 3, 2), 100.0),
        ];
        let bundle = build_unit_series(&rows, "13", &[Metric::Deces]).unwrap();
        let cumul = &bundle.cumul[&Metric::Deces];
        assert_eq!(cumul.get(&d(2020, 3, 1)), Some(&1.0));
        assert_eq!(cumul.get(&d(2020, 3, 2)), Some(&6.0));
        assert_eq!(bundle.diff[&Metric::Deces].get(&d(2020, 3, 2)), Some(&5.0));
    }

    #[test]
    fn gap_in_reporting_diffs_against_zero() {
        let rows = vec![deces("33", d(2020, 2, 28), 3.0), deces("33", d(2020, 3, 1), 9.0)];
        let bundle = build_unit_series(&rows, "33", &[Metric::Deces]).unwrap();
        // 2020 is a leap year: 2020-02-29 is missing, so March 1st stands alone.
        assert_eq!(bundle.diff[&Metric::Deces].get(&d(2020, 3, 1)), Some(&9.0));
    }

    #[test]
    fn unknown_unit_yields_empty_series() {
        let rows = vec![deces("75", d(2021, 1, 1), 5.0)];
        let bundle = build_unit_series(&rows, "999", &[Metric::Deces, Metric::Gueris]).unwrap();
        assert_eq!(bundle.cumul.len(), 2);
        assert!(bundle.cumul.values().all(|s| s.is_empty()));
        assert!(bundle.diff.values().all(|s| s.is_empty()));
    }

    #[test]
    fn all_units_matches_per_unit_build() {
        let rows = vec![
            deces("75", d(2021, 1, 2), 8.0),
            deces("92", d(2021, 1, 1), 2.0),
            deces("75", d(2021, 1, 1), 5.0),
        ];
        let all = build_all_units(&rows, &Metric::ALL).unwrap();
        assert_eq!(all.len(), 2);
        for code in ["75", "92"] {
            assert_eq!(all[code], build_unit_series(&rows, code, &Metric::ALL).unwrap());
        }
    }

    #[test]
    fn national_uses_pays_rows_only() {
        let mut fra = deces("FRA", d(2021, 1, 1), 50.0);
        fra.granularity = Granularity::Pays;
        let mut dep = deces("DEP-75", d(2021, 1, 1), 5.0);
        dep.granularity = Granularity::Departement;

        let bundle = national_reported(&[fra, dep], &[Metric::Deces]).unwrap();
        assert_eq!(bundle.cumul[&Metric::Deces].get(&d(2021, 1, 1)), Some(&50.0));
    }

    proptest! {
        #[test]
        fn differential_reconstructs_cumulative(
            entries in proptest::collection::vec((0i64..90, 0u32..10_000), 0..60)
        ) {
            let start = d(2020, 1, 15);
            let rows: Vec<Observation> = entries
                .iter()
                .map(|&(offset, v)| deces("69", start + Duration::days(offset), f64::from(v)))
                .collect();

            let first = build_unit_series(&rows, "69", &[Metric::Deces]).unwrap();
            let second = build_unit_series(&rows, "69", &[Metric::Deces]).unwrap();
            prop_assert_eq!(&first, &second);

            let cumul = &first.cumul[&Metric::Deces];
            let diff = &first.diff[&Metric::Deces];
            prop_assert_eq!(cumul.len(), diff.len());
            for (date, value) in cumul {
                let prev = cumul.get(&previous_day(*date).unwrap()).copied().unwrap_or(0.0);
                prop_assert_eq!(*value, prev + diff[date]);
            }
        }
    }
}
