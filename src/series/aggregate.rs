//! Roll-up of unit bundles into region / country bundles.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::domain::regions::NATIONAL;
use crate::domain::{Group, Metric, Series, SeriesBundle};

/// Sum constituent bundles per group, aligned by date.
///
/// The output date index is the union of the constituents' dates; a constituent
/// without an entry for a date contributes zero. Constituent lists are
/// de-duplicated first, and a constituent with no bundle contributes nothing.
pub fn aggregate(
    unit_bundles: &BTreeMap<String, SeriesBundle>,
    groups: &[Group],
    metrics: &[Metric],
) -> BTreeMap<String, SeriesBundle> {
    let mut out = BTreeMap::new();
    for group in groups {
        let constituents = dedup_units(&group.units);
        if constituents.len() != group.units.len() {
            debug!(
                group = %group.name,
                listed = group.units.len(),
                unique = constituents.len(),
                "dropped duplicate constituents"
            );
        }

        let mut bundles = Vec::with_capacity(constituents.len());
        for code in constituents {
            match unit_bundles.get(code) {
                Some(b) => bundles.push(b),
                None => warn!(group = %group.name, unit = code, "no series for constituent"),
            }
        }

        out.insert(group.name.clone(), sum_bundles(&bundles, metrics));
    }
    out
}

/// National series as the roll-up of every unit.
pub fn national_rollup(
    unit_bundles: &BTreeMap<String, SeriesBundle>,
    metrics: &[Metric],
) -> SeriesBundle {
    let group = Group::new(NATIONAL, unit_bundles.keys().cloned());
    let mut rolled = aggregate(unit_bundles, std::slice::from_ref(&group), metrics);
    rolled.remove(NATIONAL).unwrap_or_else(|| SeriesBundle::empty(metrics))
}

fn dedup_units(units: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    units
        .iter()
        .map(String::as_str)
        .filter(|u| seen.insert(*u))
        .collect()
}

fn sum_bundles(bundles: &[&SeriesBundle], metrics: &[Metric]) -> SeriesBundle {
    let mut out = SeriesBundle::empty(metrics);
    for &metric in metrics {
        out.cumul
            .insert(metric, sum_series(bundles.iter().filter_map(|b| b.cumul.get(&metric))));
        out.diff
            .insert(metric, sum_series(bundles.iter().filter_map(|b| b.diff.get(&metric))));
    }
    out
}

fn sum_series<'a>(series: impl Iterator<Item = &'a Series>) -> Series {
    let mut total = Series::new();
    for s in series {
        for (&date, &value) in s {
            *total.entry(date).or_insert(0.0) += value;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::domain::regions::department_regions;
    use crate::series::extract::build_all_units;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bundles(rows: &[Observation]) -> BTreeMap<String, SeriesBundle> {
        build_all_units(rows, &Metric::ALL).unwrap()
    }

    #[test]
    fn sparse_constituents_are_zero_filled() {
        let rows = vec![
            Observation::new("75", d(2020, 4, 1)).with(Metric::Hospitalises, 10.0),
            Observation::new("92", d(2020, 4, 1)).with(Metric::Hospitalises, 4.0),
            Observation::new("92", d(2020, 4, 2)).with(Metric::Hospitalises, 6.0),
        ];
        let groups = vec![Group::new("idf", ["75", "92"])];
        let out = aggregate(&bundles(&rows), &groups, &[Metric::Hospitalises]);

        let cumul = &out["idf"].cumul[&Metric::Hospitalises];
        assert_eq!(cumul.get(&d(2020, 4, 1)), Some(&14.0));
        assert_eq!(cumul.get(&d(2020, 4, 2)), Some(&6.0));

        let diff = &out["idf"].diff[&Metric::Hospitalises];
        assert_eq!(diff.get(&d(2020, 4, 1)), Some(&14.0));
        assert_eq!(diff.get(&d(2020, 4, 2)), Some(&2.0));
    }

    #[test]
    fn duplicate_constituent_is_counted_once() {
        let rows = vec![
            Observation::new("69", d(2020, 4, 1)).with(Metric::Deces, 30.0),
            Observation::new("01", d(2020, 4, 1)).with(Metric::Deces, 2.0),
        ];
        let out = aggregate(&bundles(&rows), &department_regions(), &[Metric::Deces]);
        assert_eq!(out["ara"].cumul[&Metric::Deces].get(&d(2020, 4, 1)), Some(&32.0));
        assert!(out["bretagne"].cumul[&Metric::Deces].is_empty());
        assert_eq!(out.len(), 13);
    }

    #[test]
    fn missing_constituent_contributes_nothing() {
        let rows = vec![Observation::new("2A", d(2020, 4, 1)).with(Metric::Reanimation, 3.0)];
        let groups = vec![Group::new("corse", ["2A", "2B"])];
        let out = aggregate(&bundles(&rows), &groups, &[Metric::Reanimation]);
        assert_eq!(out["corse"].cumul[&Metric::Reanimation].get(&d(2020, 4, 1)), Some(&3.0));
    }

    #[test]
    fn national_rollup_sums_every_unit() {
        let rows = vec![
            Observation::new("75", d(2020, 4, 1)).with(Metric::Gueris, 1.0),
            Observation::new("13", d(2020, 4, 1)).with(Metric::Gueris, 2.0),
            Observation::new("2B", d(2020, 4, 2)).with(Metric::Gueris, 5.0),
        ];
        let fr = national_rollup(&bundles(&rows), &[Metric::Gueris]);
        let cumul = &fr.cumul[&Metric::Gueris];
        assert_eq!(cumul.get(&d(2020, 4, 1)), Some(&3.0));
        assert_eq!(cumul.get(&d(2020, 4, 2)), Some(&5.0));
    }

    proptest! {
        #[test]
        fn rollup_is_additive(
            entries in proptest::collection::vec((0usize..4, 0i64..20, 0u32..1_000), 0..40),
            listed in proptest::collection::vec(0usize..5, 1..8),
        ) {
            let units = ["01", "03", "07", "15"];
            let start = d(2020, 3, 20);
            let rows: Vec<Observation> = entries
                .iter()
                .map(|&(u, off, v)| {
                    Observation::new(units[u], start + Duration::days(off))
                        .with(Metric::Deces, f64::from(v))
                })
                .collect();
            let unit_bundles = bundles(&rows);

            // Index 4 is a code with no rows at all.
            let codes: Vec<&str> = listed.iter().map(|&i| units.get(i).copied().unwrap_or("99")).collect();
            let group = Group::new("g", codes.iter().copied());
            let out = aggregate(&unit_bundles, &[group], &[Metric::Deces]);

            let unique: HashSet<&str> = codes.iter().copied().collect();
            for (date, total) in &out["g"].cumul[&Metric::Deces] {
                let expected: f64 = unique
                    .iter()
                    .filter_map(|u| unit_bundles.get(*u))
                    .map(|b| b.cumul[&Metric::Deces].get(date).copied().unwrap_or(0.0))
                    .sum();
                prop_assert_eq!(*total, expected);
            }
        }
    }
}
