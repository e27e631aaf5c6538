//! Shared series pipeline used by every CLI command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load table -> per-unit series -> region / national roll-up
//!
//! The commands can then focus on presentation (tables, plots, exports).

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::data::OpenCovidClient;
use crate::domain::regions::{NATIONAL, code_regions, department_regions, region_of_department};
use crate::domain::{DataSource, Group, Metric, RunConfig, Schema, SeriesBundle};
use crate::error::AppError;
use crate::io::ingest::{Dataset, load_csv};
use crate::series::{aggregate, build_all_units, build_unit_series, national_reported, national_rollup};

/// The loaded table plus a human-readable description of where it came from.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    pub source: String,
}

/// Load the source table per `config`.
pub fn load(config: &RunConfig) -> Result<Loaded, AppError> {
    let (dataset, source) = match &config.source {
        DataSource::File(path) => (load_csv(path, config.schema)?, path.display().to_string()),
        DataSource::Url(url) => {
            let client = match url {
                Some(url) => OpenCovidClient::new(url.clone()),
                None => OpenCovidClient::from_env(),
            };
            (client.fetch_dataset(config.schema)?, client.url().to_string())
        }
    };

    if dataset.rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("No rows remain after loading '{source}' with schema {:?}.", config.schema),
        ));
    }

    Ok(Loaded { dataset, source })
}

/// Series for a single unit, keyed by its code.
pub fn unit_series(
    dataset: &Dataset,
    code: &str,
    metrics: &[Metric],
) -> Result<BTreeMap<String, SeriesBundle>, AppError> {
    let bundle = build_unit_series(&dataset.rows, code, metrics)?;
    if bundle.cumul.values().all(|s| s.is_empty()) {
        warn!(unit = code, schema = ?dataset.schema, "no rows for unit");
    }
    Ok(BTreeMap::from([(code.to_string(), bundle)]))
}

/// Region a department unit belongs to, if `code` names one.
pub fn unit_region(schema: Schema, code: &str) -> Option<&'static str> {
    match schema {
        Schema::Dept => region_of_department(code),
        Schema::Maille => code.strip_prefix("DEP-").and_then(region_of_department),
    }
}

/// Region groups for the dataset's schema.
pub fn region_groups(schema: Schema) -> Vec<Group> {
    match schema {
        Schema::Dept => department_regions(),
        Schema::Maille => code_regions(),
    }
}

/// Series for every region, or only for `name` (case-insensitive).
pub fn region_series(
    dataset: &Dataset,
    name: Option<&str>,
    metrics: &[Metric],
) -> Result<BTreeMap<String, SeriesBundle>, AppError> {
    let mut groups = region_groups(dataset.schema);
    if let Some(name) = name {
        groups.retain(|g| g.name.eq_ignore_ascii_case(name.trim()));
        if groups.is_empty() {
            let known: Vec<String> = region_groups(dataset.schema).into_iter().map(|g| g.name).collect();
            return Err(AppError::new(
                2,
                format!(
                    "Unknown region '{name}' for schema {:?}. Known regions: {}",
                    dataset.schema,
                    known.join(", ")
                ),
            ));
        }
    }

    let units = build_all_units(&dataset.rows, metrics)?;
    let out = aggregate(&units, &groups, metrics);
    info!(regions = out.len(), "built region series");
    Ok(out)
}

/// National series.
///
/// The department schema has no national rows, so it always rolls up its
/// departments. The maille schema reads the `pays` rows unless `rollup` asks for
/// the sum of its department rows.
pub fn national_series(
    dataset: &Dataset,
    rollup: bool,
    metrics: &[Metric],
) -> Result<BTreeMap<String, SeriesBundle>, AppError> {
    let bundle = match (dataset.schema, rollup) {
        (Schema::Dept, _) => national_rollup(&build_all_units(&dataset.rows, metrics)?, metrics),
        (Schema::Maille, true) => {
            let mut units = build_all_units(&dataset.rows, metrics)?;
            units.retain(|code, _| code.starts_with("DEP-"));
            national_rollup(&units, metrics)
        }
        (Schema::Maille, false) => {
            let bundle = national_reported(&dataset.rows, metrics)?;
            if bundle.cumul.values().all(|s| s.is_empty()) {
                warn!("no `pays` rows in the table; try --rollup");
            }
            bundle
        }
    };
    Ok(BTreeMap::from([(NATIONAL.to_string(), bundle)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::parse_observations;
    use chrono::NaiveDate;

    const CSV: &str = "date,granularite,maille_code,deces\n\
2020-04-01,departement,DEP-75,10\n\
2020-04-01,departement,DEP-92,4\n\
2020-04-02,departement,DEP-75,12\n\
2020-04-01,region,REG-11,15\n\
2020-04-01,pays,FRA,100\n";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dataset(schema: Schema) -> Dataset {
        parse_observations(CSV.as_bytes(), schema).unwrap()
    }

    fn deces_on(out: &BTreeMap<String, SeriesBundle>, name: &str, date: NaiveDate) -> Option<f64> {
        out[name].cumul[&Metric::Deces].get(&date).copied()
    }

    #[test]
    fn dept_schema_sums_departments() {
        let ds = dataset(Schema::Dept);
        let out = region_series(&ds, Some("Ile-de-France"), &[Metric::Deces]).unwrap();
        assert_eq!(deces_on(&out, "ile-de-france", d(2020, 4, 1)), Some(14.0));
        assert_eq!(deces_on(&out, "ile-de-france", d(2020, 4, 2)), Some(12.0));

        let fr = national_series(&ds, false, &[Metric::Deces]).unwrap();
        assert_eq!(deces_on(&fr, NATIONAL, d(2020, 4, 1)), Some(14.0));
    }

    #[test]
    fn maille_schema_reads_region_and_country_rows() {
        let ds = dataset(Schema::Maille);
        let out = region_series(&ds, Some("ile-de-france"), &[Metric::Deces]).unwrap();
        assert_eq!(deces_on(&out, "Ile-de-France", d(2020, 4, 1)), Some(15.0));

        let fr = national_series(&ds, false, &[Metric::Deces]).unwrap();
        assert_eq!(deces_on(&fr, NATIONAL, d(2020, 4, 1)), Some(100.0));

        let rolled = national_series(&ds, true, &[Metric::Deces]).unwrap();
        assert_eq!(deces_on(&rolled, NATIONAL, d(2020, 4, 1)), Some(14.0));
    }

    #[test]
    fn unknown_region_lists_known_names() {
        let ds = dataset(Schema::Dept);
        let err = region_series(&ds, Some("atlantis"), &[Metric::Deces]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("bretagne"));
    }

    #[test]
    fn department_units_resolve_their_region() {
        assert_eq!(unit_region(Schema::Dept, "69"), Some("ara"));
        assert_eq!(unit_region(Schema::Maille, "DEP-2B"), Some("corse"));
        assert_eq!(unit_region(Schema::Maille, "REG-11"), None);
        assert_eq!(unit_region(Schema::Dept, "999"), None);
    }

    #[test]
    fn unknown_unit_is_empty_not_an_error() {
        let ds = dataset(Schema::Dept);
        let out = unit_series(&ds, "971", &[Metric::Deces]).unwrap();
        assert!(out["971"].cumul[&Metric::Deces].is_empty());
    }
}
