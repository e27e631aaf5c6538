//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the dataset (local CSV or HTTP fetch)
//! - builds unit / region / national series
//! - prints reports/plots
//! - writes optional exports

use std::collections::BTreeMap;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CommonArgs};
use crate::domain::regions::{REGION_CODES, REGION_DEPARTMENTS};
use crate::domain::{DataSource, Metric, RunConfig, SeriesBundle};
use crate::error::AppError;
use crate::io::export::{export_path, write_bundle_csv, write_bundles_json};

pub mod pipeline;

/// Entry point for the `covfr` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Unit(args) => {
            let config = run_config_from_args(&args.common);
            let loaded = load_and_report(&config)?;
            if let Some(region) = pipeline::unit_region(config.schema, &args.code) {
                println!("Unit {} is in region {region}", args.code);
            }
            let out = pipeline::unit_series(&loaded.dataset, &args.code, &config.metrics)?;
            present(&out, &config)
        }
        Command::Region(args) => {
            let config = run_config_from_args(&args.common);
            let loaded = load_and_report(&config)?;
            let out = pipeline::region_series(&loaded.dataset, args.name.as_deref(), &config.metrics)?;
            present(&out, &config)
        }
        Command::National(args) => {
            let config = run_config_from_args(&args.common);
            let loaded = load_and_report(&config)?;
            let out = pipeline::national_series(&loaded.dataset, args.rollup, &config.metrics)?;
            present(&out, &config)
        }
        Command::Regions => {
            print!("{}", format_region_tables());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_and_report(config: &RunConfig) -> Result<pipeline::Loaded, AppError> {
    let loaded = pipeline::load(config)?;
    println!(
        "{}",
        crate::report::format_load_summary(&loaded.dataset.stats, config.schema, &loaded.source)
    );
    Ok(loaded)
}

/// Print tables/plots and write the requested exports.
fn present(out: &BTreeMap<String, SeriesBundle>, config: &RunConfig) -> Result<(), AppError> {
    let kinds = config.kinds.kinds();
    let single = out.len() == 1 && kinds.len() == 1;

    for (name, bundle) in out {
        println!("{}", crate::report::format_bundle_summary(name, bundle, &config.metrics));

        for &kind in kinds {
            if config.plot {
                let plot = crate::plot::render_bundle(
                    name,
                    bundle,
                    kind,
                    &config.metrics,
                    config.layout,
                    config.plot_width,
                    config.plot_height,
                );
                println!("{plot}");
            }
            if let Some(base) = &config.export_csv {
                let path = export_path(base, name, kind, single);
                write_bundle_csv(&path, bundle, kind, &config.metrics)?;
                info!(path = %path.display(), "wrote CSV export");
            }
            if let Some(base) = &config.svg {
                let path = export_path(base, name, kind, single);
                if bundle.date_index(kind, &config.metrics).is_empty() {
                    warn!(name = %name, kind = kind.label(), "no data, skipping SVG chart");
                } else {
                    crate::plot::write_svg(&path, name, bundle, kind, &config.metrics, config.layout)?;
                    info!(path = %path.display(), "wrote SVG chart");
                }
            }
        }
    }

    if let Some(path) = &config.export_json {
        write_bundles_json(path, out)?;
        info!(path = %path.display(), "wrote JSON export");
    }

    Ok(())
}

pub fn run_config_from_args(args: &CommonArgs) -> RunConfig {
    let source = match &args.csv {
        Some(path) => DataSource::File(path.clone()),
        None => DataSource::Url(args.url.clone()),
    };

    let mut metrics: Vec<Metric> = Vec::new();
    for &m in &args.metrics {
        if !metrics.contains(&m) {
            metrics.push(m);
        }
    }
    if metrics.is_empty() {
        metrics = Metric::ALL.to_vec();
    }

    RunConfig {
        source,
        schema: args.schema,
        metrics,
        kinds: args.kind,
        layout: args.layout,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        svg: args.svg.clone(),
    }
}

fn format_region_tables() -> String {
    let mut out = String::from("Regions summed from departments (--schema dept):\n");
    for r in REGION_DEPARTMENTS {
        out.push_str(&format!("  {:<14} {}\n", r.region, r.departments.join(" ")));
    }
    out.push_str("\nRegions read from region rows (--schema maille):\n");
    for r in REGION_CODES {
        out.push_str(&format!("  {:<28} {}\n", r.region, r.code));
    }
    out
}
