//! Command-line parsing for the French COVID-19 series tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the series code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{KindSelection, Layout, Metric, Schema};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covfr", version, about = "French COVID-19 cumulative/daily series by department, region and country")]
pub struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Series for one unit (department code, or maille code with `--schema maille`).
    Unit(UnitArgs),
    /// Series for every region, or for one region.
    Region(RegionArgs),
    /// National series.
    National(NationalArgs),
    /// Print the static region tables.
    Regions,
}

#[derive(Debug, Args, Clone)]
pub struct UnitArgs {
    /// Unit code, e.g. `75` (dept schema) or `DEP-75` (maille schema).
    pub code: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct RegionArgs {
    /// Region name (as listed by `covfr regions`); all regions when omitted.
    pub name: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct NationalArgs {
    /// Sum every unit instead of reading the `pays` rows.
    ///
    /// Always on with `--schema dept`, which has no national rows.
    #[arg(long)]
    pub rollup: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options shared by every series command.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Read a local CSV instead of fetching the dataset.
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    pub csv: Option<PathBuf>,

    /// Dataset URL (defaults to `COVFR_DATA_URL`, then the opencovid19-fr CSV).
    #[arg(long)]
    pub url: Option<String>,

    /// How units are keyed in the table.
    #[arg(long, value_enum, default_value_t = Schema::Maille)]
    pub schema: Schema,

    /// Metric to include (repeatable). Defaults to all seven.
    #[arg(short = 'm', long = "metric", value_enum)]
    pub metrics: Vec<Metric>,

    /// Which series to report and plot.
    #[arg(long, value_enum, default_value_t = KindSelection::Both)]
    pub kind: KindSelection,

    /// One panel per metric, or all metrics overlaid.
    #[arg(long, value_enum, default_value_t = Layout::Separate)]
    pub layout: Layout,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export series to CSV (one file per name and kind when there are several).
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export all computed bundles to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write SVG charts (one file per name and kind when there are several).
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}
