//! CLI argument definitions for the dataset builder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "stats19",
    version,
    about = "Build a vehicle-level dataset from the road casualty statistics extract",
    long_about = "Link the accident, vehicle and casualty tables of the national road \
                  casualty statistics,\naggregate casualties per vehicle, add calendar \
                  features and impute the struck-object category."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline and write the dataset.
    Build(BuildArgs),

    /// Print the declared output schema.
    Schema(SchemaArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// TOML file with pipeline options.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the yearly CSV extracts.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Years to process, comma separated.
    #[arg(long = "years", value_delimiter = ',', num_args = 1..)]
    pub years: Option<Vec<i32>>,

    /// Output CSV path; the schema is written to `<OUTPUT>.schema.json`.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// How missing values are written.
    #[arg(long = "missing-marker", value_enum)]
    pub missing_marker: Option<MissingMarkerArg>,

    /// Add mean casualty age and male share per vehicle.
    #[arg(long = "include-auxiliary")]
    pub include_auxiliary: bool,

    /// Count passengers when taking the modal casualty type.
    #[arg(long = "keep-passengers")]
    pub keep_passengers: bool,

    /// Seed of the train/validation split.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Run everything but skip writing the dataset.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct SchemaArgs {
    /// TOML file with pipeline options.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include the auxiliary aggregate columns.
    #[arg(long = "include-auxiliary")]
    pub include_auxiliary: bool,

    /// Print the schema as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MissingMarkerArg {
    Null,
    Sentinel,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
