use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tracing::{info, info_span};

use stats19_cli::config::{OptionOverrides, load_options, validate_options};
use stats19_cli::output::write_outputs;
use stats19_cli::pipeline::run_pipeline;
use stats19_ingest::CsvTableSource;
use stats19_model::{ColumnRole, MissingMarker, PipelineOptions};

use crate::cli::{BuildArgs, MissingMarkerArg, SchemaArgs};
use crate::summary::{apply_table_style, header_cell};
use crate::types::BuildResult;

const DEFAULT_OUTPUT_FILE: &str = "vehicles.csv";

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let options = build_options(args)?;
    let span = info_span!("build", data_dir = %options.data_dir.display());
    let _guard = span.enter();

    let source = CsvTableSource::new(&options.data_dir)
        .with_file_template(options.file_template.clone());
    source.ensure_data_dir().context("locate data directory")?;

    let output = run_pipeline(&source, &options)?;
    let outputs = if args.dry_run {
        info!("dry run, dataset not written");
        None
    } else {
        let dataset = output_path(&options);
        Some(write_outputs(&output.model, &dataset, options.missing_marker)?)
    };

    Ok(BuildResult {
        rows: output.model.record_count(),
        columns: output.model.data.width(),
        years: output.years,
        features: output.features,
        imputation: output.imputation,
        outputs,
    })
}

pub fn run_schema(args: &SchemaArgs) -> Result<()> {
    let mut options = load_options(args.config.as_deref())?;
    if args.include_auxiliary {
        options.aggregation.include_auxiliary_aggregates = true;
    }
    let schema = options.feature_schema();
    schema.validate().context("invalid schema")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Column"), header_cell("Role")]);
    apply_table_style(&mut table);
    for (idx, (name, role)) in schema.columns().enumerate() {
        let role = match role {
            ColumnRole::Categorical if name == schema.imputed_label => "categorical (imputed)",
            ColumnRole::Categorical => "categorical",
            ColumnRole::Numerical => "numerical",
            ColumnRole::Target => "target",
        };
        table.add_row(vec![Cell::new(idx + 1), Cell::new(name), Cell::new(role)]);
    }
    println!("{table}");
    Ok(())
}

fn build_options(args: &BuildArgs) -> Result<PipelineOptions> {
    let mut options = load_options(args.config.as_deref())?;
    OptionOverrides {
        data_dir: args.data_dir.clone(),
        years: args.years.clone(),
        output: args.output.clone(),
        missing_marker: args.missing_marker.map(|marker| match marker {
            MissingMarkerArg::Null => MissingMarker::Null,
            MissingMarkerArg::Sentinel => MissingMarker::Sentinel,
        }),
        include_auxiliary: args.include_auxiliary.then_some(true),
        keep_passengers: args.keep_passengers.then_some(true),
        seed: args.seed,
    }
    .apply(&mut options);
    validate_options(&options)?;
    Ok(options)
}

fn output_path(options: &PipelineOptions) -> PathBuf {
    options
        .output
        .clone()
        .unwrap_or_else(|| options.data_dir.join("output").join(DEFAULT_OUTPUT_FILE))
}
