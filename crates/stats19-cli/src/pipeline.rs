//! End-to-end orchestration of the dataset build.
//!
//! Years are loaded and extracted one at a time in ascending order, then
//! concatenated for feature engineering (elapsed time needs the global
//! minimum timestamp), partitioned by the declared schema and imputed.

use std::time::Instant;

use anyhow::{Context, Result, bail};
use stats19_impute::{Classifier, ImputationReport, ImputationStep};
use stats19_ingest::{TableSource, load_year};
use stats19_model::PipelineOptions;
use stats19_transform::{
    FeatureReport, ModelFrame, YearSummary, engineer_features, extract_year, feature_frame,
    partition,
};
use tracing::{info, info_span, warn};

/// Everything a run produces before it is written out.
#[derive(Debug)]
pub struct PipelineOutput {
    pub model: ModelFrame,
    pub years: Vec<YearSummary>,
    pub features: FeatureReport,
    pub imputation: ImputationReport,
}

impl PipelineOutput {
    pub fn dropped_vehicles(&self) -> usize {
        self.years.iter().map(|year| year.join.dropped_vehicles).sum()
    }
}

/// Runs the whole pipeline with the gradient-boosted imputation model.
pub fn run_pipeline(source: &dyn TableSource, options: &PipelineOptions) -> Result<PipelineOutput> {
    let mut step = ImputationStep::gradient_boosted(options.imputation.clone());
    run_pipeline_with(source, options, &mut step)
}

/// Runs the whole pipeline with a caller-supplied imputation step.
pub fn run_pipeline_with<C: Classifier>(
    source: &dyn TableSource,
    options: &PipelineOptions,
    step: &mut ImputationStep<C>,
) -> Result<PipelineOutput> {
    let years = options.ordered_years();
    if years.is_empty() {
        bail!("no years configured");
    }
    let schema = options.feature_schema();
    let start = Instant::now();

    let mut rows = Vec::new();
    let mut summaries = Vec::with_capacity(years.len());
    for year in years {
        let tables = load_year(source, year).with_context(|| format!("load year {year}"))?;
        let extract = extract_year(tables, &options.aggregation);
        rows.extend(extract.rows);
        summaries.push(extract.summary);
    }

    let features_span = info_span!("features", rows = rows.len());
    let (features, feature_report) = features_span.in_scope(|| engineer_features(rows));
    if features.is_empty() {
        warn!("no vehicle survived the joins; the dataset is empty");
    }

    let df = feature_frame(
        &features,
        options.aggregation.include_auxiliary_aggregates,
    )
    .context("build feature frame")?;
    let partition_span = info_span!("partition", columns = schema.column_count());
    let mut model = partition_span
        .in_scope(|| partition(&df, &schema))
        .context("partition feature frame")?;

    let imputation = step
        .run(&mut model)
        .with_context(|| format!("impute {}", schema.imputed_label))?;

    let output = PipelineOutput {
        model,
        years: summaries,
        features: feature_report,
        imputation,
    };
    info!(
        rows = output.model.record_count(),
        columns = output.model.data.width(),
        dropped_vehicles = output.dropped_vehicles(),
        imputed = output.imputation.imputed_rows,
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(output)
}
