use stats19_cli::output::OutputPaths;
use stats19_impute::ImputationReport;
use stats19_transform::{FeatureReport, YearSummary};

#[derive(Debug)]
pub struct BuildResult {
    pub years: Vec<YearSummary>,
    pub features: FeatureReport,
    pub imputation: ImputationReport,
    pub rows: usize,
    pub columns: usize,
    /// `None` on a dry run.
    pub outputs: Option<OutputPaths>,
}
