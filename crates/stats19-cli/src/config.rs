//! Pipeline options from a TOML file plus command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use stats19_model::{MissingMarker, PipelineOptions};

/// Loads options from `path`, or the defaults when no file is given.
///
/// Fields absent from the file keep their default values.
pub fn load_options(path: Option<&Path>) -> Result<PipelineOptions> {
    let Some(path) = path else {
        return Ok(PipelineOptions::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let options: PipelineOptions =
        toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
    Ok(options)
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub data_dir: Option<PathBuf>,
    pub years: Option<Vec<i32>>,
    pub output: Option<PathBuf>,
    pub missing_marker: Option<MissingMarker>,
    pub include_auxiliary: Option<bool>,
    pub keep_passengers: Option<bool>,
    pub seed: Option<u64>,
}

impl OptionOverrides {
    pub fn apply(self, options: &mut PipelineOptions) {
        if let Some(data_dir) = self.data_dir {
            options.data_dir = data_dir;
        }
        if let Some(years) = self.years {
            options.years = years;
        }
        if let Some(output) = self.output {
            options.output = Some(output);
        }
        if let Some(marker) = self.missing_marker {
            options.missing_marker = marker;
        }
        if let Some(include) = self.include_auxiliary {
            options.aggregation.include_auxiliary_aggregates = include;
        }
        if let Some(keep) = self.keep_passengers {
            options.aggregation.exclude_passengers_from_modal_type = !keep;
        }
        if let Some(seed) = self.seed {
            options.imputation.seed = seed;
        }
    }
}

/// Rejects option combinations no stage can run with.
pub fn validate_options(options: &PipelineOptions) -> Result<()> {
    if options.years.is_empty() {
        bail!("no years configured");
    }
    if !options.file_template.contains("{kind}") || !options.file_template.contains("{year}") {
        bail!(
            "file template '{}' must contain both {{kind}} and {{year}}",
            options.file_template
        );
    }
    let fraction = options.imputation.validation_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        bail!("validation_fraction must be in (0, 1), got {fraction}");
    }
    options
        .feature_schema()
        .validate()
        .context("invalid schema overrides")?;
    Ok(())
}
