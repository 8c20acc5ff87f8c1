//! Imputation of the struck-object category (`casualty_modal_type`).
//!
//! Vehicles with no non-passenger casualty have no modal casualty type. The
//! step here learns the category from the labelled vehicles with a softmax
//! gradient-boosted tree classifier and fills the gaps:
//!
//! - **dataset**: feature matrices and per-feature binning
//! - **split**: seeded stratified train/validation split
//! - **classifier**: the [`Classifier`] seam and fit reporting
//! - **tree** / **booster**: the histogram tree learner
//! - **step**: [`ImputationStep`], which writes predictions back into the frame

pub mod booster;
pub mod classifier;
pub mod dataset;
pub mod error;
pub mod split;
pub mod step;
pub mod tree;

pub use booster::{BoosterParams, GradientBoostedTrees};
pub use classifier::{Classifier, FitReport, multiclass_error};
pub use dataset::{BinMapper, Dataset, FeatureKind, FeatureMatrix};
pub use error::{ImputeError, Result};
pub use split::{Split, stratified_split};
pub use step::{ImputationReport, ImputationStep};
pub use tree::TreeParams;
