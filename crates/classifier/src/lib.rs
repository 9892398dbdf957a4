// Rust guideline compliant 2026-10-19

//! Bot classifier for the bot-watch pipeline.
//!
//! [`ClassificationService`] turns an `Account` into a `ClassificationResult`.
//! It loads a decision-tree ensemble once through a [`ModelSource`] port and
//! falls back to [`HeuristicFallbackClassifier`] whenever the model is missing
//! or a traversal fails. `classify` never returns an error.
//!
//! Building blocks, leaves first: [`features`] (schema + extraction),
//! [`model`] (tree arena + artifact decoding), [`ensemble`] (voting and
//! confidence), [`fallback`] (rule scoring), [`category`] (severity buckets).

pub mod category;
pub mod config;
pub mod ensemble;
pub mod fallback;
pub mod features;
pub mod model;
pub mod service;

pub use category::CategoryThresholds;
pub use config::{ClassifierConfig, ClassifierConfigBuilder, Comparison, Rule, WeightedRule};
pub use ensemble::{Confidence, EnsembleClassifier, Prediction};
pub use fallback::{FallbackVerdict, HeuristicFallbackClassifier};
pub use features::{FeatureName, FeatureSchema, extract};
pub use model::{DecisionTree, EnsembleModel, Node, NodeId};
pub use service::{ClassificationService, ModelSource, ModelState};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// The importance list does not line up with the feature list.
    #[error("{importances} importances for {features} features")]
    LengthMismatch {
        /// Number of declared features.
        features: usize,
        /// Number of supplied importances.
        importances: usize,
    },
    /// An importance weight is negative or not finite.
    #[error("importance for feature `{feature}` must be finite and >= 0, got {value}")]
    InvalidImportance {
        /// Feature the weight belongs to.
        feature: String,
        /// The rejected weight.
        value: f64,
    },
}

/// Errors raised while obtaining an [`EnsembleModel`]. Always recovered by
/// switching the service to fallback mode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelLoadError {
    /// No artifact at the configured location.
    #[error("model artifact not found at {location}")]
    NotFound {
        /// Where the artifact was expected.
        location: String,
    },
    /// The artifact exists but could not be read.
    #[error("model artifact at {location} unreadable: {reason}")]
    Unreadable {
        /// Where the artifact lives.
        location: String,
        /// Human-readable description.
        reason: String,
    },
    /// The artifact is not a valid model document.
    #[error("malformed model artifact: {reason}")]
    Malformed {
        /// Human-readable description.
        reason: String,
    },
    /// The document parsed but violates a structural rule.
    #[error("invalid model: {reason}")]
    Invalid {
        /// Human-readable description.
        reason: String,
    },
    /// The feature schema is inconsistent.
    #[error("invalid feature schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors raised while evaluating the ensemble. Recovered per call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    /// The ensemble holds no trees.
    #[error("ensemble has no trees")]
    EmptyEnsemble,
    /// The feature vector does not match the schema.
    #[error("feature vector has {actual} values, schema expects {expected}")]
    VectorLength {
        /// Schema length.
        expected: usize,
        /// Supplied vector length.
        actual: usize,
    },
    /// A child reference points outside the tree arena.
    #[error("tree {tree}: node {node} does not exist")]
    DanglingNode {
        /// Index of the tree in the ensemble.
        tree: usize,
        /// Missing node index.
        node: NodeId,
    },
    /// A split reads a feature the vector does not have.
    #[error("tree {tree}: feature index {feature} out of range for {len} features")]
    FeatureOutOfRange {
        /// Index of the tree in the ensemble.
        tree: usize,
        /// Offending feature index.
        feature: usize,
        /// Vector length.
        len: usize,
    },
    /// Traversal visited more nodes than the tree holds.
    #[error("tree {tree}: traversal did not reach a leaf within {steps} steps")]
    Cycle {
        /// Index of the tree in the ensemble.
        tree: usize,
        /// Step budget that was exhausted.
        steps: usize,
    },
    /// A leaf vote is not a probability.
    #[error("tree {tree}: leaf vote {vote} outside [0, 1]")]
    InvalidVote {
        /// Index of the tree in the ensemble.
        tree: usize,
        /// The rejected vote.
        vote: f64,
    },
}

/// Errors returned by [`ClassifierConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    /// The supplied configuration is invalid.
    #[error("invalid classifier configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
