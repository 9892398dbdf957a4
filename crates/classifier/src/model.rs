// Rust guideline compliant 2026-10-19

//! Decision-tree arena and model artifact decoding.
//!
//! Trees are stored as a flat `Vec<Node>` with index-based children, root at
//! index 0, so a loaded [`EnsembleModel`] can be shared behind an `Arc`
//! without ownership cycles.
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "name": "bot-forest",
//!   "version": "3",
//!   "features": ["ffratio", "statuses_count"],
//!   "importances": [0.6, 0.4],
//!   "trees": [
//!     { "feature": 0, "threshold": 2.0, "left": 0.1, "right": 0.9 }
//!   ]
//! }
//! ```
//!
//! A child is either a nested split or a bare number (the leaf vote).
//! `name`, `version` and `importances` are optional.

use serde::Deserialize;

use crate::features::{FeatureName, FeatureSchema};
use crate::{InferenceError, ModelLoadError};

/// Index of a node inside its tree's arena.
pub type NodeId = usize;

/// One arena slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Terminal vote in `[0, 1]`.
    Leaf(f64),
    /// Go `left` when `vector[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: NodeId,
        right: NodeId,
    },
}

/// A binary decision tree in arena form. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Wrap an arena whose root is `nodes[0]`.
    ///
    /// No structural check happens here; [`evaluate`](Self::evaluate) reports
    /// dangling references, out-of-range features and cycles as errors.
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Walk from the root to a leaf and return its vote.
    ///
    /// `tree` is the tree's position in the ensemble, used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] for a missing node, a feature index beyond
    /// `vector`, a vote outside `[0, 1]`, or a walk longer than the arena.
    pub fn evaluate(&self, tree: usize, vector: &[f64]) -> Result<f64, InferenceError> {
        let mut current: NodeId = 0;
        // An acyclic walk visits each node at most once.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(current) {
                None => return Err(InferenceError::DanglingNode { tree, node: current }),
                Some(&Node::Leaf(vote)) => {
                    if !(0.0..=1.0).contains(&vote) {
                        return Err(InferenceError::InvalidVote { tree, vote });
                    }
                    return Ok(vote);
                }
                Some(&Node::Split { feature, threshold, left, right }) => {
                    let value = vector.get(feature).ok_or(InferenceError::FeatureOutOfRange {
                        tree,
                        feature,
                        len: vector.len(),
                    })?;
                    current = if *value <= threshold { left } else { right };
                }
            }
        }
        if self.nodes.is_empty() {
            return Err(InferenceError::DanglingNode { tree, node: 0 });
        }
        Err(InferenceError::Cycle {
            tree,
            steps: self.nodes.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// EnsembleModel
// ---------------------------------------------------------------------------

/// Forest plus the feature schema it was trained on.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleModel {
    name: String,
    version: String,
    schema: FeatureSchema,
    trees: Vec<DecisionTree>,
}

impl EnsembleModel {
    /// Assemble a model from already-built parts.
    #[must_use]
    pub fn new(schema: FeatureSchema, trees: Vec<DecisionTree>) -> Self {
        Self {
            name: "forest".to_owned(),
            version: "unversioned".to_owned(),
            schema,
            trees,
        }
    }

    /// Attach a name and version for logging.
    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.name = name.into();
        self.version = version.into();
        self
    }

    /// Decode and validate a JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelLoadError::Malformed`] when the text is not a model
    /// document, [`ModelLoadError::Schema`] for inconsistent importances, and
    /// [`ModelLoadError::Invalid`] for an empty schema or forest, an
    /// out-of-range feature index, a non-finite threshold, or a vote
    /// outside `[0, 1]`.
    pub fn from_json(text: &str) -> Result<Self, ModelLoadError> {
        let raw: RawModel = serde_json::from_str(text).map_err(|e| ModelLoadError::Malformed {
            reason: e.to_string(),
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawModel) -> Result<Self, ModelLoadError> {
        if raw.features.is_empty() {
            return Err(ModelLoadError::Invalid {
                reason: "feature list is empty".to_owned(),
            });
        }
        if raw.trees.is_empty() {
            return Err(ModelLoadError::Invalid {
                reason: "model holds no trees".to_owned(),
            });
        }
        let features: Vec<FeatureName> =
            raw.features.iter().map(|n| FeatureName::parse(n)).collect();
        let schema = match raw.importances {
            Some(importances) => FeatureSchema::with_importances(features, importances)?,
            None => FeatureSchema::new(features),
        };

        let trees = raw
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, root)| {
                let mut nodes = Vec::new();
                flatten(root, index, schema.len(), &mut nodes)?;
                Ok(DecisionTree::from_nodes(nodes))
            })
            .collect::<Result<Vec<_>, ModelLoadError>>()?;

        let mut model = Self::new(schema, trees);
        if let Some(name) = raw.name {
            model.name = name;
        }
        if let Some(version) = raw.version {
            model.version = version;
        }
        Ok(model)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

// ---------------------------------------------------------------------------
// Artifact decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    features: Vec<String>,
    #[serde(default)]
    importances: Option<Vec<f64>>,
    trees: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNode {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<RawNode>,
        right: Box<RawNode>,
    },
}

/// Append `raw` to `nodes` depth-first and return its arena index.
fn flatten(
    raw: RawNode,
    tree: usize,
    feature_count: usize,
    nodes: &mut Vec<Node>,
) -> Result<NodeId, ModelLoadError> {
    let id = nodes.len();
    match raw {
        RawNode::Leaf(vote) => {
            if !(0.0..=1.0).contains(&vote) {
                return Err(ModelLoadError::Invalid {
                    reason: format!("tree {tree}: leaf vote {vote} outside [0, 1]"),
                });
            }
            nodes.push(Node::Leaf(vote));
        }
        RawNode::Split { feature, threshold, left, right } => {
            if feature >= feature_count {
                return Err(ModelLoadError::Invalid {
                    reason: format!(
                        "tree {tree}: feature index {feature} out of range for {feature_count} features"
                    ),
                });
            }
            if !threshold.is_finite() {
                return Err(ModelLoadError::Invalid {
                    reason: format!("tree {tree}: threshold {threshold} is not finite"),
                });
            }
            // Children are patched in once their indices are known.
            nodes.push(Node::Split { feature, threshold, left: id, right: id });
            let left = flatten(*left, tree, feature_count, nodes)?;
            let right = flatten(*right, tree, feature_count, nodes)?;
            nodes[id] = Node::Split { feature, threshold, left, right };
        }
    }
    Ok(id)
}
