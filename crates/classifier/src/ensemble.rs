// Rust guideline compliant 2026-10-19

//! Ensemble voting and importance-weighted confidence.

use std::sync::Arc;

use crate::config::Rule;
use crate::model::EnsembleModel;
use crate::{InferenceError, clamp_unit};

/// Averaged forest output for one feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// `mean >= 0.5`.
    pub label: bool,
    /// Arithmetic mean of the leaf votes.
    pub mean: f64,
    /// One vote per tree, in ensemble order.
    pub per_tree_votes: Vec<f64>,
}

/// Confidence plus the signal rules that contributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Confidence {
    /// Share of total importance carried by triggered signal features.
    pub value: f64,
    /// Labels of triggered rules, in rule-declaration order.
    pub triggered: Vec<String>,
}

/// Evaluates a shared [`EnsembleModel`].
///
/// Cheap to clone: the model sits behind an `Arc` and is never mutated.
#[derive(Debug, Clone)]
pub struct EnsembleClassifier {
    model: Arc<EnsembleModel>,
    signals: Vec<Rule>,
}

impl EnsembleClassifier {
    /// Wrap `model`; `signals` drive [`confidence`](Self::confidence).
    #[must_use]
    pub fn new(model: Arc<EnsembleModel>, signals: Vec<Rule>) -> Self {
        Self { model, signals }
    }

    #[must_use]
    pub fn model(&self) -> &EnsembleModel {
        &self.model
    }

    /// Run every tree on `vector` and average the votes.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::EmptyEnsemble`] for a forest without trees,
    /// [`InferenceError::VectorLength`] when `vector` does not match the
    /// schema, or the first traversal error of any tree.
    pub fn predict(&self, vector: &[f64]) -> Result<Prediction, InferenceError> {
        let trees = self.model.trees();
        if trees.is_empty() {
            return Err(InferenceError::EmptyEnsemble);
        }
        let expected = self.model.schema().len();
        if vector.len() != expected {
            return Err(InferenceError::VectorLength {
                expected,
                actual: vector.len(),
            });
        }
        let per_tree_votes = trees
            .iter()
            .enumerate()
            .map(|(index, tree)| tree.evaluate(index, vector))
            .collect::<Result<Vec<f64>, InferenceError>>()?;
        let mean = per_tree_votes.iter().sum::<f64>() / count_as_f64(per_tree_votes.len());
        Ok(Prediction {
            label: mean >= 0.5,
            mean,
            per_tree_votes,
        })
    }

    /// Importance-weighted share of the schema carried by triggered signals.
    ///
    /// Each schema feature that has a signal rule adds its importance when
    /// the rule triggers on that feature's value. The sum is divided by the
    /// schema's total importance and clamped to `[0, 1]`; a zero total gives 0.
    #[must_use]
    pub fn confidence(&self, vector: &[f64]) -> Confidence {
        let schema = self.model.schema();
        let mut fired = vec![false; self.signals.len()];
        let mut accumulated = 0.0;
        let mut total = 0.0;
        for (index, (feature, &importance)) in
            schema.features().iter().zip(schema.importances()).enumerate()
        {
            total += importance;
            let Some(value) = vector.get(index) else {
                continue;
            };
            if let Some(position) = self.signals.iter().position(|r| &r.feature == feature)
                && self.signals[position].triggers(*value)
            {
                accumulated += importance;
                fired[position] = true;
            }
        }
        let value = if total > 0.0 {
            clamp_unit(accumulated / total)
        } else {
            0.0
        };
        let triggered = self
            .signals
            .iter()
            .zip(&fired)
            .filter(|&(_, &hit)| hit)
            .map(|(rule, _)| rule.label.clone())
            .collect();
        Confidence { value, triggered }
    }
}

#[expect(clippy::cast_precision_loss, reason = "tree counts are tiny")]
fn count_as_f64(count: usize) -> f64 {
    count as f64
}
