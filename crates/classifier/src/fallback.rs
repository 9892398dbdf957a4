// Rust guideline compliant 2026-10-19

//! Rule-based scorer used whenever the ensemble is unavailable.
//!
//! It has no external dependency and cannot fail, so the pipeline always
//! reaches a verdict.

use domain::Account;

use crate::config::WeightedRule;
use crate::features::{self, FeatureName, FeatureSchema};
use crate::clamp_unit;

/// Outcome of a fallback evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackVerdict {
    /// `score >= cutoff`.
    pub is_bot: bool,
    /// Sum of the weights of triggered rules.
    pub score: f64,
    /// Labels of triggered rules, in rule-declaration order.
    pub triggered: Vec<String>,
}

impl FallbackVerdict {
    /// Score clamped to `[0, 1]`.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        clamp_unit(self.score)
    }
}

/// Weighted sum of boolean rule hits.
#[derive(Debug, Clone)]
pub struct HeuristicFallbackClassifier {
    rules: Vec<WeightedRule>,
    cutoff: f64,
    /// One entry per distinct rule feature, in first-use order.
    schema: FeatureSchema,
}

impl HeuristicFallbackClassifier {
    /// Build a scorer over `rules`; accounts at or above `cutoff` are bots.
    #[must_use]
    pub fn new(rules: Vec<WeightedRule>, cutoff: f64) -> Self {
        let mut features: Vec<FeatureName> = Vec::with_capacity(rules.len());
        for weighted in &rules {
            if !features.contains(&weighted.rule.feature) {
                features.push(weighted.rule.feature.clone());
            }
        }
        Self {
            rules,
            cutoff,
            schema: FeatureSchema::new(features),
        }
    }

    /// The features this scorer reads.
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Score `vector` laid out according to `schema`.
    ///
    /// Rules whose feature is missing from `schema` do not fire.
    #[must_use]
    pub fn evaluate(&self, vector: &[f64], schema: &FeatureSchema) -> FallbackVerdict {
        let mut score = 0.0;
        let mut triggered = Vec::new();
        for weighted in &self.rules {
            let hit = schema
                .position(&weighted.rule.feature)
                .and_then(|index| vector.get(index))
                .is_some_and(|&value| weighted.rule.triggers(value));
            if hit {
                score += weighted.weight;
                triggered.push(weighted.rule.label.clone());
            }
        }
        FallbackVerdict {
            is_bot: score >= self.cutoff,
            score,
            triggered,
        }
    }

    /// Bot verdict only.
    #[must_use]
    pub fn score(&self, vector: &[f64], schema: &FeatureSchema) -> bool {
        self.evaluate(vector, schema).is_bot
    }

    /// Extract with this scorer's own schema, then evaluate.
    #[must_use]
    pub fn classify_account(&self, account: &Account) -> FallbackVerdict {
        let vector = features::extract(account, &self.schema);
        self.evaluate(&vector, &self.schema)
    }
}

impl Default for HeuristicFallbackClassifier {
    fn default() -> Self {
        let config = crate::config::ClassifierConfig::default();
        Self::new(config.fallback_rules, config.fallback_cutoff)
    }
}
