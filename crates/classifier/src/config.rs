// Rust guideline compliant 2026-10-19

//! Classifier configuration: rule thresholds, fallback weights and category
//! cut points. Construct via [`ClassifierConfig::builder`].

use crate::category::CategoryThresholds;
use crate::features::FeatureName;
use crate::ClassifierError;

/// Direction in which a feature value is suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Triggers when the value is strictly above the threshold.
    Above,
    /// Triggers when the value is strictly below the threshold.
    Below,
}

/// A named threshold test on one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Label used in the human-readable reason.
    pub label: String,
    pub feature: FeatureName,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Rule {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        feature: FeatureName,
        comparison: Comparison,
        threshold: f64,
    ) -> Self {
        Self {
            label: label.into(),
            feature,
            comparison,
            threshold,
        }
    }

    /// `true` when `value` crosses the threshold. NaN never triggers.
    #[must_use]
    pub fn triggers(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::Above => value > self.threshold,
            Comparison::Below => value < self.threshold,
        }
    }
}

/// A rule plus the partial score it adds to the fallback total.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRule {
    pub rule: Rule,
    pub weight: f64,
}

const FF_RATIO_LABEL: &str = "High following/follower ratio";
const INTERTIME_LABEL: &str = "Rapid posting cadence";
const STATUSES_LABEL: &str = "Low status count";
const RETWEET_LABEL: &str = "Excessive retweet behavior";
const ACTIVITY_LABEL: &str = "Abnormally high activity level";

// ---------------------------------------------------------------------------
// ClassifierConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for the classification pipeline.
///
/// Construct via [`ClassifierConfig::builder`].
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Rules whose features feed the ensemble confidence, in reason order.
    pub signal_rules: Vec<Rule>,
    /// Fallback scoring rules, in reason order.
    pub fallback_rules: Vec<WeightedRule>,
    /// Fallback score at or above which an account is a bot.
    pub fallback_cutoff: f64,
    pub categories: CategoryThresholds,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        // Defaults always validate.
        ClassifierConfigBuilder::default().assemble()
    }
}

/// Builder for [`ClassifierConfig`].
///
/// Obtain via [`ClassifierConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ClassifierConfigBuilder {
    ff_ratio: f64,
    intertime_hours: f64,
    statuses: f64,
    retweet_ratio: f64,
    activity_level: f64,
    fallback_cutoff: f64,
    disruptive_cut: f64,
    problematic_cut: f64,
}

impl Default for ClassifierConfigBuilder {
    fn default() -> Self {
        Self {
            ff_ratio: 2.0,
            intertime_hours: 1.0,
            statuses: 100.0,
            retweet_ratio: 0.8,
            activity_level: 90.0,
            fallback_cutoff: 0.5,
            disruptive_cut: 0.33,
            problematic_cut: 0.66,
        }
    }
}

impl ClassifierConfig {
    /// Create a builder.
    ///
    /// Default values: following/follower ratio above 2, intertime below
    /// 1 hour, status count below 100, retweet ratio above 0.8, activity
    /// above 90, fallback cutoff 0.5, category cuts 0.33 / 0.66.
    #[must_use]
    pub fn builder() -> ClassifierConfigBuilder {
        ClassifierConfigBuilder::default()
    }
}

impl ClassifierConfigBuilder {
    /// Following/follower ratio above which an account looks automated.
    #[must_use]
    pub fn ff_ratio_threshold(mut self, value: f64) -> Self {
        self.ff_ratio = value;
        self
    }

    /// Average hours between posts below which posting looks scripted.
    #[must_use]
    pub fn intertime_threshold(mut self, hours: f64) -> Self {
        self.intertime_hours = hours;
        self
    }

    /// Status count below which an account looks freshly spun up.
    #[must_use]
    pub fn statuses_threshold(mut self, value: f64) -> Self {
        self.statuses = value;
        self
    }

    /// Retweet-to-status ratio above which an account looks like an amplifier.
    #[must_use]
    pub fn retweet_ratio_threshold(mut self, value: f64) -> Self {
        self.retweet_ratio = value;
        self
    }

    /// Activity level above which an account looks hyperactive.
    #[must_use]
    pub fn activity_threshold(mut self, value: f64) -> Self {
        self.activity_level = value;
        self
    }

    /// Fallback score at or above which an account is a bot.
    #[must_use]
    pub fn fallback_cutoff(mut self, value: f64) -> Self {
        self.fallback_cutoff = value;
        self
    }

    /// Category cut points, see [`CategoryThresholds::new`].
    #[must_use]
    pub fn category_cuts(mut self, disruptive: f64, problematic: f64) -> Self {
        self.disruptive_cut = disruptive;
        self.problematic_cut = problematic;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InvalidConfig`] for a non-finite threshold,
    /// a cutoff outside `(0, 1]`, or unordered category cuts.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ClassifierConfig, ClassifierError> {
        let thresholds = [
            ("ff_ratio", self.ff_ratio),
            ("intertime", self.intertime_hours),
            ("statuses", self.statuses),
            ("retweet_ratio", self.retweet_ratio),
            ("activity", self.activity_level),
        ];
        if let Some((name, value)) = thresholds.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ClassifierError::InvalidConfig {
                reason: format!("{name} threshold must be finite, got {value}"),
            });
        }
        if !(self.fallback_cutoff > 0.0 && self.fallback_cutoff <= 1.0) {
            return Err(ClassifierError::InvalidConfig {
                reason: format!("fallback_cutoff must be in (0, 1], got {}", self.fallback_cutoff),
            });
        }
        CategoryThresholds::new(self.disruptive_cut, self.problematic_cut)?;
        Ok(self.assemble())
    }

    fn assemble(self) -> ClassifierConfig {
        let ff_ratio = Rule::new(FF_RATIO_LABEL, FeatureName::FfRatio, Comparison::Above, self.ff_ratio);
        let statuses = Rule::new(
            STATUSES_LABEL,
            FeatureName::StatusesCount,
            Comparison::Below,
            self.statuses,
        );
        let signal_rules = vec![
            ff_ratio.clone(),
            Rule::new(
                INTERTIME_LABEL,
                FeatureName::Intertime,
                Comparison::Below,
                self.intertime_hours,
            ),
            statuses.clone(),
        ];
        let fallback_rules = vec![
            WeightedRule { rule: ff_ratio, weight: 0.3 },
            WeightedRule { rule: statuses, weight: 0.2 },
            WeightedRule {
                rule: Rule::new(
                    RETWEET_LABEL,
                    FeatureName::RetweetRatio,
                    Comparison::Above,
                    self.retweet_ratio,
                ),
                weight: 0.3,
            },
            WeightedRule {
                rule: Rule::new(
                    ACTIVITY_LABEL,
                    FeatureName::ActivityLevel,
                    Comparison::Above,
                    self.activity_level,
                ),
                weight: 0.2,
            },
        ];
        let categories = CategoryThresholds::new(self.disruptive_cut, self.problematic_cut)
            .unwrap_or_default();
        ClassifierConfig {
            signal_rules,
            fallback_rules,
            fallback_cutoff: self.fallback_cutoff,
            categories,
        }
    }
}
