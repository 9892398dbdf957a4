// Rust guideline compliant 2026-10-19

//! Confidence-to-severity bucketing.

use domain::Category;

use crate::{ClassifierError, clamp_unit};

/// Two cut points splitting `[0, 1]` into three bot severities.
///
/// `[0, disruptive)` is satisfactory, `[disruptive, problematic)` is
/// disruptive, `[problematic, 1]` is problematic. Every confidence lands in
/// exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryThresholds {
    disruptive: f64,
    problematic: f64,
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            disruptive: 0.33,
            problematic: 0.66,
        }
    }
}

impl CategoryThresholds {
    /// Build thresholds from two cut points.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InvalidConfig`] unless
    /// `0 < disruptive < problematic <= 1`.
    pub fn new(disruptive: f64, problematic: f64) -> Result<Self, ClassifierError> {
        // Written as a positive range check so NaN is rejected too.
        let ordered = disruptive > 0.0 && disruptive < problematic && problematic <= 1.0;
        if !ordered {
            return Err(ClassifierError::InvalidConfig {
                reason: format!(
                    "category cuts must satisfy 0 < disruptive < problematic <= 1, got {disruptive} and {problematic}"
                ),
            });
        }
        Ok(Self { disruptive, problematic })
    }

    #[must_use]
    pub fn disruptive(&self) -> f64 {
        self.disruptive
    }

    #[must_use]
    pub fn problematic(&self) -> f64 {
        self.problematic
    }

    /// Severity of a flagged account with the given confidence.
    #[must_use]
    pub fn categorize(&self, confidence: f64) -> Category {
        let confidence = clamp_unit(confidence);
        if confidence < self.disruptive {
            Category::Satisfactory
        } else if confidence < self.problematic {
            Category::Disruptive
        } else {
            Category::Problematic
        }
    }

    /// `Normal` for humans, otherwise [`categorize`](Self::categorize).
    #[must_use]
    pub fn for_verdict(&self, is_bot: bool, confidence: f64) -> Category {
        if is_bot {
            self.categorize(confidence)
        } else {
            Category::Normal
        }
    }
}
