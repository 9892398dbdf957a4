// Rust guideline compliant 2026-10-19

//! Shared domain types for the bot-watch pipeline.
//!
//! Defines `Account`, `ClassificationResult`, `Category`, `DetectedBot`,
//! `BotAlert`, and the `Notifier` hexagonal port. Every pipeline crate depends
//! on this one; it imports no other workspace crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// One synthetic social account at a point in time.
///
/// Counters only grow (or stay flat) across refreshes and `last_active` never
/// moves backwards. Producers keep `retweets`, `replies` and `urls` at or
/// below `tweets`; consumers must not rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Opaque unique identifier; never changes once assigned.
    pub id: String,
    /// Display handle, without the leading `@`.
    pub username: String,
    pub followers: u32,
    pub following: u32,
    pub tweets: u32,
    pub retweets: u32,
    pub likes: u32,
    pub replies: u32,
    pub hashtags: u32,
    pub urls: u32,
    pub mentions: u32,
    /// Average hours between posts.
    pub intertime: f64,
    /// Activity level in `[0, 100]`.
    pub activity_level: u8,
    pub joined_date: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub is_currently_active: bool,
    /// Number of public lists featuring the account. `None` reads as 0.
    pub listed_count: Option<u32>,
}

impl Account {
    /// Listed count with the absent case folded to zero.
    #[must_use]
    pub fn listed(&self) -> u32 {
        self.listed_count.unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Classification output
// ---------------------------------------------------------------------------

/// Severity bucket attached to every classification.
///
/// `Normal` is reserved for accounts judged human; the other three rank
/// flagged accounts by confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Normal,
    Satisfactory,
    Disruptive,
    Problematic,
}

impl Category {
    /// Lowercase label, as shown by the dashboard filter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Satisfactory => "satisfactory",
            Self::Disruptive => "disruptive",
            Self::Problematic => "problematic",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scoring path produced a [`ClassificationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Decision-tree ensemble loaded from a model artifact.
    Ensemble,
    /// Rule-based heuristic scorer.
    Fallback,
}

/// Verdict for one account. Built fresh per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_bot: bool,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Triggered rules joined in declaration order.
    pub reason: String,
    pub category: Category,
    pub classifier: ClassifierKind,
}

/// A flagged account, as listed in the detected-bots table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBot {
    pub account_id: String,
    pub username: String,
    pub confidence: f64,
    pub reason: String,
    pub category: Category,
}

impl DetectedBot {
    /// Build the record for `account` from its classification.
    #[must_use]
    pub fn from_result(account: &Account, result: &ClassificationResult) -> Self {
        Self {
            account_id: account.id.clone(),
            username: account.username.clone(),
            confidence: result.confidence,
            reason: result.reason.clone(),
            category: result.category,
        }
    }
}

/// Category selection applied to the detected-bots table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every detected bot.
    #[default]
    All,
    /// Only bots in the given category.
    Only(Category),
}

impl CategoryFilter {
    /// `true` when `category` passes the filter.
    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "normal" => Ok(Self::Only(Category::Normal)),
            "satisfactory" => Ok(Self::Only(Category::Satisfactory)),
            "disruptive" => Ok(Self::Only(Category::Disruptive)),
            "problematic" => Ok(Self::Only(Category::Problematic)),
            other => Err(DomainError::UnknownCategory {
                label: other.to_owned(),
            }),
        }
    }
}

/// Notification emitted once per newly detected bot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotAlert {
    pub account: Account,
    pub category: Category,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Label is not one of the dashboard categories.
    #[error("unknown category filter: {label}")]
    UnknownCategory {
        /// The rejected label.
        label: String,
    },
}

/// Errors from the Notifier hexagonal port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// Notification could not be delivered.
    #[error("delivery failed: {reason}")]
    DeliveryFailed {
        /// Human-readable description.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Hexagonal port: per-bot alert delivery towards the presentation layer.
///
/// The simulation calls `notify` exactly once per newly detected bot
/// (best-effort; failures are logged by the caller).
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Notifier {
    /// Deliver one bot alert.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::DeliveryFailed` when the alert cannot be delivered.
    async fn notify(&self, alert: &BotAlert) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn make_account() -> Account {
        let joined = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Account {
            id: "acc_1".to_owned(),
            username: "user_one".to_owned(),
            followers: 10,
            following: 20,
            tweets: 30,
            retweets: 5,
            likes: 7,
            replies: 1,
            hashtags: 2,
            urls: 0,
            mentions: 3,
            intertime: 4.5,
            activity_level: 40,
            joined_date: joined,
            last_active: joined,
            is_currently_active: true,
            listed_count: None,
        }
    }

    #[test]
    fn listed_defaults_to_zero() {
        let mut account = make_account();
        assert_eq!(account.listed(), 0);
        account.listed_count = Some(12);
        assert_eq!(account.listed(), 12);
    }

    #[test]
    fn category_labels_are_lowercase() {
        assert_eq!(Category::Normal.to_string(), "normal");
        assert_eq!(Category::Problematic.as_str(), "problematic");
        let json = serde_json::to_string(&Category::Disruptive).unwrap();
        assert_eq!(json, "\"disruptive\"");
    }

    #[test]
    fn detected_bot_copies_result_fields() {
        let account = make_account();
        let result = ClassificationResult {
            is_bot: true,
            confidence: 0.8,
            reason: "High following/follower ratio".to_owned(),
            category: Category::Problematic,
            classifier: ClassifierKind::Fallback,
        };
        let bot = DetectedBot::from_result(&account, &result);
        assert_eq!(bot.account_id, "acc_1");
        assert_eq!(bot.username, "user_one");
        assert_eq!(bot.reason, result.reason);
        assert_eq!(bot.category, Category::Problematic);
    }

    #[test]
    fn category_filter_parses_dashboard_labels() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "disruptive".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::Disruptive))
        );
        assert!(matches!(
            "spam".parse::<CategoryFilter>(),
            Err(DomainError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn category_filter_matching() {
        assert!(CategoryFilter::All.matches(Category::Satisfactory));
        let only = CategoryFilter::Only(Category::Problematic);
        assert!(only.matches(Category::Problematic));
        assert!(!only.matches(Category::Disruptive));
    }

    #[test]
    fn notify_error_display() {
        let e = NotifyError::DeliveryFailed { reason: "closed".to_owned() };
        assert_eq!(e.to_string(), "delivery failed: closed");
    }

    /// Verify that a minimal `Notifier` implementation records alerts.
    #[tokio::test]
    async fn notifier_impl() {
        struct Recorder {
            seen: RefCell<Vec<String>>,
        }

        impl Notifier for Recorder {
            async fn notify(&self, alert: &BotAlert) -> Result<(), NotifyError> {
                self.seen.borrow_mut().push(alert.account.id.clone());
                Ok(())
            }
        }

        let recorder = Recorder { seen: RefCell::new(vec![]) };
        let alert = BotAlert {
            account: make_account(),
            category: Category::Satisfactory,
            confidence: 0.2,
        };
        recorder.notify(&alert).await.unwrap();
        assert_eq!(*recorder.seen.borrow(), vec!["acc_1".to_owned()]);
    }
}
