// Rust guideline compliant 2026-10-19

//! Feature schema and extraction.
//!
//! A [`FeatureSchema`] is the ordered feature list a model expects. Names are
//! decoded once into [`FeatureName`]; [`extract`] then reads every value from
//! a fixed mapping table, so the same account always yields the same vector.

use domain::Account;

use crate::SchemaError;

/// A feature the extractor knows how to compute.
///
/// Names outside the mapping table are kept as `Unknown` and extract to 0.0.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureName {
    /// `following / max(followers, 1)`.
    FfRatio,
    FollowersCount,
    FriendsCount,
    StatusesCount,
    Retweets,
    /// `retweets / max(tweets, 1)`.
    RetweetRatio,
    FavouritesCount,
    Replies,
    Hashtags,
    Urls,
    Mentions,
    Intertime,
    ActivityLevel,
    ListedCount,
    /// Whole days between joining and the last observed activity.
    AccountAgeDays,
    IsActive,
    Unknown(String),
}

impl FeatureName {
    /// Decode an artifact feature name. Accepts the common dataset aliases.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "ffratio" => Self::FfRatio,
            "followers_count" | "followers" => Self::FollowersCount,
            "friends_count" | "following" => Self::FriendsCount,
            "statuses_count" | "tweets" => Self::StatusesCount,
            "retweets" => Self::Retweets,
            "retweet_ratio" => Self::RetweetRatio,
            "favourites_count" | "likes" => Self::FavouritesCount,
            "replies" => Self::Replies,
            "hashtags" => Self::Hashtags,
            "urls" => Self::Urls,
            "mentions" => Self::Mentions,
            "intertime" => Self::Intertime,
            "activity_level" => Self::ActivityLevel,
            "listed_count" => Self::ListedCount,
            "account_age_days" => Self::AccountAgeDays,
            "is_active" => Self::IsActive,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::FfRatio => "ffratio",
            Self::FollowersCount => "followers_count",
            Self::FriendsCount => "friends_count",
            Self::StatusesCount => "statuses_count",
            Self::Retweets => "retweets",
            Self::RetweetRatio => "retweet_ratio",
            Self::FavouritesCount => "favourites_count",
            Self::Replies => "replies",
            Self::Hashtags => "hashtags",
            Self::Urls => "urls",
            Self::Mentions => "mentions",
            Self::Intertime => "intertime",
            Self::ActivityLevel => "activity_level",
            Self::ListedCount => "listed_count",
            Self::AccountAgeDays => "account_age_days",
            Self::IsActive => "is_active",
            Self::Unknown(name) => name,
        }
    }

    /// Read this feature from `account`.
    #[must_use]
    pub fn value(&self, account: &Account) -> f64 {
        match self {
            Self::FfRatio => ratio(account.following, account.followers),
            Self::FollowersCount => f64::from(account.followers),
            Self::FriendsCount => f64::from(account.following),
            Self::StatusesCount => f64::from(account.tweets),
            Self::Retweets => f64::from(account.retweets),
            Self::RetweetRatio => ratio(account.retweets, account.tweets),
            Self::FavouritesCount => f64::from(account.likes),
            Self::Replies => f64::from(account.replies),
            Self::Hashtags => f64::from(account.hashtags),
            Self::Urls => f64::from(account.urls),
            Self::Mentions => f64::from(account.mentions),
            Self::Intertime => account.intertime,
            Self::ActivityLevel => f64::from(account.activity_level),
            Self::ListedCount => f64::from(account.listed()),
            Self::AccountAgeDays => account_age_days(account),
            Self::IsActive => {
                if account.is_currently_active {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Unknown(_) => 0.0,
        }
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A zero denominator counts as 1.
fn ratio(numerator: u32, denominator: u32) -> f64 {
    f64::from(numerator) / f64::from(denominator.max(1))
}

#[expect(
    clippy::cast_precision_loss,
    reason = "day counts stay far below 2^52"
)]
fn account_age_days(account: &Account) -> f64 {
    (account.last_active - account.joined_date).num_days().max(0) as f64
}

// ---------------------------------------------------------------------------
// FeatureSchema
// ---------------------------------------------------------------------------

/// Ordered feature list plus one importance weight per feature.
///
/// Weights are non-negative and finite; they only matter relative to each
/// other. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    features: Vec<FeatureName>,
    importances: Vec<f64>,
}

impl FeatureSchema {
    /// Schema with a uniform weight of 1.0 per feature.
    #[must_use]
    pub fn new(features: Vec<FeatureName>) -> Self {
        let importances = vec![1.0; features.len()];
        Self { features, importances }
    }

    /// Schema with explicit weights.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::LengthMismatch`] when the lists differ in
    /// length, or [`SchemaError::InvalidImportance`] for a negative or
    /// non-finite weight.
    pub fn with_importances(
        features: Vec<FeatureName>,
        importances: Vec<f64>,
    ) -> Result<Self, SchemaError> {
        if features.len() != importances.len() {
            return Err(SchemaError::LengthMismatch {
                features: features.len(),
                importances: importances.len(),
            });
        }
        if let Some((feature, &value)) = features
            .iter()
            .zip(&importances)
            .find(|&(_, &w)| !w.is_finite() || w < 0.0)
        {
            return Err(SchemaError::InvalidImportance {
                feature: feature.to_string(),
                value,
            });
        }
        Ok(Self { features, importances })
    }

    /// Features in declaration order.
    #[must_use]
    pub fn features(&self) -> &[FeatureName] {
        &self.features
    }

    /// Importance weights, aligned with [`features`](Self::features).
    #[must_use]
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Index of the first occurrence of `feature`.
    #[must_use]
    pub fn position(&self, feature: &FeatureName) -> Option<usize> {
        self.features.iter().position(|f| f == feature)
    }

    /// Sum of all importance weights.
    #[must_use]
    pub fn total_importance(&self) -> f64 {
        self.importances.iter().sum()
    }
}

/// Map `account` onto `schema`, one value per feature, in schema order.
#[must_use]
pub fn extract(account: &Account, schema: &FeatureSchema) -> Vec<f64> {
    schema.features.iter().map(|f| f.value(account)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, Utc};

    fn make_account() -> Account {
        let joined = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Account {
            id: "acc_f".to_owned(),
            username: "user_f".to_owned(),
            followers: 200,
            following: 500,
            tweets: 40,
            retweets: 10,
            likes: 3,
            replies: 2,
            hashtags: 6,
            urls: 1,
            mentions: 4,
            intertime: 0.5,
            activity_level: 77,
            joined_date: joined,
            last_active: joined + TimeDelta::days(10) + TimeDelta::hours(5),
            is_currently_active: true,
            listed_count: None,
        }
    }

    fn full_schema() -> FeatureSchema {
        FeatureSchema::new(
            [
                "ffratio",
                "statuses_count",
                "retweet_ratio",
                "intertime",
                "account_age_days",
                "is_active",
                "listed_count",
            ]
            .into_iter()
            .map(FeatureName::parse)
            .collect(),
        )
    }

    #[test]
    fn vector_follows_schema_order() {
        let vector = extract(&make_account(), &full_schema());
        assert_eq!(vector, vec![2.5, 40.0, 0.25, 0.5, 10.0, 1.0, 0.0]);
    }

    #[test]
    fn extraction_is_deterministic() {
        let account = make_account();
        let schema = full_schema();
        assert_eq!(extract(&account, &schema), extract(&account, &schema));
    }

    #[test]
    fn zero_followers_uses_unit_denominator() {
        let mut account = make_account();
        account.followers = 0;
        account.following = 321;
        let schema = FeatureSchema::new(vec![FeatureName::FfRatio]);
        assert_eq!(extract(&account, &schema), vec![321.0]);
    }

    #[test]
    fn zero_tweets_uses_unit_denominator() {
        let mut account = make_account();
        account.tweets = 0;
        account.retweets = 7;
        let schema = FeatureSchema::new(vec![FeatureName::RetweetRatio]);
        assert_eq!(extract(&account, &schema), vec![7.0]);
    }

    #[test]
    fn unknown_feature_extracts_zero() {
        let schema = FeatureSchema::new(vec![
            FeatureName::parse("sentiment"),
            FeatureName::StatusesCount,
        ]);
        assert_eq!(schema.features()[0], FeatureName::Unknown("sentiment".to_owned()));
        assert_eq!(extract(&make_account(), &schema), vec![0.0, 40.0]);
    }

    #[test]
    fn aliases_decode_to_canonical_names() {
        assert_eq!(FeatureName::parse("followers"), FeatureName::FollowersCount);
        assert_eq!(FeatureName::parse("likes"), FeatureName::FavouritesCount);
        assert_eq!(FeatureName::parse("tweets").as_str(), "statuses_count");
    }

    #[test]
    fn age_never_negative() {
        let mut account = make_account();
        account.last_active = account.joined_date - TimeDelta::days(3);
        let schema = FeatureSchema::new(vec![FeatureName::AccountAgeDays]);
        assert_eq!(extract(&account, &schema), vec![0.0]);
    }

    #[test]
    fn importances_must_line_up() {
        let result = FeatureSchema::with_importances(vec![FeatureName::FfRatio], vec![]);
        assert!(matches!(result, Err(SchemaError::LengthMismatch { features: 1, importances: 0 })));
    }

    #[test]
    fn importances_must_be_non_negative() {
        let result = FeatureSchema::with_importances(
            vec![FeatureName::FfRatio, FeatureName::Intertime],
            vec![0.5, -0.1],
        );
        assert!(matches!(
            result,
            Err(SchemaError::InvalidImportance { ref feature, .. }) if feature == "intertime"
        ));
    }

    #[test]
    fn uniform_schema_totals_feature_count() {
        let schema = full_schema();
        assert_eq!(schema.len(), 7);
        assert!((schema.total_importance() - 7.0).abs() < f64::EPSILON);
        assert_eq!(schema.position(&FeatureName::Intertime), Some(3));
        assert_eq!(schema.position(&FeatureName::Mentions), None);
    }
}
