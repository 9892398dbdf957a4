// Rust guideline compliant 2026-10-19

//! Generator component -- fabricates synthetic account telemetry.
//!
//! Entry points: [`TelemetryGenerator::generate_account`],
//! [`TelemetryGenerator::generate_batch`], [`TelemetryGenerator::advance_activity`].
//! Configuration via [`GeneratorConfig::builder`].

use chrono::{DateTime, TimeDelta, Utc};
use domain::Account;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use std::cell::RefCell;

// ---------------------------------------------------------------------------
// GeneratorError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring the generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The supplied configuration is invalid.
    #[error("invalid generator configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// GeneratorConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`TelemetryGenerator`].
///
/// Construct via [`GeneratorConfig::builder`].
#[derive(Debug)]
pub struct GeneratorConfig {
    /// Probability in `[0, 1]` that a fresh account gets an automated profile.
    pub bot_ratio: f64,
    /// Optional RNG seed for reproducible accounts. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`GeneratorConfig`].
///
/// Obtain via [`GeneratorConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct GeneratorConfigBuilder {
    bot_ratio: f64,
    seed: Option<u64>,
}

impl GeneratorConfig {
    /// Create a builder.
    ///
    /// Default values: `bot_ratio = 0.25`, `seed = None`.
    #[must_use]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder {
            // One account in four looks automated: enough flags to watch.
            bot_ratio: 0.25,
            seed: None,
        }
    }
}

impl GeneratorConfigBuilder {
    /// Override the share of automated-looking accounts.
    #[must_use]
    pub fn bot_ratio(mut self, bot_ratio: f64) -> Self {
        self.bot_ratio = bot_ratio;
        self
    }

    /// Fix the RNG seed for deterministic output (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidConfig`] when `bot_ratio` is not a
    /// probability.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<GeneratorConfig, GeneratorError> {
        if !(0.0..=1.0).contains(&self.bot_ratio) {
            return Err(GeneratorError::InvalidConfig {
                reason: format!("bot_ratio must be in [0, 1], got {}", self.bot_ratio),
            });
        }
        Ok(GeneratorConfig {
            bot_ratio: self.bot_ratio,
            seed: self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// TelemetryGenerator
// ---------------------------------------------------------------------------

/// Characters used for synthetic usernames (base 36, as in `toString(36)`).
const HANDLE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Behaviour family a fresh account is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Organic,
    Automated,
}

/// Fabricates internally consistent account records.
///
/// `retweets`, `replies` and `urls` never exceed `tweets`; `hashtags` and
/// `mentions` stay within three times `tweets`. Timestamps are derived from
/// the caller-supplied `now`, so a seeded generator is fully reproducible.
#[derive(Debug)]
pub struct TelemetryGenerator {
    config: GeneratorConfig,
    /// Interior mutability required because all public methods take `&self`.
    rng: RefCell<StdRng>,
}

impl TelemetryGenerator {
    /// Create a new generator from `config`.
    ///
    /// Seeds the RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng: RefCell::new(rng),
        }
    }

    /// Fabricate one account observed at `now`.
    #[must_use]
    pub fn generate_account(&self, now: DateTime<Utc>) -> Account {
        let mut rng = self.rng.borrow_mut();
        let profile = if rng.random_bool(self.config.bot_ratio) {
            Profile::Automated
        } else {
            Profile::Organic
        };

        // UUID from raw random bytes keeps ids reproducible under a seed.
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let id = uuid::Builder::from_random_bytes(bytes).into_uuid().to_string();
        let username = random_handle(&mut *rng);

        let account = match profile {
            Profile::Organic => organic_account(&mut *rng, id, username, now),
            Profile::Automated => automated_account(&mut *rng, id, username, now),
        };
        tracing::debug!(
            account_id = %account.id,
            profile = ?profile,
            "generator.account.generated"
        );
        account
    }

    /// Fabricate `count` accounts observed at `now`.
    #[must_use]
    pub fn generate_batch(&self, count: usize, now: DateTime<Utc>) -> Vec<Account> {
        (0..count).map(|_| self.generate_account(now)).collect()
    }

    /// Simulate activity since the last observation.
    ///
    /// Counters grow or stay flat; new retweets, replies and urls are bounded
    /// by the new tweets so the generation invariants survive. `last_active`
    /// only moves forward.
    pub fn advance_activity(&self, account: &mut Account, now: DateTime<Utc>) {
        let mut rng = self.rng.borrow_mut();
        // Fast posters keep posting fast.
        let max_new = if account.intertime < 1.0 { 6 } else { 2 };
        let new_tweets: u32 = rng.random_range(0..=max_new);

        account.tweets = account.tweets.saturating_add(new_tweets);
        account.retweets = account.retweets.saturating_add(rng.random_range(0..=new_tweets));
        account.replies = account.replies.saturating_add(rng.random_range(0..=new_tweets));
        account.urls = account.urls.saturating_add(rng.random_range(0..=new_tweets));
        account.hashtags = account.hashtags.saturating_add(rng.random_range(0..=2 * new_tweets));
        account.mentions = account.mentions.saturating_add(rng.random_range(0..=2 * new_tweets));
        account.likes = account.likes.saturating_add(rng.random_range(0..=5));
        account.followers = account.followers.saturating_add(rng.random_range(0..=2));
        account.following = account.following.saturating_add(rng.random_range(0..=2));

        let jitter: i16 = rng.random_range(-5..=5);
        account.activity_level = clamp_level(i16::from(account.activity_level) + jitter);
        account.is_currently_active = new_tweets > 0;
        if now > account.last_active {
            account.last_active = now;
        }
        tracing::debug!(
            account_id = %account.id,
            new_tweets,
            "generator.account.advanced"
        );
    }
}

/// `user_` followed by six base-36 characters.
fn random_handle<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..6)
        .map(|_| char::from(HANDLE_ALPHABET[rng.random_range(0..HANDLE_ALPHABET.len())]))
        .collect();
    format!("user_{suffix}")
}

fn clamp_level(value: i16) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(100)
}

/// Joined 30 to 3000 days ago, last seen within the past day.
fn timeline<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let joined = now - TimeDelta::days(rng.random_range(30..=3000));
    let last_active = now - TimeDelta::minutes(rng.random_range(0..=1440));
    (joined, last_active)
}

fn organic_account<R: Rng>(
    rng: &mut R,
    id: String,
    username: String,
    now: DateTime<Utc>,
) -> Account {
    let followers: u32 = rng.random_range(50..=5_000);
    let following: u32 = rng.random_range(10..=followers / 2 * 3 + 10);
    let tweets: u32 = rng.random_range(200..=10_000);
    let (joined_date, last_active) = timeline(rng, now);
    Account {
        id,
        username,
        followers,
        following,
        tweets,
        retweets: rng.random_range(0..=tweets / 5 * 2),
        likes: rng.random_range(0..=tweets * 3),
        replies: rng.random_range(0..=tweets / 3),
        hashtags: rng.random_range(0..=tweets),
        urls: rng.random_range(0..=tweets / 4),
        mentions: rng.random_range(0..=tweets),
        intertime: rng.random_range(2.0..48.0),
        activity_level: rng.random_range(10..=70),
        joined_date,
        last_active,
        is_currently_active: rng.random_bool(0.3),
        listed_count: Some(rng.random_range(0..=followers / 50)),
    }
}

fn automated_account<R: Rng>(
    rng: &mut R,
    id: String,
    username: String,
    now: DateTime<Utc>,
) -> Account {
    let followers: u32 = rng.random_range(0..=200);
    let following: u32 = rng.random_range(500..=5_000);
    let tweets: u32 = rng.random_range(5..=150);
    let (joined_date, last_active) = timeline(rng, now);
    Account {
        id,
        username,
        followers,
        following,
        tweets,
        retweets: rng.random_range(tweets / 10 * 7..=tweets),
        likes: rng.random_range(0..=tweets / 2),
        replies: rng.random_range(0..=tweets / 10),
        hashtags: rng.random_range(tweets..=tweets * 3),
        urls: rng.random_range(tweets / 2..=tweets),
        mentions: rng.random_range(0..=tweets * 2),
        intertime: rng.random_range(0.05..0.8),
        activity_level: rng.random_range(80..=100),
        joined_date,
        last_active,
        is_currently_active: rng.random_bool(0.6),
        listed_count: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{GeneratorConfig, GeneratorError, TelemetryGenerator};
    use chrono::{DateTime, TimeDelta, Utc};
    use domain::Account;
    use std::collections::HashSet;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn seeded(seed: u64, bot_ratio: f64) -> TelemetryGenerator {
        TelemetryGenerator::new(
            GeneratorConfig::builder()
                .seed(seed)
                .bot_ratio(bot_ratio)
                .build()
                .unwrap(),
        )
    }

    fn assert_consistent(account: &Account, now: DateTime<Utc>) {
        assert!(account.retweets <= account.tweets, "retweets > tweets: {account:?}");
        assert!(account.replies <= account.tweets, "replies > tweets: {account:?}");
        assert!(account.urls <= account.tweets, "urls > tweets: {account:?}");
        assert!(account.hashtags <= account.tweets * 3, "hashtags: {account:?}");
        assert!(account.mentions <= account.tweets * 3, "mentions: {account:?}");
        assert!(account.intertime > 0.0, "intertime must be positive");
        assert!(account.activity_level <= 100);
        assert!(account.joined_date <= now);
        assert!(account.last_active >= account.joined_date);
        assert!(account.username.starts_with("user_"));
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    #[test]
    fn config_rejects_ratio_above_one() {
        let result = GeneratorConfig::builder().bot_ratio(1.5).build();
        assert!(matches!(result, Err(GeneratorError::InvalidConfig { .. })));
    }

    #[test]
    fn config_rejects_nan_ratio() {
        let result = GeneratorConfig::builder().bot_ratio(f64::NAN).build();
        assert!(matches!(result, Err(GeneratorError::InvalidConfig { .. })));
    }

    #[test]
    fn builder_defaults() {
        let config = GeneratorConfig::builder().build().unwrap();
        assert!((config.bot_ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.seed, None);
    }

    // ------------------------------------------------------------------
    // Account generation
    // ------------------------------------------------------------------

    #[test]
    fn accounts_are_internally_consistent() {
        let generator = seeded(1, 0.5);
        let now = fixed_now();
        for account in generator.generate_batch(500, now) {
            assert_consistent(&account, now);
        }
    }

    #[test]
    fn ids_are_unique() {
        let generator = seeded(2, 0.5);
        let batch = generator.generate_batch(200, fixed_now());
        let ids: HashSet<&str> = batch.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn seeded_rng_deterministic() {
        let now = fixed_now();
        let batch1 = seeded(99, 0.25).generate_batch(10, now);
        let batch2 = seeded(99, 0.25).generate_batch(10, now);
        assert_eq!(batch1, batch2, "identical seeds must produce identical accounts");
    }

    #[test]
    fn automated_profile_follows_far_more_than_followed() {
        let generator = seeded(3, 1.0);
        for account in generator.generate_batch(50, fixed_now()) {
            assert!(account.following > account.followers * 2, "{account:?}");
            assert!(account.intertime < 1.0);
            assert!(account.activity_level >= 80);
        }
    }

    #[test]
    fn organic_profile_posts_slowly() {
        let generator = seeded(4, 0.0);
        for account in generator.generate_batch(50, fixed_now()) {
            assert!(account.intertime >= 2.0, "{account:?}");
            assert!(account.tweets >= 200);
            assert!(account.listed_count.is_some());
        }
    }

    // ------------------------------------------------------------------
    // Activity refresh
    // ------------------------------------------------------------------

    #[test]
    fn advance_is_monotonic() {
        let generator = seeded(5, 0.5);
        let mut now = fixed_now();
        let mut account = generator.generate_account(now);
        for _ in 0..100 {
            let before = account.clone();
            now += TimeDelta::seconds(3);
            generator.advance_activity(&mut account, now);
            assert_eq!(account.id, before.id);
            assert!(account.tweets >= before.tweets);
            assert!(account.retweets >= before.retweets);
            assert!(account.likes >= before.likes);
            assert!(account.followers >= before.followers);
            assert!(account.last_active >= before.last_active);
            assert_eq!(account.last_active, now);
            assert_consistent(&account, now);
        }
    }

    #[test]
    fn advance_never_rewinds_last_active() {
        let generator = seeded(6, 0.5);
        let now = fixed_now();
        let mut account = generator.generate_account(now);
        account.last_active = now;
        generator.advance_activity(&mut account, now - TimeDelta::hours(1));
        assert_eq!(account.last_active, now);
    }
}
