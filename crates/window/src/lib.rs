// Rust guideline compliant 2026-10-19

//! Bounded streaming state for the bot-watch dashboard.
//!
//! [`StreamWindow`] keeps the most recent accounts and detected bots, newest
//! first. [`metrics`] derives the aggregates and the read-only
//! [`DashboardSnapshot`] published to the presentation layer.
//!
//! The window is owned by a single writer; it holds no locks.

pub mod metrics;

pub use metrics::{ActivityHistory, ActivityPoint, AggregateMetrics, DashboardSnapshot};

use std::collections::VecDeque;

use domain::{Account, CategoryFilter, DetectedBot};

/// Default capacity of both window collections.
pub const MAX_ACCOUNTS: usize = 100;

// ---------------------------------------------------------------------------
// WindowError
// ---------------------------------------------------------------------------

/// Errors raised when building a [`StreamWindow`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// The supplied configuration is invalid.
    #[error("invalid window configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// StreamWindow
// ---------------------------------------------------------------------------

/// Most-recent-first accounts plus most-recent-first detected bots.
///
/// Both collections are capped at `capacity`. Evicting an account leaves its
/// bot record in place; [`remove`](Self::remove) clears both.
#[derive(Debug, Clone)]
pub struct StreamWindow {
    capacity: usize,
    accounts: VecDeque<Account>,
    detected_bots: VecDeque<DetectedBot>,
}

impl Default for StreamWindow {
    fn default() -> Self {
        Self {
            capacity: MAX_ACCOUNTS,
            accounts: VecDeque::with_capacity(MAX_ACCOUNTS + 1),
            detected_bots: VecDeque::with_capacity(MAX_ACCOUNTS + 1),
        }
    }
}

impl StreamWindow {
    /// Create an empty window holding at most `capacity` entries per collection.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidConfig`] when `capacity` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn new(capacity: usize) -> Result<Self, WindowError> {
        if capacity == 0 {
            return Err(WindowError::InvalidConfig {
                reason: "capacity must be >= 1".to_owned(),
            });
        }
        Ok(Self {
            capacity,
            accounts: VecDeque::with_capacity(capacity + 1),
            detected_bots: VecDeque::with_capacity(capacity + 1),
        })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts, newest first.
    #[must_use]
    pub fn accounts(&self) -> &VecDeque<Account> {
        &self.accounts
    }

    /// Detected bots, newest first.
    #[must_use]
    pub fn detected_bots(&self) -> &VecDeque<DetectedBot> {
        &self.detected_bots
    }

    /// Detected bots whose category passes `filter`, newest first.
    pub fn detected_bots_matching(
        &self,
        filter: CategoryFilter,
    ) -> impl Iterator<Item = &DetectedBot> + '_ {
        self.detected_bots.iter().filter(move |bot| filter.matches(bot.category))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// `true` when a bot record exists for `id`.
    #[must_use]
    pub fn is_flagged(&self, id: &str) -> bool {
        self.detected_bots.iter().any(|b| b.account_id == id)
    }

    /// Prepend `account` and return whatever fell off the end.
    ///
    /// An entry with the same id is dropped first, so the account moves to the
    /// front instead of appearing twice.
    pub fn push(&mut self, account: Account) -> Vec<Account> {
        if let Some(index) = self.accounts.iter().position(|a| a.id == account.id) {
            self.accounts.remove(index);
        }
        self.accounts.push_front(account);
        self.evict_oldest_if_over_capacity()
    }

    /// Drop accounts from the back until the window fits its capacity.
    pub fn evict_oldest_if_over_capacity(&mut self) -> Vec<Account> {
        let keep = self.accounts.len().min(self.capacity);
        let evicted: Vec<Account> = self.accounts.drain(keep..).collect();
        for account in &evicted {
            tracing::debug!(account_id = %account.id, "window.account.evicted");
        }
        evicted
    }

    /// Record a bot. Returns `true` for a new record, `false` when an existing
    /// record for the same account was updated in place.
    pub fn record_bot(&mut self, detected: DetectedBot) -> bool {
        if let Some(existing) = self
            .detected_bots
            .iter_mut()
            .find(|b| b.account_id == detected.account_id)
        {
            *existing = detected;
            return false;
        }
        self.detected_bots.push_front(detected);
        self.detected_bots.truncate(self.capacity);
        true
    }

    /// Remove `id` from both collections. Returns `true` if anything was removed.
    ///
    /// Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        let accounts_before = self.accounts.len();
        let bots_before = self.detected_bots.len();
        self.accounts.retain(|a| a.id != id);
        self.detected_bots.retain(|b| b.account_id != id);
        let removed =
            self.accounts.len() != accounts_before || self.detected_bots.len() != bots_before;
        if removed {
            tracing::debug!(account_id = %id, "window.account.removed");
        }
        removed
    }

    /// Mutate the account `id` in place. Returns `false` when it is absent.
    ///
    /// The id is restored after `update` runs; accounts cannot be renamed.
    pub fn update_account<F>(&mut self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut Account),
    {
        let Some(account) = self.accounts.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        update(account);
        id.clone_into(&mut account.id);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
