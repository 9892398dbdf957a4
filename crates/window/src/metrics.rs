// Rust guideline compliant 2026-10-19

//! Dashboard aggregates derived from a [`StreamWindow`].

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use domain::{Account, DetectedBot};
use serde::Serialize;

use crate::{StreamWindow, WindowError};

/// Default number of points kept by [`ActivityHistory`].
pub const ACTIVITY_HISTORY_LEN: usize = 13;

// ---------------------------------------------------------------------------
// AggregateMetrics
// ---------------------------------------------------------------------------

/// Headline figures for the metric cards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregateMetrics {
    /// Accounts currently in the window.
    pub window_size: usize,
    /// Classifications performed since the simulation started.
    pub classified: u64,
    /// Bots flagged since the simulation started, evicted ones included.
    pub flagged: u64,
    /// Bot records currently held.
    pub bots_detected: usize,
    /// Share of windowed accounts that are flagged, in `[0, 1]`.
    ///
    /// Covers the window only; see `overall_bot_rate` for the whole run.
    pub bot_rate: f64,
    /// `flagged / classified`, 0 before the first classification.
    pub overall_bot_rate: f64,
    /// Mean activity level of windowed accounts, 0 when empty.
    pub average_activity: f64,
}

impl AggregateMetrics {
    /// Derive the cards from `window` and the run totals.
    #[must_use]
    pub fn compute(window: &StreamWindow, classified: u64, flagged: u64) -> Self {
        let accounts = window.accounts();
        let in_window = accounts.iter().filter(|a| window.is_flagged(&a.id)).count();
        let bot_rate = if accounts.is_empty() {
            0.0
        } else {
            as_f64(in_window) / as_f64(accounts.len())
        };
        let overall_bot_rate = if classified == 0 {
            0.0
        } else {
            total_as_f64(flagged.min(classified)) / total_as_f64(classified)
        };
        Self {
            window_size: accounts.len(),
            classified,
            flagged,
            bots_detected: window.detected_bots().len(),
            bot_rate,
            overall_bot_rate,
            average_activity: mean_activity(accounts.iter()),
        }
    }
}

// ---------------------------------------------------------------------------
// ActivityHistory
// ---------------------------------------------------------------------------

/// Average activity of flagged and unflagged accounts at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityPoint {
    pub at: DateTime<Utc>,
    pub bot_activity: f64,
    pub normal_activity: f64,
}

impl ActivityPoint {
    /// Sample the current window. An empty group averages to 0.
    #[must_use]
    pub fn sample(window: &StreamWindow, at: DateTime<Utc>) -> Self {
        let (bots, humans): (Vec<&Account>, Vec<&Account>) =
            window.accounts().iter().partition(|a| window.is_flagged(&a.id));
        Self {
            at,
            bot_activity: mean_activity(bots.into_iter()),
            normal_activity: mean_activity(humans.into_iter()),
        }
    }
}

/// Rolling series of [`ActivityPoint`]s, oldest first.
#[derive(Debug, Clone)]
pub struct ActivityHistory {
    capacity: usize,
    points: VecDeque<ActivityPoint>,
}

impl Default for ActivityHistory {
    fn default() -> Self {
        Self {
            capacity: ACTIVITY_HISTORY_LEN,
            points: VecDeque::with_capacity(ACTIVITY_HISTORY_LEN + 1),
        }
    }
}

impl ActivityHistory {
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidConfig`] when `capacity` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn new(capacity: usize) -> Result<Self, WindowError> {
        if capacity == 0 {
            return Err(WindowError::InvalidConfig {
                reason: "activity history length must be >= 1".to_owned(),
            });
        }
        Ok(Self {
            capacity,
            points: VecDeque::with_capacity(capacity + 1),
        })
    }

    /// Append `point`, dropping the oldest one when full.
    pub fn record(&mut self, point: ActivityPoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    #[must_use]
    pub fn points(&self) -> &VecDeque<ActivityPoint> {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DashboardSnapshot
// ---------------------------------------------------------------------------

/// Immutable copy of the dashboard state handed to readers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardSnapshot {
    /// Newest first.
    pub accounts: Vec<Account>,
    /// Newest first.
    pub detected_bots: Vec<DetectedBot>,
    pub metrics: AggregateMetrics,
    /// Oldest first.
    pub activity: Vec<ActivityPoint>,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn capture(
        window: &StreamWindow,
        history: &ActivityHistory,
        classified: u64,
        flagged: u64,
    ) -> Self {
        Self {
            accounts: window.accounts().iter().cloned().collect(),
            detected_bots: window.detected_bots().iter().cloned().collect(),
            metrics: AggregateMetrics::compute(window, classified, flagged),
            activity: history.points().iter().copied().collect(),
        }
    }
}

fn mean_activity<'a>(accounts: impl Iterator<Item = &'a Account>) -> f64 {
    let (sum, count) = accounts.fold((0.0, 0_usize), |(sum, count), a| {
        (sum + f64::from(a.activity_level), count + 1)
    });
    if count == 0 { 0.0 } else { sum / as_f64(count) }
}

#[expect(clippy::cast_precision_loss, reason = "window sizes are tiny")]
fn as_f64(count: usize) -> f64 {
    count as f64
}

#[expect(clippy::cast_precision_loss, reason = "run totals stay far below 2^52")]
fn total_as_f64(count: u64) -> f64 {
    count as f64
}
