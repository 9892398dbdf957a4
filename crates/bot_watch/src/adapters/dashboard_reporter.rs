// Rust guideline compliant 2026-10-19

//! Terminal stand-in for the dashboard UI.
//!
//! Consumes the published snapshots and the alert channel and turns them into
//! log lines. Only bots passing the configured `CategoryFilter` are shown.

use std::sync::Arc;

use domain::{BotAlert, CategoryFilter};
use tokio::sync::{mpsc, watch};
use window::DashboardSnapshot;

/// Logs dashboard state and bot alerts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardReporter {
    filter: CategoryFilter,
}

impl DashboardReporter {
    #[must_use]
    pub fn new(filter: CategoryFilter) -> Self {
        Self { filter }
    }

    /// Drain both inputs until their senders are gone.
    pub async fn run(
        &self,
        mut snapshots: watch::Receiver<Arc<DashboardSnapshot>>,
        mut alerts: mpsc::UnboundedReceiver<BotAlert>,
    ) {
        let mut snapshots_open = true;
        let mut alerts_open = true;
        loop {
            tokio::select! {
                changed = snapshots.changed(), if snapshots_open => {
                    if changed.is_ok() {
                        let snapshot = Arc::clone(&snapshots.borrow_and_update());
                        self.report_snapshot(&snapshot);
                    } else {
                        snapshots_open = false;
                    }
                }
                alert = alerts.recv(), if alerts_open => match alert {
                    Some(alert) => self.report_alert(&alert),
                    None => alerts_open = false,
                },
                else => break,
            }
        }
        tracing::info!("dashboard.reporter.stopped");
    }

    /// One-line summary of the metric cards plus the filtered bot list.
    #[must_use]
    pub fn summarize(&self, snapshot: &DashboardSnapshot) -> String {
        let metrics = &snapshot.metrics;
        let shown: Vec<String> = snapshot
            .detected_bots
            .iter()
            .filter(|bot| self.filter.matches(bot.category))
            .take(5)
            .map(|bot| format!("{}({})", bot.username, bot.category))
            .collect();
        format!(
            "accounts={} bots={} bot_rate={:.1}% overall_bot_rate={:.1}% avg_activity={:.1} latest=[{}]",
            metrics.window_size,
            metrics.bots_detected,
            metrics.bot_rate * 100.0,
            metrics.overall_bot_rate * 100.0,
            metrics.average_activity,
            shown.join(", ")
        )
    }

    fn report_snapshot(&self, snapshot: &DashboardSnapshot) {
        tracing::info!(
            classified = snapshot.metrics.classified,
            flagged = snapshot.metrics.flagged,
            "dashboard.snapshot: {}",
            self.summarize(snapshot)
        );
        if let Some(point) = snapshot.activity.last() {
            tracing::debug!(
                at = %point.at,
                bot_activity = point.bot_activity,
                normal_activity = point.normal_activity,
                "dashboard.activity.sampled"
            );
        }
        match serde_json::to_string(&snapshot.metrics) {
            Ok(json) => tracing::trace!(metrics = %json, "dashboard.metrics.json"),
            Err(e) => tracing::warn!(error = %e, "dashboard.metrics.encode_failed"),
        }
    }

    fn report_alert(&self, alert: &BotAlert) {
        if !self.filter.matches(alert.category) {
            return;
        }
        tracing::warn!(
            account_id = %alert.account.id,
            username = %alert.account.username,
            category = %alert.category,
            confidence = alert.confidence,
            "dashboard.bot.alert"
        );
    }
}
