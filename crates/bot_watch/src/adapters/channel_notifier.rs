// Rust guideline compliant 2026-10-19

//! Channel adapter for the `Notifier` port.
//!
//! Forwards every alert to an unbounded `mpsc` channel drained by the
//! presentation side. Delivery fails only once the receiver is gone.

use domain::{BotAlert, Notifier, NotifyError};
use tokio::sync::mpsc;

/// `Notifier` adapter that hands alerts to a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    alerts: mpsc::UnboundedSender<BotAlert>,
}

impl ChannelNotifier {
    /// Create the notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BotAlert>) {
        let (alerts, receiver) = mpsc::unbounded_channel();
        (Self { alerts }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    async fn notify(&self, alert: &BotAlert) -> Result<(), NotifyError> {
        if self.alerts.send(alert.clone()).is_err() {
            return Err(NotifyError::DeliveryFailed {
                reason: "alert receiver dropped".to_owned(),
            });
        }
        Ok(())
    }
}
