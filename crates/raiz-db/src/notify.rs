//! # Change Notifications
//!
//! Push channel for `payments` row updates.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  mark_payment_paid(sale)                                               │
//! │       │  commit                                                         │
//! │       ▼                                                                 │
//! │  ChangeNotifier::publish(PaymentChange)                                │
//! │       │                                                                 │
//! │       ▼  tokio broadcast (capacity 256)                                │
//! │  ┌──────────────────────┐  ┌──────────────────────┐                    │
//! │  │ PaymentSubscription  │  │ PaymentSubscription  │   one per watcher  │
//! │  │ sale_id = A          │  │ sale_id = B          │                    │
//! │  └──────────────────────┘  └──────────────────────┘                    │
//! │   yields only A's events    yields only B's events                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is best effort. A subscriber that falls behind skips the
//! events it missed; the watcher's poll covers that gap.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use raiz_core::PaymentStatus;

const CHANNEL_CAPACITY: usize = 256;

/// A `payments` row changed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChange {
    pub sale_id: String,
    pub payment_id: String,
    pub status: PaymentStatus,
}

/// Sender side, shared by every clone of `Database`.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<PaymentChange>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        ChangeNotifier { tx }
    }

    /// Publishes to current subscribers. No subscribers is not an error.
    pub fn publish(&self, change: PaymentChange) {
        debug!(sale_id = %change.sale_id, status = ?change.status, "Publishing payment change");
        let _ = self.tx.send(change);
    }

    /// Subscribes to updates of the payment of one sale.
    pub fn subscribe(&self, sale_id: impl Into<String>) -> PaymentSubscription {
        PaymentSubscription {
            sale_id: sale_id.into(),
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver filtered to one sale. Dropping it closes the subscription.
#[derive(Debug)]
pub struct PaymentSubscription {
    sale_id: String,
    rx: broadcast::Receiver<PaymentChange>,
}

impl PaymentSubscription {
    pub fn sale_id(&self) -> &str {
        &self.sale_id
    }

    /// Waits for the next change of this sale's payment.
    ///
    /// Returns `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<PaymentChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.sale_id == self.sale_id => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(sale_id = %self.sale_id, skipped, "Payment subscription lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(sale_id: &str) -> PaymentChange {
        PaymentChange {
            sale_id: sale_id.to_string(),
            payment_id: format!("pay-{sale_id}"),
            status: PaymentStatus::Paid,
        }
    }

    #[tokio::test]
    async fn test_subscription_filters_by_sale() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe("sale-b");

        notifier.publish(change("sale-a"));
        notifier.publish(change("sale-b"));

        let received = sub.recv().await.unwrap();
        assert_eq!(received.sale_id, "sale-b");
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.subscribe("sale-a");
        assert_eq!(notifier.subscriber_count(), 1);

        drop(sub);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_recv_ends_when_sender_dropped() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe("sale-a");

        drop(notifier);
        assert!(sub.recv().await.is_none());
    }

    #[test]
    fn test_publish_without_subscribers() {
        ChangeNotifier::new().publish(change("sale-a"));
    }
}
