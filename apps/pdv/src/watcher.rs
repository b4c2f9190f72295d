//! # Payment Status Watcher
//!
//! Waits for a pending payment to become `PAID` and fires a callback once.
//!
//! ## Dual Channel, First Wins
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        watcher task (one per sale)                      │
//! │                                                                         │
//! │   PaymentSubscription ──► recv() ── PAID ──┐                            │
//! │                                            ▼                            │
//! │                                     ┌─────────────┐                     │
//! │                                     │ latch (CAS) │──► on_confirmed()   │
//! │                                     └─────────────┘    at most once     │
//! │                                            ▲                            │
//! │   interval(3000 ms) ──► status() ── PAID ──┘                            │
//! │                           │                                             │
//! │                           └── Err ──► warn!, retry next tick            │
//! │                                                                         │
//! │   WatcherHandle::stop / Drop ──► abort: subscription + timer dropped    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no maximum wait. The watcher runs until the payment is paid or
//! the handle is stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use raiz_core::PaymentStatus;
use raiz_db::{Database, DbResult, PaymentSubscription};

/// Where the watcher reads payment state from.
#[async_trait]
pub trait PaymentFeed: Send + Sync + 'static {
    /// Push channel scoped to one sale.
    fn subscribe(&self, sale_id: &str) -> PaymentSubscription;

    /// Direct read used by the poll.
    async fn status(&self, sale_id: &str) -> DbResult<PaymentStatus>;
}

#[async_trait]
impl PaymentFeed for Database {
    fn subscribe(&self, sale_id: &str) -> PaymentSubscription {
        self.subscribe_payments(sale_id)
    }

    async fn status(&self, sale_id: &str) -> DbResult<PaymentStatus> {
        self.payments().status_for_sale(sale_id).await
    }
}

/// One-shot latch: only the first `fire` wins.
#[derive(Debug, Default)]
struct Latch(AtomicBool);

impl Latch {
    fn fire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Which channel saw the payment first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmedBy {
    Push,
    Poll,
}

pub struct PaymentWatcher;

impl PaymentWatcher {
    /// Starts watching `sale_id`.
    ///
    /// The subscription is opened before this returns, so a change
    /// published right after the call is not missed. The first poll runs
    /// one `poll_interval` after the start.
    pub fn spawn<F>(
        feed: Arc<dyn PaymentFeed>,
        sale_id: impl Into<String>,
        poll_interval: Duration,
        on_confirmed: F,
    ) -> WatcherHandle
    where
        F: Fn(&str, ConfirmedBy) + Send + Sync + 'static,
    {
        let sale_id = sale_id.into();
        let latch = Arc::new(Latch::default());
        let mut subscription = feed.subscribe(&sale_id);

        debug!(sale_id = %sale_id, ?poll_interval, "Starting payment watcher");

        let task = {
            let latch = Arc::clone(&latch);
            let sale_id = sale_id.clone();
            tokio::spawn(async move {
                let confirm = |by: ConfirmedBy| {
                    if latch.fire() {
                        info!(sale_id = %sale_id, ?by, "Payment confirmed");
                        on_confirmed(&sale_id, by);
                    }
                };

                let mut ticker = tokio::time::interval_at(
                    tokio::time::Instant::now() + poll_interval,
                    poll_interval,
                );
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut push_open = true;

                loop {
                    tokio::select! {
                        change = subscription.recv(), if push_open => match change {
                            Some(change) if change.status.is_paid() => {
                                confirm(ConfirmedBy::Push);
                                break;
                            }
                            Some(_) => {}
                            None => {
                                warn!(sale_id = %sale_id, "Payment channel closed, polling only");
                                push_open = false;
                            }
                        },
                        _ = ticker.tick() => match feed.status(&sale_id).await {
                            Ok(status) if status.is_paid() => {
                                confirm(ConfirmedBy::Poll);
                                break;
                            }
                            Ok(_) => debug!(sale_id = %sale_id, "Payment still pending"),
                            Err(e) => warn!(sale_id = %sale_id, error = %e, "Payment status poll failed"),
                        },
                    }
                }
            })
        };

        WatcherHandle {
            sale_id,
            latch,
            task,
        }
    }
}

/// Owner of a running watcher. Dropping it stops the watcher.
#[derive(Debug)]
pub struct WatcherHandle {
    sale_id: String,
    latch: Arc<Latch>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn sale_id(&self) -> &str {
        &self.sale_id
    }

    /// The confirmation callback has run.
    pub fn is_confirmed(&self) -> bool {
        self.latch.is_set()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the task, closing its subscription and timer.
    pub fn stop(&self) {
        if !self.task.is_finished() {
            debug!(sale_id = %self.sale_id, "Stopping payment watcher");
        }
        self.task.abort();
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use raiz_db::{ChangeNotifier, DbError, PaymentChange};

    /// Feed with a hand-driven channel and status.
    #[derive(Default)]
    struct SpyFeed {
        notifier: ChangeNotifier,
        status: Mutex<PaymentStatus>,
        fail_polls: AtomicBool,
        polls: AtomicUsize,
    }

    impl SpyFeed {
        fn set_status(&self, status: PaymentStatus) {
            *self.status.lock().unwrap() = status;
        }

        fn push(&self, sale_id: &str, status: PaymentStatus) {
            self.notifier.publish(PaymentChange {
                sale_id: sale_id.to_string(),
                payment_id: format!("pay-{sale_id}"),
                status,
            });
        }

        fn polls(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentFeed for SpyFeed {
        fn subscribe(&self, sale_id: &str) -> PaymentSubscription {
            self.notifier.subscribe(sale_id)
        }

        async fn status(&self, _sale_id: &str) -> DbResult<PaymentStatus> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            if self.fail_polls.load(Ordering::SeqCst) {
                return Err(DbError::ConnectionFailed("offline".into()));
            }
            Ok(*self.status.lock().unwrap())
        }
    }

    fn counting() -> (Arc<AtomicUsize>, impl Fn(&str, ConfirmedBy) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let callback = {
            let count = Arc::clone(&count);
            move |_: &str, _: ConfirmedBy| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        };
        (count, callback)
    }

    const POLL: Duration = Duration::from_millis(3000);

    #[tokio::test(start_paused = true)]
    async fn test_poll_confirms_after_interval() {
        let spy = Arc::new(SpyFeed::default());
        let (count, callback) = counting();
        let handle = PaymentWatcher::spawn(spy.clone(), "sale-1", POLL, callback);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(spy.polls(), 0);

        spy.set_status(PaymentStatus::Paid);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(spy.polls(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(handle.is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_confirms_without_poll() {
        let spy = Arc::new(SpyFeed::default());
        let (count, callback) = counting();
        let handle = PaymentWatcher::spawn(spy.clone(), "sale-1", POLL, callback);

        spy.push("sale-2", PaymentStatus::Paid);
        spy.push("sale-1", PaymentStatus::Pending);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        spy.push("sale-1", PaymentStatus::Paid);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(spy.polls(), 0);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_channels_confirm_once() {
        let spy = Arc::new(SpyFeed::default());
        let (count, callback) = counting();
        let _handle = PaymentWatcher::spawn(spy.clone(), "sale-1", POLL, callback);

        spy.set_status(PaymentStatus::Paid);
        spy.push("sale-1", PaymentStatus::Paid);
        spy.push("sale-1", PaymentStatus::Paid);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(spy.notifier.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_tears_down_subscription_and_timer() {
        let spy = Arc::new(SpyFeed::default());
        let (count, callback) = counting();
        let handle = PaymentWatcher::spawn(spy.clone(), "sale-1", POLL, callback);
        assert_eq!(spy.notifier.subscriber_count(), 1);

        tokio::time::sleep(Duration::from_millis(6500)).await;
        assert_eq!(spy.polls(), 2);

        handle.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(spy.notifier.subscriber_count(), 0);

        spy.set_status(PaymentStatus::Paid);
        spy.push("sale-1", PaymentStatus::Paid);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(spy.polls(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!handle.is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_watcher() {
        let spy = Arc::new(SpyFeed::default());
        let (count, callback) = counting();
        let handle = PaymentWatcher::spawn(spy.clone(), "sale-1", POLL, callback);

        drop(handle);
        spy.set_status(PaymentStatus::Paid);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(spy.polls(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_retries_next_tick() {
        let spy = Arc::new(SpyFeed::default());
        spy.fail_polls.store(true, Ordering::SeqCst);
        let (count, callback) = counting();
        let _handle = PaymentWatcher::spawn(spy.clone(), "sale-1", POLL, callback);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(spy.polls(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        spy.fail_polls.store(false, Ordering::SeqCst);
        spy.set_status(PaymentStatus::Paid);
        tokio::time::sleep(Duration::from_millis(3000)).await;

        assert_eq!(spy.polls(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_latch_fires_once() {
        let latch = Latch::default();
        assert!(!latch.is_set());
        assert!(latch.fire());
        assert!(!latch.fire());
        assert!(latch.is_set());
    }
}
