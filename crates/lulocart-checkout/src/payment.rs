//! # Payment Watching
//!
//! After [`submit`](crate::order::submit) opens a payment intent, the charge
//! settles out of band: the processor's webhook writes the result and the
//! status feed pushes it back. This module watches that feed and decides,
//! exactly once, how the attempt ended.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PaymentWatcher                                 │
//! │                                                                         │
//! │   status feed ──┐                                                       │
//! │                 ▼                                                       │
//! │          ┌─────────────┐   paid/confirmed   ┌──────────────────┐        │
//! │          │   select!   │───(success_delay)─►│ claim ► Completed│        │
//! │          │             │                    │  (push_confirmed)│        │
//! │          │             │   failed/cancelled └──────────────────┘        │
//! │          │             │──────────────────► claim ► Failed              │
//! │          │             │                                                │
//! │   7s ────│  deadline   │──────────────────► claim ► Completed           │
//! │          │             │                     (fallback_timeout)         │
//! │   drop ──│  shutdown   │──────────────────► stop, emit nothing          │
//! │          └─────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two success paths race: a pushed `paid`/`confirmed` update (held for a
//! short grace period so the webhook-side writes settle first) and a
//! one-shot fallback deadline that assumes success when no terminal status
//! arrived at all. [`CompletionGuard`] is the arbiter: whichever trigger
//! claims it first wins, so an order can never complete twice. A failed or
//! cancelled status claims the guard too, which is what disarms the
//! fallback.
//!
//! [`PaymentFlow`] sits on top: it subscribes to the feed, runs a watcher,
//! and applies the outcome to the order (confirm and clear the cart, or
//! record the failed attempt and leave the order retryable).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

use lulocart_core::types::{Order, OrderStatus, PaymentStatus};

use crate::error::{CheckoutError, CheckoutResult};
use crate::order::{failed_record, spawn_failed_order_record};
use crate::providers::{CartStore, OrderStore, PaymentStatusUpdate};

// =============================================================================
// Options
// =============================================================================

/// Timing knobs for the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherOptions {
    /// Grace period between a pushed confirmation and completion, so the
    /// webhook-side writes settle before the order flips.
    pub success_delay: Duration,
    /// One-shot deadline after which the payment is assumed successful.
    /// Feed outages would otherwise strand paid orders in `processing`.
    pub fallback_timeout: Duration,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        WatcherOptions {
            success_delay: Duration::from_secs(2),
            fallback_timeout: Duration::from_secs(7),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Which trigger completed the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTrigger {
    PushConfirmed,
    FallbackTimeout,
}

/// What the watcher reports to whoever is driving the checkout screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentEvent {
    /// The charge moved to `processing`; any prior error banner can clear.
    ErrorCleared,
    Completed {
        trigger: CompletionTrigger,
    },
    Failed {
        status: PaymentStatus,
        message: Option<String>,
    },
}

// =============================================================================
// Completion Guard
// =============================================================================

/// One-shot flag deciding which trigger completes the payment.
///
/// All clones share the flag; [`claim`](Self::claim) returns true for
/// exactly one caller across every clone.
#[derive(Debug, Clone, Default)]
pub struct CompletionGuard {
    completed: Arc<AtomicBool>,
}

impl CompletionGuard {
    pub fn new() -> Self {
        CompletionGuard::default()
    }

    /// Attempts to claim the completion. True exactly once.
    pub fn claim(&self) -> bool {
        self.completed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_claimed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}

// =============================================================================
// Watcher
// =============================================================================

/// Watches one order's payment status feed until a terminal outcome.
pub struct PaymentWatcher {
    order_id: String,
    options: WatcherOptions,
    guard: CompletionGuard,
    updates_rx: mpsc::Receiver<PaymentStatusUpdate>,
    events_tx: mpsc::Sender<PaymentEvent>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle to a running watcher.
///
/// Dropping the last handle stops the watcher without emitting an event,
/// same as calling [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct PaymentWatcherHandle {
    shutdown_tx: mpsc::Sender<()>,
    guard: CompletionGuard,
}

impl PaymentWatcherHandle {
    /// Stops the watcher. No event is emitted for a shutdown.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    /// True once any trigger has claimed the completion.
    pub fn is_settled(&self) -> bool {
        self.guard.is_claimed()
    }
}

impl PaymentWatcher {
    /// Spawns a watcher over an order's status feed. Returns the handle and
    /// the event stream; the stream closes when the watcher stops.
    pub fn spawn(
        order_id: impl Into<String>,
        updates_rx: mpsc::Receiver<PaymentStatusUpdate>,
        options: WatcherOptions,
    ) -> (PaymentWatcherHandle, mpsc::Receiver<PaymentEvent>) {
        let (events_tx, events_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let guard = CompletionGuard::new();

        let watcher = PaymentWatcher {
            order_id: order_id.into(),
            options,
            guard: guard.clone(),
            updates_rx,
            events_tx,
            shutdown_rx,
        };
        tokio::spawn(watcher.run());

        (PaymentWatcherHandle { shutdown_tx, guard }, events_rx)
    }

    async fn run(mut self) {
        let deadline = Instant::now() + self.options.fallback_timeout;
        // A closed feed must not spin the loop; the arm gets disabled instead
        let mut updates_open = true;

        debug!(order_id = %self.order_id, "Payment watcher started");

        loop {
            tokio::select! {
                update = self.updates_rx.recv(), if updates_open => {
                    match update {
                        Some(update) => {
                            if self.handle_update(update).await {
                                break;
                            }
                        }
                        None => updates_open = false,
                    }
                }
                _ = sleep_until(deadline) => {
                    self.fallback_fire().await;
                    break;
                }
                // Explicit shutdown, or every handle dropped
                _ = self.shutdown_rx.recv() => {
                    debug!(order_id = %self.order_id, "Payment watcher stopped");
                    break;
                }
            }
        }
    }

    /// Processes one feed update. Returns true when the watch is over.
    async fn handle_update(&mut self, update: PaymentStatusUpdate) -> bool {
        if update.order_id != self.order_id {
            warn!(
                order_id = %self.order_id,
                got = %update.order_id,
                "Ignoring status update for another order"
            );
            return false;
        }

        let Some(status) = PaymentStatus::from_label(&update.status_label) else {
            debug!(
                order_id = %self.order_id,
                label = %update.status_label,
                "Ignoring unknown payment status label"
            );
            return false;
        };

        match status {
            PaymentStatus::Processing => {
                let _ = self.events_tx.send(PaymentEvent::ErrorCleared).await;
                false
            }
            PaymentStatus::Paid => {
                // Once a confirmation is in hand the deadline cannot
                // interject; the grace period runs inside this arm
                sleep(self.options.success_delay).await;
                if self.guard.claim() {
                    info!(order_id = %self.order_id, "Payment confirmed by push");
                    let _ = self
                        .events_tx
                        .send(PaymentEvent::Completed {
                            trigger: CompletionTrigger::PushConfirmed,
                        })
                        .await;
                }
                true
            }
            PaymentStatus::Failed | PaymentStatus::Cancelled => {
                if self.guard.claim() {
                    warn!(order_id = %self.order_id, %status, "Payment did not settle");
                    let _ = self
                        .events_tx
                        .send(PaymentEvent::Failed {
                            status,
                            message: update.message,
                        })
                        .await;
                }
                true
            }
            PaymentStatus::Pending => false,
        }
    }

    async fn fallback_fire(&mut self) {
        if self.guard.claim() {
            warn!(
                order_id = %self.order_id,
                "No terminal status before the fallback deadline, assuming success"
            );
            let _ = self
                .events_tx
                .send(PaymentEvent::Completed {
                    trigger: CompletionTrigger::FallbackTimeout,
                })
                .await;
        }
    }
}

// =============================================================================
// Flow
// =============================================================================

/// How a watched payment ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Completed {
        trigger: CompletionTrigger,
    },
    Failed {
        status: PaymentStatus,
        message: Option<String>,
    },
}

/// Drives a submitted order through payment to its outcome.
pub struct PaymentFlow {
    orders: Arc<dyn OrderStore>,
    cart_store: Arc<dyn CartStore>,
    options: WatcherOptions,
}

impl PaymentFlow {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        cart_store: Arc<dyn CartStore>,
        options: WatcherOptions,
    ) -> Self {
        PaymentFlow {
            orders,
            cart_store,
            options,
        }
    }

    /// Watches the order's payment to a terminal outcome and applies it.
    ///
    /// On completion the order flips to `confirmed`/`paid`, the persisted
    /// cart is cleared, and `on_complete` runs with the confirmed order.
    /// On failure the order keeps status `pending_payment` with the failed
    /// payment status, so the existing intent can be retried, and a
    /// failed-attempt record is written in the background.
    pub async fn watch<F>(&self, order: &mut Order, on_complete: F) -> CheckoutResult<PaymentOutcome>
    where
        F: FnOnce(&Order),
    {
        order.payment_status = PaymentStatus::Processing;
        order.updated_at = Utc::now();

        let updates_rx = self.orders.subscribe_payment_status(&order.id).await?;
        let (handle, mut events_rx) =
            PaymentWatcher::spawn(order.id.clone(), updates_rx, self.options);
        // Dropping the handle would stop the watcher; hold it for the watch
        let _watcher = handle;

        while let Some(event) = events_rx.recv().await {
            match event {
                PaymentEvent::ErrorCleared => {
                    debug!(order_id = %order.id, "Payment processing");
                }
                PaymentEvent::Completed { trigger } => {
                    self.complete(order, trigger).await;
                    on_complete(&*order);
                    return Ok(PaymentOutcome::Completed { trigger });
                }
                PaymentEvent::Failed { status, message } => {
                    self.fail(order, status, message.clone()).await;
                    return Ok(PaymentOutcome::Failed { status, message });
                }
            }
        }

        Err(CheckoutError::SubscriptionClosed)
    }

    async fn complete(&self, order: &mut Order, trigger: CompletionTrigger) {
        order.status = OrderStatus::Confirmed;
        order.payment_status = PaymentStatus::Paid;
        order.updated_at = Utc::now();

        if let Err(error) = self.cart_store.clear().await {
            warn!(order_id = %order.id, %error, "Could not clear cart after payment");
        }

        info!(order_id = %order.id, ?trigger, "Order confirmed");
    }

    async fn fail(&self, order: &mut Order, status: PaymentStatus, message: Option<String>) {
        // The order itself stays pending_payment; the intent is still
        // chargeable on retry
        order.payment_status = status;
        order.updated_at = Utc::now();

        let reason = message.unwrap_or_else(|| format!("Payment {status}"));
        spawn_failed_order_record(Arc::clone(&self.orders), failed_record(order, reason));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::{MemoryCartStore, MemoryOrderStore};
    use lulocart_core::cart::CartState;
    use lulocart_core::summary::{summarize, PricingDefaults, PricingInputs};
    use lulocart_core::types::DeliveryAddress;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn update(order_id: &str, label: &str, message: Option<&str>) -> PaymentStatusUpdate {
        PaymentStatusUpdate {
            order_id: order_id.to_string(),
            status_label: label.to_string(),
            message: message.map(String::from),
        }
    }

    fn pending_order(id: &str) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            customer_id: "cust-1".to_string(),
            items: Vec::new(),
            address: DeliveryAddress {
                street: "12 Main St".to_string(),
                city: "Vancouver".to_string(),
                province: "BC".to_string(),
                postal_code: "V5K 0A1".to_string(),
                coordinate: None,
            },
            summary: summarize(&[], &PricingInputs::default(), &PricingDefaults::default()),
            status: OrderStatus::PendingPayment,
            payment_status: PaymentStatus::Pending,
            payment_intent_id: Some("pi_0001".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Pushes one status into the feed as soon as the flow has subscribed.
    fn push_when_subscribed(
        store: &Arc<MemoryOrderStore>,
        order_id: &str,
        label: &'static str,
        message: Option<&'static str>,
    ) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(store);
        let order_id = order_id.to_string();
        tokio::spawn(async move {
            while !store.has_subscriber(&order_id) {
                sleep(Duration::from_millis(10)).await;
            }
            assert!(store.push_status(&order_id, label, message));
        })
    }

    #[test]
    fn test_completion_guard_claims_once() {
        let guard = CompletionGuard::new();
        let clone = guard.clone();

        assert!(!guard.is_claimed());
        assert!(clone.claim());
        assert!(!guard.claim());
        assert!(guard.is_claimed());
    }

    #[test]
    fn test_payment_event_wire_shape() {
        let completed = PaymentEvent::Completed {
            trigger: CompletionTrigger::FallbackTimeout,
        };
        assert_eq!(
            serde_json::to_value(&completed).unwrap(),
            json!({"type": "completed", "trigger": "fallback_timeout"})
        );

        let failed = PaymentEvent::Failed {
            status: PaymentStatus::Failed,
            message: Some("card declined".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"type": "failed", "status": "failed", "message": "card declined"})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_confirmation_completes_once() {
        init_tracing();
        let (tx, rx) = mpsc::channel(16);
        let (handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        tx.send(update("order-1", "paid", None)).await.unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            PaymentEvent::Completed {
                trigger: CompletionTrigger::PushConfirmed
            }
        );
        assert!(handle.is_settled());

        // The watcher exited; the stream is closed and nothing else arrives
        assert!(events.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_label_counts_as_paid() {
        let (tx, rx) = mpsc::channel(16);
        let (_handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        tx.send(update("order-1", "confirmed", None)).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            PaymentEvent::Completed {
                trigger: CompletionTrigger::PushConfirmed
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_timeout_assumes_success() {
        init_tracing();
        let (_tx, rx) = mpsc::channel::<PaymentStatusUpdate>(16);
        let started = Instant::now();
        let (handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            PaymentEvent::Completed {
                trigger: CompletionTrigger::FallbackTimeout
            }
        );
        assert!(started.elapsed() >= Duration::from_secs(7));
        assert!(handle.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_push_stops_watching() {
        let (tx, rx) = mpsc::channel(16);
        let (handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        tx.send(update("order-1", "failed", Some("card declined")))
            .await
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            PaymentEvent::Failed {
                status: PaymentStatus::Failed,
                message: Some("card declined".to_string()),
            }
        );
        assert!(handle.is_settled());

        // The failure claimed the guard, so the fallback never fires
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(events.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paid_near_deadline_completes_exactly_once() {
        let (tx, rx) = mpsc::channel(16);
        let (_handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        // Confirmation lands just before the 7s deadline; the grace period
        // then runs past it
        tokio::time::advance(Duration::from_millis(6900)).await;
        tx.send(update("order-1", "paid", None)).await.unwrap();

        let event = events.recv().await.unwrap();
        assert!(matches!(event, PaymentEvent::Completed { .. }));
        assert!(events.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_and_foreign_updates_ignored() {
        init_tracing();
        let (tx, rx) = mpsc::channel(16);
        let (_handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        tx.send(update("order-1", "refunded", None)).await.unwrap();
        tx.send(update("order-2", "paid", None)).await.unwrap();

        // Neither settles order-1; the fallback eventually does
        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            PaymentEvent::Completed {
                trigger: CompletionTrigger::FallbackTimeout
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_clears_error_banner() {
        let (tx, rx) = mpsc::channel(16);
        let (_handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        tx.send(update("order-1", "processing", None)).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), PaymentEvent::ErrorCleared);

        tx.send(update("order-1", "paid", None)).await.unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            PaymentEvent::Completed {
                trigger: CompletionTrigger::PushConfirmed
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_feed_still_falls_back() {
        let (tx, rx) = mpsc::channel::<PaymentStatusUpdate>(16);
        let (_handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());
        drop(tx);

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            PaymentEvent::Completed {
                trigger: CompletionTrigger::FallbackTimeout
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_emits_nothing() {
        let (_tx, rx) = mpsc::channel::<PaymentStatusUpdate>(16);
        let (handle, mut events) = PaymentWatcher::spawn("order-1", rx, WatcherOptions::default());

        handle.shutdown().await;

        assert!(events.recv().await.is_none());
        assert!(!handle.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flow_completion_confirms_and_clears_cart() {
        init_tracing();
        let store = Arc::new(MemoryOrderStore::new());
        let cart_store = Arc::new(MemoryCartStore::with_saved(CartState::new()));
        let flow = PaymentFlow::new(
            Arc::clone(&store) as Arc<dyn OrderStore>,
            Arc::clone(&cart_store) as Arc<dyn CartStore>,
            WatcherOptions::default(),
        );

        let mut order = pending_order("order-1");
        let pusher = push_when_subscribed(&store, "order-1", "paid", None);

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);
        let outcome = flow
            .watch(&mut order, |confirmed| {
                calls_in.fetch_add(1, Ordering::SeqCst);
                assert_eq!(confirmed.status, OrderStatus::Confirmed);
            })
            .await
            .unwrap();
        pusher.await.unwrap();

        assert_eq!(
            outcome,
            PaymentOutcome::Completed {
                trigger: CompletionTrigger::PushConfirmed
            }
        );
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cart_store.saved().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flow_failure_keeps_order_retryable() {
        init_tracing();
        let store = Arc::new(MemoryOrderStore::new());
        let cart_store = Arc::new(MemoryCartStore::with_saved(CartState::new()));
        let flow = PaymentFlow::new(
            Arc::clone(&store) as Arc<dyn OrderStore>,
            Arc::clone(&cart_store) as Arc<dyn CartStore>,
            WatcherOptions::default(),
        );

        let mut order = pending_order("order-1");
        let pusher = push_when_subscribed(&store, "order-1", "failed", Some("card declined"));

        let outcome = flow
            .watch(&mut order, |_| panic!("failed payments must not complete"))
            .await
            .unwrap();
        pusher.await.unwrap();

        assert_eq!(
            outcome,
            PaymentOutcome::Failed {
                status: PaymentStatus::Failed,
                message: Some("card declined".to_string()),
            }
        );
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert!(order.payment_intent_id.is_some());
        // The cart survives for the retry
        assert!(cart_store.saved().is_some());

        // Let the fire-and-forget record task run
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        let records = store.failed_records();
        assert_eq!(records.len(), 1);
        assert!(records[0].error.contains("card declined"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flow_fallback_when_feed_is_silent() {
        let store = Arc::new(MemoryOrderStore::new());
        let cart_store = Arc::new(MemoryCartStore::with_saved(CartState::new()));
        let flow = PaymentFlow::new(
            Arc::clone(&store) as Arc<dyn OrderStore>,
            Arc::clone(&cart_store) as Arc<dyn CartStore>,
            WatcherOptions::default(),
        );

        let mut order = pending_order("order-1");
        let outcome = flow.watch(&mut order, |_| {}).await.unwrap();

        assert_eq!(
            outcome,
            PaymentOutcome::Completed {
                trigger: CompletionTrigger::FallbackTimeout
            }
        );
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(cart_store.saved().is_none());
    }
}
