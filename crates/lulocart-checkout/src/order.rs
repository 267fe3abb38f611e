//! # Order Assembly and Submission
//!
//! Turns a checkout session into a persisted order and a payment intent.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  build_order ──► create_order ──► create_payment_intent ──► Attempt     │
//! │       │                 │                    │                          │
//! │   flow gates        Err: stop,          Err: surface inline            │
//! │   (empty cart,      nothing charged      + failed-order record          │
//! │    no fee,                                 (fire-and-forget)            │
//! │    no address)                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The order id is minted client-side before anything is persisted, so the
//! payment intent can carry it in metadata and the status feed can be
//! keyed by it without waiting for a server-assigned id.
//!
//! The order is created before the intent. A failed intent leaves a
//! `pending_payment` order behind, which is harmless and retryable; the
//! reverse ordering could charge a customer for an order that was never
//! written.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use lulocart_core::types::{FailedOrderRecord, Order, OrderStatus, PaymentStatus};

use crate::error::{CheckoutError, CheckoutResult};
use crate::providers::{OrderStore, PaymentIntentRequest, PaymentProcessor};
use crate::session::CheckoutSession;

// =============================================================================
// Payment Attempt
// =============================================================================

/// What the payment form needs to collect the charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAttempt {
    pub order_id: String,
    pub intent_id: String,
    pub client_secret: String,
}

// =============================================================================
// Build
// =============================================================================

/// Assembles an order from the session's current state.
///
/// Pure: nothing is persisted and the session is untouched. Gates on the
/// three states an order must never be placed from.
pub fn build_order(session: &CheckoutSession) -> CheckoutResult<Order> {
    let cart = session.cart();
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let summary = session.summary();
    if summary.delivery_fee_pending {
        return Err(CheckoutError::DeliveryFeeNotCalculated);
    }

    let address = session
        .address()
        .cloned()
        .ok_or(CheckoutError::MissingAddress)?;
    // A non-empty cart always has a store id
    let store_id = cart.store_id.clone().ok_or(CheckoutError::EmptyCart)?;

    let now = Utc::now();
    Ok(Order {
        id: Uuid::new_v4().to_string(),
        store_id,
        customer_id: session.customer().customer_id.clone(),
        items: cart.items.clone(),
        address,
        summary,
        status: OrderStatus::PendingPayment,
        payment_status: PaymentStatus::Pending,
        payment_intent_id: None,
        created_at: now,
        updated_at: now,
    })
}

// =============================================================================
// Submit
// =============================================================================

/// Persists the order and opens a payment intent for its final total.
///
/// On intent failure the error is returned inline and a
/// [`FailedOrderRecord`] is written in the background; the persisted order
/// stays `pending_payment` so the customer can retry.
pub async fn submit(
    order: &mut Order,
    orders: &Arc<dyn OrderStore>,
    payments: &dyn PaymentProcessor,
) -> CheckoutResult<PaymentAttempt> {
    orders.create_order(order).await?;
    info!(
        order_id = %order.id,
        store_id = %order.store_id,
        total_cents = order.summary.final_total_cents,
        "Order created"
    );

    let request = PaymentIntentRequest {
        order_id: order.id.clone(),
        customer_id: order.customer_id.clone(),
        amount_cents: order.summary.final_total_cents,
        currency: "cad".to_string(),
    };

    match payments.create_payment_intent(&request).await {
        Ok(intent) => {
            order.payment_intent_id = Some(intent.intent_id.clone());
            order.updated_at = Utc::now();
            Ok(PaymentAttempt {
                order_id: order.id.clone(),
                intent_id: intent.intent_id,
                client_secret: intent.client_secret,
            })
        }
        Err(error) => {
            warn!(order_id = %order.id, %error, "Payment intent creation failed");
            spawn_failed_order_record(Arc::clone(orders), failed_record(order, error.to_string()));
            Err(error)
        }
    }
}

// =============================================================================
// Failed Attempts
// =============================================================================

pub(crate) fn failed_record(order: &Order, error: String) -> FailedOrderRecord {
    FailedOrderRecord {
        id: Uuid::new_v4().to_string(),
        order_id: order.id.clone(),
        store_id: order.store_id.clone(),
        customer_id: order.customer_id.clone(),
        error,
        attempted_total_cents: order.summary.final_total_cents,
        items: order.items.clone(),
        failed_at: Utc::now(),
    }
}

/// Writes a failed-attempt record off the hot path. The record is for
/// support tooling; a write failure is logged and never surfaces to the
/// customer.
pub(crate) fn spawn_failed_order_record(orders: Arc<dyn OrderStore>, record: FailedOrderRecord) {
    tokio::spawn(async move {
        if let Err(error) = orders.record_failed_order(&record).await {
            warn!(order_id = %record.order_id, %error, "Could not write failed-order record");
        }
    });
}

// =============================================================================
// Unit Tests
// =============================================================================
