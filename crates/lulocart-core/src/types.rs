//! # Domain Types
//!
//! Core domain types used throughout the Lulocart checkout engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductSnapshot │   │    CartItem     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  product_id     │   │  id (UUID)      │       │
//! │  │  store_id       │   │  product (snap) │   │  status         │       │
//! │  │  price_cents    │   │  quantity       │   │  payment_status │       │
//! │  │  gst/pst bps    │   │  price_at_time  │   │  summary        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ DeliveryAddress │   │   OrderStatus   │   │ PaymentStatus   │       │
//! │  │  ─────────────  │   │  (fulfillment)  │   │ (payment axis)  │       │
//! │  │  street, city   │   │  PendingPayment │   │  Pending        │       │
//! │  │  province       │   │  ... Delivered  │   │  ... Paid       │       │
//! │  │  coordinate?    │   │  Cancelled      │   │  Failed         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Cart items freeze a copy of the product at add-to-cart time. The frozen
//! `price_at_time_cents` is the authoritative unit price for totals until a
//! cart refresh re-syncs it with the live catalog (see the cart module).
//!
//! ## Orthogonal Status Axes
//! `OrderStatus` tracks fulfillment (what the store is doing with the order),
//! `PaymentStatus` tracks the money (what the processor did with the charge).
//! They advance independently; only the payment axis is driven by this
//! engine's state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::distance::Coordinate;
use crate::money::{Money, Rate};
use crate::summary::CartSummary;

// =============================================================================
// Product Snapshot
// =============================================================================

/// A frozen copy of catalog data, captured at add-to-cart time.
///
/// Products can have different tax treatments (basic groceries are
/// zero-rated, prepared food is not), so each snapshot carries its own
/// GST/PST rates rather than a flat cart-level rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSnapshot {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this product belongs to.
    pub store_id: String,

    /// Display name shown in the cart and on the order.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// GST rate in basis points (500 = 5%).
    pub gst_bps: u32,

    /// PST rate in basis points (700 = 7%).
    pub pst_bps: u32,

    /// Whether the product is active (soft delete).
    pub is_active: bool,
}

impl ProductSnapshot {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn gst_rate(&self) -> Rate {
        Rate::from_bps(self.gst_bps)
    }

    /// Returns the PST rate.
    #[inline]
    pub fn pst_rate(&self) -> Rate {
        Rate::from_bps(self.pst_bps)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line item in the cart.
/// Uses the snapshot pattern to freeze product data at add time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// The product this line refers to (also the line's identity).
    pub product_id: String,

    /// Frozen product snapshot.
    pub product: ProductSnapshot,

    /// Quantity in the cart (≥ 1).
    pub quantity: i64,

    /// Unit price in cents captured at add time. Authoritative for totals
    /// until a cart refresh re-syncs it with the live price.
    pub price_at_time_cents: i64,
}

impl CartItem {
    /// Creates a cart line from a product snapshot, freezing its price.
    pub fn from_product(product: ProductSnapshot, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            price_at_time_cents: product.price_cents,
            quantity,
            product,
        }
    }

    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn price_at_time(&self) -> Money {
        Money::from_cents(self.price_at_time_cents)
    }

    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_time().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Delivery Address
// =============================================================================

/// A customer delivery address.
///
/// The coordinate is absent until the geocoding collaborator resolves it;
/// distance-dependent pricing cannot run before that happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    /// Two-letter province code ("BC", "ON", ...). Unknown codes fall back
    /// to the default jurisdiction in tax calculations.
    pub province: String,
    pub postal_code: String,
    /// Resolved by geocoding; `None` until then.
    pub coordinate: Option<Coordinate>,
}

// =============================================================================
// Order Status (fulfillment axis)
// =============================================================================

/// Fulfillment status of an order.
///
/// Only `PendingPayment → Confirmed` and `→ Cancelled` are driven by the
/// payment state machine; the rest are store-operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, payment intent requested, waiting on the charge.
    PendingPayment,
    /// Payment settled; the store has the order.
    Confirmed,
    /// Store is assembling the order.
    Preparing,
    /// Assembled, waiting for a driver.
    Ready,
    /// Handed to a driver.
    OutForDelivery,
    /// Delivered to the customer (terminal).
    Delivered,
    /// Cancelled by customer, store, or failed payment (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Terminal orders are immutable; no further transition is expected.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::PendingPayment
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

// =============================================================================
// Payment Status (payment axis)
// =============================================================================

/// Payment status of an order, as observed from the processor's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment attempt submitted yet.
    Pending,
    /// Attempt submitted, charge in flight.
    Processing,
    /// Charge settled (terminal).
    Paid,
    /// Charge declined or errored (terminal).
    Failed,
    /// Attempt cancelled before settling (terminal).
    Cancelled,
}

impl PaymentStatus {
    /// Terminal payment states absorb all further feed updates.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Paid | PaymentStatus::Failed | PaymentStatus::Cancelled
        )
    }

    /// Parses a status label from the processor feed.
    ///
    /// The feed is not fully normalized: settled charges arrive as either
    /// `paid` or `confirmed`, and cancellations use both spellings.
    /// Unknown labels return `None` and must be ignored by the watcher.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "processing" => Some(PaymentStatus::Processing),
            "paid" | "confirmed" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "cancelled" | "canceled" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order: snapshot of the cart summary plus customer, address,
/// and item data at submission time.
///
/// ## Mutation Policy
/// Created in `PendingPayment`/`Pending` once a payment intent is requested.
/// After that the document is read-mostly on the client: the payment state
/// machine advances `payment_status`, the server-side webhook does the same,
/// and store operators advance the fulfillment `status`. Once `status` is
/// terminal, the order is immutable (enforced by the mutation layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Client-generated UUID v4, shared with the payment-intent metadata so
    /// the status feed and the webhook correlate without a lookup.
    pub id: String,

    pub store_id: String,

    pub customer_id: String,

    pub items: Vec<CartItem>,

    pub address: DeliveryAddress,

    /// Financial summary frozen at submission time.
    pub summary: CartSummary,

    pub status: OrderStatus,

    pub payment_status: PaymentStatus,

    /// Processor intent id, recorded after intent creation.
    pub payment_intent_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Failed Order Record
// =============================================================================

/// Minimal record of a failed payment attempt, persisted separately from
/// the order document for operational visibility.
///
/// Written fire-and-forget: a failed write here must never delay or mask
/// the inline error shown to the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FailedOrderRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The order whose payment attempt failed.
    pub order_id: String,

    pub store_id: String,

    pub customer_id: String,

    /// Processor error message.
    pub error: String,

    /// What the customer would have paid, in cents.
    pub attempted_total_cents: i64,

    /// Snapshot of what would have been ordered.
    pub items: Vec<CartItem>,

    #[ts(as = "String")]
    pub failed_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
