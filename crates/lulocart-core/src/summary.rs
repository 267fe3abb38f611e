//! # Cart Summary Module
//!
//! Composes subtotal, per-item tax, delivery fee, platform fee, and the
//! store/platform revenue split into one financial summary.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      summarize() data flow                              │
//! │                                                                         │
//! │  items ────────► subtotal ──────────────┐                               │
//! │    │                                    │                               │
//! │    └──► per-item GST/PST ──► tax ───────┤                               │
//! │                                         ▼                               │
//! │  discount ──┐                                                           │
//! │             ├──► effective delivery fee ──► total                       │
//! │  fee ───────┘       (Pending → $0.00,       │                           │
//! │  (Loadable)          flagged pending)       ▼                           │
//! │                                                                         │
//! │  platform fee (Loadable, default) ───────► final_total                 │
//! │                                                 │                       │
//! │  commission rate ──► commission_amount ─────────┤                       │
//! │                                                 ▼                       │
//! │        store_amount + lulocart_amount == final_total  (to the cent)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! [`summarize`] is pure, synchronous, and idempotent. It is re-invoked on
//! every cart mutation and every fee override, so it must never await, log,
//! or touch state. Identical inputs produce identical output.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::DeliveryFeeDiscount;
use crate::money::{Money, Rate};
use crate::types::CartItem;

// =============================================================================
// Loadable
// =============================================================================

/// A value that may not have been fetched or computed yet.
///
/// The original sin this type prevents: treating "delivery fee not yet
/// calculated" as a real $0.00 fee in commission math. `Pending` renders
/// as zero in totals but is flagged on the summary, and order submission
/// refuses while the fee is still pending.
///
/// Serializes like the nullable field it replaces: `Pending` ⇄ `null`,
/// `Loaded(v)` ⇄ `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum Loadable<T> {
    Pending,
    Loaded(T),
}

impl<T> Loadable<T> {
    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Loadable::Pending)
    }

    #[inline]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Loadable::Loaded(_))
    }

    /// Returns the loaded value, if any.
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            Loadable::Pending => None,
        }
    }

    /// Returns the loaded value or a default.
    pub fn loaded_or(self, default: T) -> T {
        match self {
            Loadable::Loaded(value) => value,
            Loadable::Pending => default,
        }
    }
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Pending
    }
}

// =============================================================================
// Pricing Inputs
// =============================================================================

/// The override set a checkout session accumulates as address confirmation
/// and config fetches complete. Everything starts `Pending`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingInputs {
    /// Set after address confirmation computes a fee.
    pub delivery_fee: Loadable<Money>,
    /// Set after the platform fee config fetch.
    pub platform_fee: Loadable<Money>,
    /// Set after the platform fee config fetch.
    pub commission_rate: Loadable<Rate>,
    /// Carried through cart mutations so changing a quantity does not
    /// silently drop an applied discount.
    pub discount: Option<DeliveryFeeDiscount>,
}

/// Hardcoded fallbacks used when an override is still `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingDefaults {
    pub platform_fee_cents: i64,
    pub commission_rate_bps: u32,
}

impl PricingDefaults {
    #[inline]
    pub fn platform_fee(&self) -> Money {
        Money::from_cents(self.platform_fee_cents)
    }

    #[inline]
    pub fn commission_rate(&self) -> Rate {
        Rate::from_bps(self.commission_rate_bps)
    }
}

impl Default for PricingDefaults {
    fn default() -> Self {
        PricingDefaults {
            platform_fee_cents: 199,   // $1.99
            commission_rate_bps: 1000, // 10%
        }
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// The full financial summary of a cart or order.
///
/// Invariants (hold exactly, in integer cents):
/// - `tax = gst + pst`
/// - `total = subtotal + tax + delivery_fee` (fee already discount-applied)
/// - `final_total = total + platform_fee`
/// - `store_amount + lulocart_amount = final_total`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal_cents: i64,
    pub gst_cents: i64,
    pub pst_cents: i64,
    pub tax_cents: i64,
    /// Effective fee: discounted when eligible, zero while pending.
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub platform_fee_cents: i64,
    pub final_total_cents: i64,
    /// Total units across all lines.
    pub item_count: i64,
    pub commission_rate_bps: u32,
    /// Platform's cut of the subtotal.
    pub commission_amount_cents: i64,
    /// What the store receives: subtotal − commission + tax.
    pub store_amount_cents: i64,
    /// What the platform receives: commission + delivery fee + platform fee.
    pub lulocart_amount_cents: i64,
    pub delivery_fee_discount: Option<DeliveryFeeDiscount>,
    /// True while the delivery fee is still `Pending`; the zero fee above
    /// is then a placeholder, not a real free delivery.
    pub delivery_fee_pending: bool,
}

impl CartSummary {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn delivery_fee(&self) -> Money {
        Money::from_cents(self.delivery_fee_cents)
    }

    #[inline]
    pub fn final_total(&self) -> Money {
        Money::from_cents(self.final_total_cents)
    }
}

// =============================================================================
// Summarize
// =============================================================================

/// Builds the financial summary for a set of cart items and pricing inputs.
///
/// Per-item GST and PST are accumulated in rate-scaled integer space
/// (Σ line_cents × bps) and each axis is rounded ONCE at the end. Products
/// carry their own rates, so a zero-rated grocery line and a taxed
/// prepared-food line coexist without a flat cart rate.
///
/// ## Example
/// ```rust
/// use lulocart_core::money::Money;
/// use lulocart_core::summary::{summarize, Loadable, PricingDefaults, PricingInputs};
/// use lulocart_core::types::{CartItem, ProductSnapshot};
///
/// let product = ProductSnapshot {
///     id: "p1".into(),
///     store_id: "s1".into(),
///     name: "Apples".into(),
///     price_cents: 1000,
///     gst_bps: 500,
///     pst_bps: 0,
///     is_active: true,
/// };
/// let items = vec![CartItem::from_product(product, 2)];
///
/// let mut pricing = PricingInputs::default();
/// pricing.delivery_fee = Loadable::Loaded(Money::from_cents(499));
///
/// let summary = summarize(&items, &pricing, &PricingDefaults::default());
/// assert_eq!(summary.subtotal_cents, 2000);
/// assert_eq!(summary.gst_cents, 100);
/// assert_eq!(
///     summary.store_amount_cents + summary.lulocart_amount_cents,
///     summary.final_total_cents
/// );
/// ```
pub fn summarize(
    items: &[CartItem],
    pricing: &PricingInputs,
    defaults: &PricingDefaults,
) -> CartSummary {
    let mut subtotal = Money::zero();
    let mut item_count: i64 = 0;
    // Accumulate Σ line_cents × bps, round each axis once at the end
    let mut gst_scaled: i128 = 0;
    let mut pst_scaled: i128 = 0;

    for item in items {
        let line = item.line_total();
        subtotal += line;
        item_count += item.quantity;
        gst_scaled += line.cents() as i128 * item.product.gst_bps as i128;
        pst_scaled += line.cents() as i128 * item.product.pst_bps as i128;
    }

    let gst = Money::from_cents(((gst_scaled + 5000) / 10000) as i64);
    let pst = Money::from_cents(((pst_scaled + 5000) / 10000) as i64);
    let tax = gst + pst;

    let (delivery_fee, delivery_fee_pending) = match &pricing.discount {
        Some(discount) if discount.is_eligible => (discount.discounted_fee(), false),
        _ => match pricing.delivery_fee {
            Loadable::Loaded(fee) => (fee, false),
            Loadable::Pending => (Money::zero(), true),
        },
    };

    let total = subtotal + tax + delivery_fee;

    let platform_fee = if item_count > 0 {
        pricing.platform_fee.loaded_or(defaults.platform_fee())
    } else {
        Money::zero()
    };
    let final_total = total + platform_fee;

    let commission_rate = pricing
        .commission_rate
        .loaded_or(defaults.commission_rate());
    let commission_amount = subtotal.apply_rate(commission_rate);
    let store_amount = subtotal - commission_amount + tax;
    let lulocart_amount = commission_amount + delivery_fee + platform_fee;

    CartSummary {
        subtotal_cents: subtotal.cents(),
        gst_cents: gst.cents(),
        pst_cents: pst.cents(),
        tax_cents: tax.cents(),
        delivery_fee_cents: delivery_fee.cents(),
        total_cents: total.cents(),
        platform_fee_cents: platform_fee.cents(),
        final_total_cents: final_total.cents(),
        item_count,
        commission_rate_bps: commission_rate.bps(),
        commission_amount_cents: commission_amount.cents(),
        store_amount_cents: store_amount.cents(),
        lulocart_amount_cents: lulocart_amount.cents(),
        delivery_fee_discount: pricing.discount.clone(),
        delivery_fee_pending,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::{evaluate_discount, DiscountPolicy};
    use crate::types::ProductSnapshot;

    fn product(id: &str, price_cents: i64, gst_bps: u32, pst_bps: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            name: format!("Product {id}"),
            price_cents,
            gst_bps,
            pst_bps,
            is_active: true,
        }
    }

    fn two_item_cart() -> Vec<CartItem> {
        vec![
            CartItem::from_product(product("p1", 1000, 500, 0), 2),
            CartItem::from_product(product("p2", 1550, 500, 0), 1),
        ]
    }

    #[test]
    fn test_worked_example_two_items() {
        // $10.00 × 2 + $15.50 × 1 = $35.50; 5% GST = $1.775 → $1.78
        // (rounded once); delivery $4.99 → total $42.27
        let mut pricing = PricingInputs::default();
        pricing.delivery_fee = Loadable::Loaded(Money::from_cents(499));

        let s = summarize(&two_item_cart(), &pricing, &PricingDefaults::default());

        assert_eq!(s.subtotal_cents, 3550);
        assert_eq!(s.gst_cents, 178);
        assert_eq!(s.pst_cents, 0);
        assert_eq!(s.tax_cents, 178);
        assert_eq!(s.delivery_fee_cents, 499);
        assert_eq!(s.total_cents, 4227);
        assert_eq!(s.item_count, 3);
        assert!(!s.delivery_fee_pending);

        // Platform fee default applies on a non-empty cart
        assert_eq!(s.platform_fee_cents, 199);
        assert_eq!(s.final_total_cents, 4426);
    }

    #[test]
    fn test_tax_is_gst_plus_pst_exactly() {
        // Mixed tax treatments: zero-rated grocery + fully taxed item
        let items = vec![
            CartItem::from_product(product("milk", 333, 0, 0), 3),
            CartItem::from_product(product("soda", 299, 500, 700), 2),
        ];

        let s = summarize(&items, &PricingInputs::default(), &PricingDefaults::default());
        assert_eq!(s.tax_cents, s.gst_cents + s.pst_cents);

        // soda lines: 598 cents at 5%/7% → GST 29.9→30, PST 41.86→42
        assert_eq!(s.gst_cents, 30);
        assert_eq!(s.pst_cents, 42);
    }

    #[test]
    fn test_single_rounding_per_axis() {
        // Three lines of $0.33 at 5%: per-line rounding would give 3 × 2¢ = 6¢;
        // single rounding gives round(4.95¢) = 5¢
        let items = vec![
            CartItem::from_product(product("a", 33, 500, 0), 1),
            CartItem::from_product(product("b", 33, 500, 0), 1),
            CartItem::from_product(product("c", 33, 500, 0), 1),
        ];

        let s = summarize(&items, &PricingInputs::default(), &PricingDefaults::default());
        assert_eq!(s.gst_cents, 5);
    }

    #[test]
    fn test_revenue_split_balances_to_the_cent() {
        let awkward_prices = [333, 777, 1049, 1399, 2501];
        for (i, price) in awkward_prices.iter().enumerate() {
            let items = vec![CartItem::from_product(
                product(&format!("p{i}"), *price, 500, 700),
                (i as i64) + 1,
            )];

            let mut pricing = PricingInputs::default();
            pricing.delivery_fee = Loadable::Loaded(Money::from_cents(499));
            pricing.commission_rate = Loadable::Loaded(Rate::from_bps(1250)); // 12.5%

            let s = summarize(&items, &pricing, &PricingDefaults::default());
            assert_eq!(
                s.store_amount_cents + s.lulocart_amount_cents,
                s.final_total_cents,
                "split drifted at price {price}"
            );
            assert_eq!(s.total_cents, s.subtotal_cents + s.tax_cents + s.delivery_fee_cents);
            assert_eq!(s.final_total_cents, s.total_cents + s.platform_fee_cents);
        }
    }

    #[test]
    fn test_pending_delivery_fee_renders_zero_but_is_flagged() {
        let s = summarize(
            &two_item_cart(),
            &PricingInputs::default(),
            &PricingDefaults::default(),
        );

        assert_eq!(s.delivery_fee_cents, 0);
        assert!(s.delivery_fee_pending);
        // The zero still participates in the (provisional) totals
        assert_eq!(s.total_cents, s.subtotal_cents + s.tax_cents);
    }

    #[test]
    fn test_eligible_discount_replaces_fee() {
        let fee = Money::from_cents(1000);
        let discount = evaluate_discount(fee, 0, true, &DiscountPolicy::default());

        let mut pricing = PricingInputs::default();
        pricing.delivery_fee = Loadable::Loaded(fee);
        pricing.discount = Some(discount);

        let s = summarize(&two_item_cart(), &pricing, &PricingDefaults::default());
        assert_eq!(s.delivery_fee_cents, 800);
        assert!(!s.delivery_fee_pending);
        assert!(s.delivery_fee_discount.as_ref().unwrap().is_eligible);
    }

    #[test]
    fn test_ineligible_discount_leaves_fee() {
        let fee = Money::from_cents(1000);
        let discount = evaluate_discount(fee, 5, true, &DiscountPolicy::default());

        let mut pricing = PricingInputs::default();
        pricing.delivery_fee = Loadable::Loaded(fee);
        pricing.discount = Some(discount);

        let s = summarize(&two_item_cart(), &pricing, &PricingDefaults::default());
        assert_eq!(s.delivery_fee_cents, 1000);
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let s = summarize(&[], &PricingInputs::default(), &PricingDefaults::default());

        assert_eq!(s.subtotal_cents, 0);
        assert_eq!(s.tax_cents, 0);
        assert_eq!(s.item_count, 0);
        // Platform fee is suppressed on an empty cart
        assert_eq!(s.platform_fee_cents, 0);
        assert_eq!(s.final_total_cents, 0);
        assert_eq!(s.store_amount_cents + s.lulocart_amount_cents, 0);
    }

    #[test]
    fn test_loaded_overrides_beat_defaults() {
        let mut pricing = PricingInputs::default();
        pricing.platform_fee = Loadable::Loaded(Money::from_cents(299));
        pricing.commission_rate = Loadable::Loaded(Rate::from_bps(1500));

        let s = summarize(&two_item_cart(), &pricing, &PricingDefaults::default());
        assert_eq!(s.platform_fee_cents, 299);
        assert_eq!(s.commission_rate_bps, 1500);
        // 15% of $35.50 = $5.325 → $5.33
        assert_eq!(s.commission_amount_cents, 533);
    }

    #[test]
    fn test_idempotent() {
        let mut pricing = PricingInputs::default();
        pricing.delivery_fee = Loadable::Loaded(Money::from_cents(499));
        let items = two_item_cart();
        let defaults = PricingDefaults::default();

        let a = summarize(&items, &pricing, &defaults);
        let b = summarize(&items, &pricing, &defaults);
        assert_eq!(a, b);

        // Byte-identical through serialization too
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_loadable_serde_shape() {
        // Pending ⇄ null, Loaded ⇄ bare value
        let pending: Loadable<Money> = Loadable::Pending;
        assert_eq!(serde_json::to_string(&pending).unwrap(), "null");

        let loaded = Loadable::Loaded(Money::from_cents(499));
        assert_eq!(serde_json::to_string(&loaded).unwrap(), "499");

        let parsed: Loadable<Money> = serde_json::from_str("null").unwrap();
        assert!(parsed.is_pending());
        let parsed: Loadable<Money> = serde_json::from_str("250").unwrap();
        assert_eq!(parsed.loaded(), Some(&Money::from_cents(250)));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let s = summarize(
            &two_item_cart(),
            &PricingInputs::default(),
            &PricingDefaults::default(),
        );
        let json = serde_json::to_string(&s).unwrap();

        assert!(json.contains("\"lulocartAmountCents\""));
        assert!(json.contains("\"finalTotalCents\""));
        assert!(json.contains("\"deliveryFeePending\""));
    }
}
