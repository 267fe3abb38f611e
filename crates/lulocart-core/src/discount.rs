//! # New-Customer Discount Module
//!
//! Delivery-fee discount for a customer's first few orders.
//!
//! [`evaluate_discount`] is a pure, synchronous function: the checkout
//! session calls it with a fee it computed a moment earlier, before any
//! cached summary has had a chance to recompute. A memoized wrapper here
//! would read stale fees.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};

/// Default discount: 20% off the delivery fee.
pub const DEFAULT_DISCOUNT_RATE_BPS: u32 = 2000;

/// Default window: a customer's first 3 completed orders.
pub const DEFAULT_DISCOUNT_ELIGIBLE_ORDER_COUNT: u32 = 3;

// =============================================================================
// Policy
// =============================================================================

/// Discount policy, normally sourced from [`DeliveryFeeConfig`].
///
/// [`DeliveryFeeConfig`]: crate::delivery::DeliveryFeeConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPolicy {
    /// Discount rate in basis points.
    pub rate_bps: u32,
    /// Completed orders below this count qualify.
    pub eligible_order_count: u32,
}

impl DiscountPolicy {
    #[inline]
    pub fn rate(&self) -> Rate {
        Rate::from_bps(self.rate_bps)
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy {
            rate_bps: DEFAULT_DISCOUNT_RATE_BPS,
            eligible_order_count: DEFAULT_DISCOUNT_ELIGIBLE_ORDER_COUNT,
        }
    }
}

// =============================================================================
// Discount Record
// =============================================================================

/// The outcome of a discount evaluation, kept alongside the fee it applies
/// to so the UI can show "you saved $2.00" and the summary calculator can
/// carry the discount through cart mutations without re-deriving it.
///
/// Invariants:
/// - `discounted_fee = original_fee − discount_amount` when eligible
/// - `discounted_fee = original_fee` and `discount_amount = 0` otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFeeDiscount {
    pub original_fee_cents: i64,
    pub discounted_fee_cents: i64,
    pub discount_amount_cents: i64,
    pub is_eligible: bool,
    /// Discounted orders the customer still has, including this one.
    pub orders_remaining: u32,
    /// Rate applied, in basis points.
    pub rate_bps: u32,
}

impl DeliveryFeeDiscount {
    #[inline]
    pub fn original_fee(&self) -> Money {
        Money::from_cents(self.original_fee_cents)
    }

    #[inline]
    pub fn discounted_fee(&self) -> Money {
        Money::from_cents(self.discounted_fee_cents)
    }

    #[inline]
    pub fn discount_amount(&self) -> Money {
        Money::from_cents(self.discount_amount_cents)
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates the new-customer discount against a just-computed delivery fee.
///
/// Eligibility: logged in AND fewer completed orders than the policy window
/// AND a positive fee (there is nothing to discount on free delivery).
///
/// ## Example
/// ```rust
/// use lulocart_core::discount::{evaluate_discount, DiscountPolicy};
/// use lulocart_core::money::Money;
///
/// let d = evaluate_discount(Money::from_cents(1000), 1, true, &DiscountPolicy::default());
/// assert!(d.is_eligible);
/// assert_eq!(d.discount_amount_cents, 200);   // 20% of $10.00
/// assert_eq!(d.discounted_fee_cents, 800);
/// assert_eq!(d.orders_remaining, 2);
/// ```
pub fn evaluate_discount(
    delivery_fee: Money,
    completed_order_count: u32,
    is_logged_in: bool,
    policy: &DiscountPolicy,
) -> DeliveryFeeDiscount {
    let is_eligible = is_logged_in
        && completed_order_count < policy.eligible_order_count
        && delivery_fee.is_positive();

    let orders_remaining = policy
        .eligible_order_count
        .saturating_sub(completed_order_count);

    if !is_eligible {
        return DeliveryFeeDiscount {
            original_fee_cents: delivery_fee.cents(),
            discounted_fee_cents: delivery_fee.cents(),
            discount_amount_cents: 0,
            is_eligible: false,
            orders_remaining,
            rate_bps: policy.rate_bps,
        };
    }

    let discount_amount = delivery_fee.apply_rate(policy.rate());
    let discounted_fee = delivery_fee - discount_amount;

    DeliveryFeeDiscount {
        original_fee_cents: delivery_fee.cents(),
        discounted_fee_cents: discounted_fee.cents(),
        discount_amount_cents: discount_amount.cents(),
        is_eligible: true,
        orders_remaining,
        rate_bps: policy.rate_bps,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
