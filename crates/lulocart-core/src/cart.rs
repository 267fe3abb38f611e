//! # Cart Module
//!
//! Reducer-pattern cart state: a pure `(state, action) → state` transition
//! function plus the cart-as-cache revalidation helper.
//!
//! ## State Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cart State Transitions                              │
//! │                                                                         │
//! │  CartState ──┬── AddItem ────────────► merge qty / push line           │
//! │   (old)      ├── UpdateQuantity ─────► set qty (0 removes)             │
//! │              ├── RemoveItem ─────────► drop line                        │
//! │              ├── Clear ──────────────► initial state                    │
//! │              ├── Set*/ClearDeliveryFee► pricing overrides               │
//! │              └── ApplyRefresh ───────► revalidated items                │
//! │                        │                                                │
//! │                        ▼                                                │
//! │              CoreResult<CartState>  (new state, or Err + old intact)   │
//! │                                                                         │
//! │  Persistence is a boundary adapter in the checkout crate; it is        │
//! │  NEVER interleaved with these transitions.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single-Store Invariant
//! A cart holds items from exactly one store. Adding a product from another
//! store is rejected with [`CoreError::StoreMismatch`]; the caller decides
//! whether to prompt for a fresh cart. Removing the last item resets the
//! store affiliation and all pricing overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::discount::DeliveryFeeDiscount;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::summary::{Loadable, PricingInputs};
use crate::types::{CartItem, ProductSnapshot};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart State
// =============================================================================

/// The cart plus the pricing overrides accumulated during checkout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartState {
    /// Store the cart belongs to; `None` while empty.
    pub store_id: Option<String>,
    pub items: Vec<CartItem>,
    pub pricing: PricingInputs,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Every way the cart can change. Dispatched through [`reduce`].
#[derive(Debug, Clone)]
pub enum CartAction {
    AddItem {
        product: ProductSnapshot,
        quantity: i64,
    },
    /// Quantity 0 removes the line.
    UpdateQuantity {
        product_id: String,
        quantity: i64,
    },
    RemoveItem {
        product_id: String,
    },
    Clear,
    SetDeliveryFee(Money),
    /// Address changed; the fee (and its discount) are no longer valid.
    ClearDeliveryFee,
    SetPlatformFee(Money),
    SetCommissionRate(Rate),
    SetDiscount(Option<DeliveryFeeDiscount>),
    ApplyRefresh(RefreshOutcome),
}

// =============================================================================
// Reducer
// =============================================================================

/// Pure transition function. Returns the next state, or an error with the
/// caller's state untouched. Never performs I/O.
pub fn reduce(state: &CartState, action: CartAction) -> CoreResult<CartState> {
    let mut next = state.clone();

    match action {
        CartAction::AddItem { product, quantity } => {
            validate_quantity(quantity)?;

            if !product.is_active {
                return Err(CoreError::ProductUnavailable(product.id));
            }

            if let Some(cart_store) = &next.store_id {
                if *cart_store != product.store_id {
                    return Err(CoreError::StoreMismatch {
                        cart_store: cart_store.clone(),
                        product_store: product.store_id,
                    });
                }
            }

            if let Some(existing) = next.items.iter_mut().find(|i| i.product_id == product.id) {
                let merged = existing.quantity + quantity;
                if merged > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: merged,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                existing.quantity = merged;
            } else {
                if next.items.len() >= MAX_CART_ITEMS {
                    return Err(CoreError::CartTooLarge {
                        max: MAX_CART_ITEMS,
                    });
                }
                next.store_id = Some(product.store_id.clone());
                next.items.push(CartItem::from_product(product, quantity));
            }
        }

        CartAction::UpdateQuantity {
            product_id,
            quantity,
        } => {
            if quantity == 0 {
                return reduce(state, CartAction::RemoveItem { product_id });
            }
            validate_quantity(quantity)?;

            let item = next
                .items
                .iter_mut()
                .find(|i| i.product_id == product_id)
                .ok_or(CoreError::ItemNotInCart(product_id))?;
            item.quantity = quantity;
        }

        CartAction::RemoveItem { product_id } => {
            let before = next.items.len();
            next.items.retain(|i| i.product_id != product_id);
            if next.items.len() == before {
                return Err(CoreError::ItemNotInCart(product_id));
            }
            reset_if_empty(&mut next);
        }

        CartAction::Clear => {
            next = CartState::new();
        }

        CartAction::SetDeliveryFee(fee) => {
            next.pricing.delivery_fee = Loadable::Loaded(fee);
        }

        CartAction::ClearDeliveryFee => {
            next.pricing.delivery_fee = Loadable::Pending;
            // The discount was computed from the cleared fee; it is stale too
            next.pricing.discount = None;
        }

        CartAction::SetPlatformFee(fee) => {
            next.pricing.platform_fee = Loadable::Loaded(fee);
        }

        CartAction::SetCommissionRate(rate) => {
            next.pricing.commission_rate = Loadable::Loaded(rate);
        }

        CartAction::SetDiscount(discount) => {
            next.pricing.discount = discount;
        }

        CartAction::ApplyRefresh(outcome) => {
            if outcome.reset {
                next = CartState::new();
            } else {
                next.items = outcome.items;
            }
        }
    }

    Ok(next)
}

fn reset_if_empty(state: &mut CartState) {
    if state.items.is_empty() {
        *state = CartState::new();
    }
}

// =============================================================================
// Cart Refresh
// =============================================================================

/// Why an item was dropped during revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RemovedReason {
    NotFound,
    Inactive,
}

/// An item dropped during revalidation, reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RemovedItem {
    pub product_id: String,
    pub name: String,
    pub reason: RemovedReason,
}

/// The result of revalidating a restored cart against the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    /// Surviving items with fresh snapshots and re-synced prices.
    pub items: Vec<CartItem>,
    /// Dropped items the caller must surface, never swallow.
    pub removed: Vec<RemovedItem>,
    /// True when every item was dropped; the cart resets entirely.
    pub reset: bool,
}

/// Revalidates restored cart items against live catalog lookups.
///
/// A restored cart is a cache: products may have been deactivated, deleted,
/// or repriced since the previous session. Missing or inactive products are
/// dropped and reported; survivors get a fresh snapshot and their
/// `price_at_time` re-synced to the live price.
pub fn revalidate_items(
    items: &[CartItem],
    live: &HashMap<String, ProductSnapshot>,
) -> RefreshOutcome {
    let mut kept = Vec::new();
    let mut removed = Vec::new();

    for item in items {
        match live.get(&item.product_id) {
            None => removed.push(RemovedItem {
                product_id: item.product_id.clone(),
                name: item.product.name.clone(),
                reason: RemovedReason::NotFound,
            }),
            Some(product) if !product.is_active => removed.push(RemovedItem {
                product_id: item.product_id.clone(),
                name: product.name.clone(),
                reason: RemovedReason::Inactive,
            }),
            Some(product) => {
                kept.push(CartItem {
                    product_id: item.product_id.clone(),
                    product: product.clone(),
                    quantity: item.quantity,
                    price_at_time_cents: product.price_cents,
                });
            }
        }
    }

    let reset = kept.is_empty() && !removed.is_empty();
    RefreshOutcome {
        items: kept,
        removed,
        reset,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
