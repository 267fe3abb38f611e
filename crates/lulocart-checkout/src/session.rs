//! # Checkout Session
//!
//! Stateful orchestration of one customer's checkout. The session owns the
//! cart, drives every mutation through the pure reducer, and persists the
//! result after each successful transition.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           CheckoutSession                               │
//! │                                                                         │
//! │  add_item / update_quantity / remove_item / clear                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │    reduce ──► save ──► epoch += 1 ──► summary                           │
//! │                                                                         │
//! │  confirm_address                                                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │    validate ─► geocode ─► distance ─► range gate ─► fee ─► discount     │
//! │                                          │                              │
//! │                            too far ──► DeliveryNotSupported             │
//! │                                        (cart pricing untouched)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Superseded Resolutions
//!
//! Geocoding is slow relative to cart edits. A resolution that started
//! against one cart can land after the customer has kept shopping, and its
//! fee/discount would then be priced against stale state. Every mutation
//! bumps an epoch counter; [`resolve_address`] runs the slow half without
//! touching the session, and [`CheckoutSession::install_address`] only
//! installs the result if the epoch it was resolved against is still
//! current. [`CheckoutSession::confirm_address`] composes the two for the
//! common sequential case.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lulocart_core::cart::{reduce, revalidate_items, CartAction, CartState, RemovedItem};
use lulocart_core::delivery::{
    calculate_delivery_fee, check_delivery_range, DeliveryFeeConfig, FeeBreakdown,
};
use lulocart_core::discount::{evaluate_discount, DeliveryFeeDiscount, DiscountPolicy};
use lulocart_core::distance::{haversine_km, Coordinate};
use lulocart_core::error::CoreError;
use lulocart_core::summary::{summarize, CartSummary, PricingDefaults};
use lulocart_core::types::DeliveryAddress;
use lulocart_core::validation::{validate_address, validate_coordinate};

use crate::config::{load_pricing_configs, PricingConfigs};
use crate::error::{CheckoutError, CheckoutResult};
use crate::providers::{CartStore, ConfigSource, Geocoder, ProductCatalog};

// =============================================================================
// Customer Profile
// =============================================================================

/// Who is checking out. Drives discount eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub customer_id: String,
    pub is_logged_in: bool,
    /// Lifetime completed orders, from the account record.
    pub completed_order_count: u32,
}

impl CustomerProfile {
    pub fn logged_in(customer_id: impl Into<String>, completed_order_count: u32) -> Self {
        CustomerProfile {
            customer_id: customer_id.into(),
            is_logged_in: true,
            completed_order_count,
        }
    }

    /// Guests can order but never qualify for the new-customer discount.
    pub fn guest(customer_id: impl Into<String>) -> Self {
        CustomerProfile {
            customer_id: customer_id.into(),
            is_logged_in: false,
            completed_order_count: 0,
        }
    }
}

// =============================================================================
// Address Resolution
// =============================================================================

/// A geocoded, range-checked, fee-priced address that has not yet been
/// installed into a session.
#[derive(Debug, Clone)]
pub struct ResolvedAddress {
    /// The input address with its coordinate filled in.
    pub address: DeliveryAddress,
    pub distance_km: f64,
    pub fee: FeeBreakdown,
}

/// The result of installing a resolved address: everything the checkout
/// screen needs to re-render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressConfirmation {
    pub address: DeliveryAddress,
    pub distance_km: f64,
    pub fee: FeeBreakdown,
    pub discount: DeliveryFeeDiscount,
    pub summary: CartSummary,
}

/// Runs the slow half of address confirmation without touching any session
/// state: validate, geocode, range-check, price.
///
/// Fails with [`CheckoutError::DeliveryNotSupported`] when the address sits
/// outside the service area; the caller's cart is untouched in every error
/// case.
pub async fn resolve_address(
    geocoder: &dyn Geocoder,
    config: &DeliveryFeeConfig,
    address: DeliveryAddress,
    store_location: Coordinate,
) -> CheckoutResult<ResolvedAddress> {
    validate_address(&address).map_err(CoreError::from)?;

    let coordinate = geocoder.geocode(&address).await?;
    validate_coordinate(coordinate).map_err(CoreError::from)?;

    let distance_km = haversine_km(store_location, coordinate);
    let range = check_delivery_range(distance_km, Some(config.max_delivery_distance_km));
    if !range.is_supported {
        return Err(CheckoutError::DeliveryNotSupported {
            distance_km: range.distance_km,
            max_km: range.max_distance_km,
        });
    }

    let fee = calculate_delivery_fee(distance_km, config);

    Ok(ResolvedAddress {
        address: DeliveryAddress {
            coordinate: Some(coordinate),
            ..address
        },
        distance_km,
        fee,
    })
}

// =============================================================================
// Session
// =============================================================================

/// One customer's checkout session.
pub struct CheckoutSession {
    customer: CustomerProfile,
    configs: PricingConfigs,
    cart: CartState,
    address: Option<DeliveryAddress>,
    /// Bumped on every cart/address change; see the module doc.
    epoch: u64,
    geocoder: Arc<dyn Geocoder>,
    catalog: Arc<dyn ProductCatalog>,
    cart_store: Arc<dyn CartStore>,
}

impl CheckoutSession {
    /// Starts a session with an empty cart. Pricing configs are fetched
    /// once, up front; fetch failures fall back to defaults and never block
    /// the session (see [`load_pricing_configs`]).
    pub async fn start(
        customer: CustomerProfile,
        config_source: &dyn ConfigSource,
        geocoder: Arc<dyn Geocoder>,
        catalog: Arc<dyn ProductCatalog>,
        cart_store: Arc<dyn CartStore>,
    ) -> Self {
        let configs = load_pricing_configs(config_source).await;
        info!(customer_id = %customer.customer_id, "Checkout session started");

        CheckoutSession {
            customer,
            configs,
            cart: CartState::new(),
            address: None,
            epoch: 0,
            geocoder,
            catalog,
            cart_store,
        }
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    pub fn customer(&self) -> &CustomerProfile {
        &self.customer
    }

    pub fn configs(&self) -> &PricingConfigs {
        &self.configs
    }

    /// The confirmed delivery address, if any.
    pub fn address(&self) -> Option<&DeliveryAddress> {
        self.address.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The financial summary of the current cart.
    pub fn summary(&self) -> CartSummary {
        summarize(&self.cart.items, &self.cart.pricing, &self.pricing_defaults())
    }

    /// Fallback pricing derived from this session's config snapshot, used
    /// wherever the cart carries no explicit override.
    fn pricing_defaults(&self) -> PricingDefaults {
        PricingDefaults {
            platform_fee_cents: self.configs.platform.effective_fee().cents(),
            commission_rate_bps: self.configs.platform.commission_rate_bps,
        }
    }

    /// Runs one action through the reducer, persists the result, and bumps
    /// the epoch. The in-memory cart only advances when both succeed.
    async fn apply(&mut self, action: CartAction) -> CheckoutResult<CartSummary> {
        let next = reduce(&self.cart, action)?;
        self.cart_store.save(&next).await?;
        self.cart = next;
        self.epoch += 1;
        Ok(self.summary())
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Adds a product to the cart by id, snapshotting it from the live
    /// catalog. A deleted product surfaces as `ProductUnavailable`, same as
    /// a deactivated one.
    pub async fn add_item(&mut self, product_id: &str, quantity: i64) -> CheckoutResult<CartSummary> {
        let product = self
            .catalog
            .product_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductUnavailable(product_id.to_string()))?;

        self.apply(CartAction::AddItem { product, quantity }).await
    }

    pub async fn update_quantity(
        &mut self,
        product_id: &str,
        quantity: i64,
    ) -> CheckoutResult<CartSummary> {
        self.apply(CartAction::UpdateQuantity {
            product_id: product_id.to_string(),
            quantity,
        })
        .await
    }

    pub async fn remove_item(&mut self, product_id: &str) -> CheckoutResult<CartSummary> {
        self.apply(CartAction::RemoveItem {
            product_id: product_id.to_string(),
        })
        .await
    }

    pub async fn clear(&mut self) -> CheckoutResult<CartSummary> {
        let next = reduce(&self.cart, CartAction::Clear)?;
        self.cart_store.clear().await?;
        self.cart = next;
        self.epoch += 1;
        Ok(self.summary())
    }

    // =========================================================================
    // Cart Restore
    // =========================================================================

    /// Restores a persisted cart, revalidating every line against the live
    /// catalog. Returns the items that were dropped (deleted or deactivated
    /// since the cart was saved) so the UI can tell the customer.
    ///
    /// The persisted delivery fee belonged to the previous session's
    /// address, so it is cleared; the customer re-confirms the address.
    pub async fn resume(&mut self) -> CheckoutResult<Vec<RemovedItem>> {
        let Some(saved) = self.cart_store.load().await? else {
            return Ok(Vec::new());
        };
        if saved.is_empty() {
            return Ok(Vec::new());
        }

        let mut live = HashMap::new();
        for item in &saved.items {
            if let Some(product) = self.catalog.product_by_id(&item.product_id).await? {
                live.insert(product.id.clone(), product);
            }
        }

        let outcome = revalidate_items(&saved.items, &live);
        let removed = outcome.removed.clone();

        let mut cart = reduce(&saved, CartAction::ApplyRefresh(outcome))?;
        cart = reduce(&cart, CartAction::ClearDeliveryFee)?;
        self.cart_store.save(&cart).await?;
        self.cart = cart;
        self.epoch += 1;

        if !removed.is_empty() {
            info!(
                removed = removed.len(),
                "Dropped unavailable items while restoring cart"
            );
        }

        Ok(removed)
    }

    // =========================================================================
    // Address Confirmation
    // =========================================================================

    /// Resolves and installs a delivery address in one call.
    pub async fn confirm_address(
        &mut self,
        address: DeliveryAddress,
        store_location: Coordinate,
    ) -> CheckoutResult<AddressConfirmation> {
        let resolved = resolve_address(
            self.geocoder.as_ref(),
            &self.configs.delivery,
            address,
            store_location,
        )
        .await?;

        self.install(resolved).await
    }

    /// Installs a previously resolved address, unless the session has moved
    /// on since the resolution started. `as_of` is the value of
    /// [`epoch`](Self::epoch) when the caller ran [`resolve_address`];
    /// a superseded resolution is discarded and `Ok(None)` returned.
    pub async fn install_address(
        &mut self,
        resolved: ResolvedAddress,
        as_of: u64,
    ) -> CheckoutResult<Option<AddressConfirmation>> {
        if as_of != self.epoch {
            debug!(
                as_of,
                current = self.epoch,
                "Discarding superseded address resolution"
            );
            return Ok(None);
        }

        Ok(Some(self.install(resolved).await?))
    }

    async fn install(&mut self, resolved: ResolvedAddress) -> CheckoutResult<AddressConfirmation> {
        let policy = DiscountPolicy {
            rate_bps: self.configs.delivery.discount_rate_bps,
            eligible_order_count: self.configs.delivery.discount_eligible_order_count,
        };
        let discount = evaluate_discount(
            resolved.fee.total_fee(),
            self.customer.completed_order_count,
            self.customer.is_logged_in,
            &policy,
        );

        let mut cart = reduce(&self.cart, CartAction::SetDeliveryFee(resolved.fee.total_fee()))?;
        cart = reduce(&cart, CartAction::SetDiscount(Some(discount.clone())))?;
        self.cart_store.save(&cart).await?;
        self.cart = cart;
        self.address = Some(resolved.address.clone());
        self.epoch += 1;

        info!(
            customer_id = %self.customer.customer_id,
            distance_km = resolved.distance_km,
            fee_cents = resolved.fee.total_fee_cents,
            discount_eligible = discount.is_eligible,
            "Delivery address confirmed"
        );

        Ok(AddressConfirmation {
            address: resolved.address,
            distance_km: resolved.distance_km,
            fee: resolved.fee,
            discount,
            summary: self.summary(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
