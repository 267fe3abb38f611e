//! # lulocart-core: Pure Checkout Logic for Lulocart
//!
//! This crate is the **heart** of the Lulocart checkout engine. It contains
//! all pricing and cart logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Lulocart Checkout Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront Client                            │   │
//! │  │    Cart UI ──► Address UI ──► Review UI ──► Payment UI         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              lulocart-checkout (Async Orchestration)            │   │
//! │  │    sessions, provider seams, order submission, payment watch   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lulocart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐ │   │
//! │  │   │  money   │ │ delivery │ │   tax    │ │     summary      │ │   │
//! │  │   │  Money   │ │  tiers   │ │ GST/PST  │ │  CartSummary     │ │   │
//! │  │   │  Rate    │ │  range   │ │   HST    │ │  revenue split   │ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘ │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐ │   │
//! │  │   │ distance │ │ discount │ │   cart   │ │    validation    │ │   │
//! │  │   │haversine │ │ new-user │ │ reducer  │ │      rules       │ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money and Rate types stored in integer cents
//! - [`types`] - Domain types (ProductSnapshot, CartItem, Order, etc.)
//! - [`distance`] - Haversine great-circle distance between coordinates
//! - [`delivery`] - Distance-tiered delivery fee calculation and range checks
//! - [`discount`] - New-customer delivery fee discount
//! - [`tax`] - Canadian per-province GST/PST/HST breakdown
//! - [`summary`] - Cart summary composition and revenue split
//! - [`cart`] - Reducer-pattern cart state transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lulocart_core::money::{Money, Rate};
//! use lulocart_core::tax::tax_breakdown;
//!
//! // Create money from cents (never from floats!)
//! let subtotal = Money::from_cents(10_000); // $100.00
//!
//! // Ontario: 5% GST + 13% HST
//! let tax = tax_breakdown(subtotal, Some("ON"));
//!
//! assert_eq!(tax.gst_cents, 500);
//! assert_eq!(tax.hst_cents, 1300);
//! assert_eq!(tax.total_cents, 1800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod delivery;
pub mod discount;
pub mod distance;
pub mod error;
pub mod money;
pub mod summary;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lulocart_core::Money` instead of
// `use lulocart_core::money::Money`

pub use cart::{reduce, revalidate_items, CartAction, CartState, RefreshOutcome};
pub use delivery::{calculate_delivery_fee, check_delivery_range, DeliveryFeeConfig, FeeBreakdown};
pub use discount::{evaluate_discount, DeliveryFeeDiscount, DiscountPolicy};
pub use distance::{haversine_km, Coordinate};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use summary::{summarize, CartSummary, Loadable, PricingDefaults, PricingInputs};
pub use tax::{tax_breakdown, Province, TaxBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct items allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable order sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// Configurable per-store in future versions.
pub const MAX_ITEM_QUANTITY: i64 = 999;
