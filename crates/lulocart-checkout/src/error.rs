//! # Checkout Error Types
//!
//! Error types for checkout orchestration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Validation    │  │    Provider     │  │     Internal            │ │
//! │  │ (user resolves) │  │ (retryable-ish) │  │                         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ DeliveryNot-    │  │ Geocoding       │  │ SubscriptionClosed      │ │
//! │  │   Supported     │  │ ProductLookup   │  │                         │ │
//! │  │ DeliveryFeeNot- │  │ ConfigFetch     │  │                         │ │
//! │  │   Calculated    │  │ OrderPersistence│  │                         │ │
//! │  │ MissingAddress  │  │ PaymentIntent   │  │                         │ │
//! │  │ EmptyCart       │  │                 │  │                         │ │
//! │  │ Core(..)        │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Validation errors block checkout until the user fixes the input.      │
//! │  Provider errors surface inline and the attempt may be retried.        │
//! │  Config errors additionally fall back to hardcoded defaults.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use lulocart_core::CoreError;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Checkout error type covering provider failures and flow rule violations.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Provider Errors
    // =========================================================================
    /// The geocoding collaborator could not resolve the address.
    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    /// The product catalog lookup failed (not "product missing" — that is
    /// [`CoreError::ProductUnavailable`]).
    #[error("Product lookup failed: {0}")]
    ProductLookup(String),

    /// The configuration store fetch failed. Callers fall back to the
    /// hardcoded defaults rather than blocking checkout.
    #[error("Config fetch failed: {0}")]
    ConfigFetch(String),

    /// The order store rejected a write.
    #[error("Order persistence failed: {0}")]
    OrderPersistence(String),

    /// The payment processor refused to create a payment intent.
    #[error("Payment intent creation failed: {0}")]
    PaymentIntent(String),

    // =========================================================================
    // Flow Validation Errors
    // =========================================================================
    /// The delivery address is outside the service area.
    #[error("Delivery distance {distance_km:.1} km exceeds the {max_km:.0} km service area")]
    DeliveryNotSupported { distance_km: f64, max_km: f64 },

    /// Order submission was attempted while the delivery fee is still
    /// pending. A pending fee renders as $0.00 in the summary but is not a
    /// real free delivery.
    #[error("Delivery fee has not been calculated yet")]
    DeliveryFeeNotCalculated,

    /// Order submission was attempted without a confirmed delivery address.
    #[error("Delivery address is missing or unconfirmed")]
    MissingAddress,

    /// Order submission was attempted on an empty cart.
    #[error("Cannot submit an order for an empty cart")]
    EmptyCart,

    /// Core cart or pricing rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// The payment status subscription ended before a terminal status.
    #[error("Payment status subscription closed before a terminal status")]
    SubscriptionClosed,
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CheckoutError {
    /// Returns true if this error blocks checkout until the user fixes
    /// their input (address, cart contents).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CheckoutError::DeliveryNotSupported { .. }
                | CheckoutError::DeliveryFeeNotCalculated
                | CheckoutError::MissingAddress
                | CheckoutError::EmptyCart
                | CheckoutError::Core(_)
        )
    }

    /// Returns true if this error came from a collaborator and the
    /// operation can be retried without changing the input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Geocoding(_)
                | CheckoutError::ProductLookup(_)
                | CheckoutError::ConfigFetch(_)
                | CheckoutError::OrderPersistence(_)
                | CheckoutError::PaymentIntent(_)
        )
    }

    /// Returns true if this error indicates a configuration problem; the
    /// caller falls back to hardcoded defaults instead of failing.
    pub fn is_config(&self) -> bool {
        matches!(self, CheckoutError::ConfigFetch(_))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
