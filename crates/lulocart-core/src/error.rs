//! # Error Types
//!
//! Domain-specific error types for lulocart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lulocart-core errors (this file)                                      │
//! │  ├── CoreError        - Cart and pricing rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lulocart-checkout errors (separate crate)                             │
//! │  └── CheckoutError    - Provider failures, payment errors              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → Frontend          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, store id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent cart or pricing rule violations. They should be
/// caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product is missing from the catalog or has been deactivated.
    ///
    /// ## When This Occurs
    /// - Adding a product that was deactivated between browse and add
    /// - Cart refresh finds a stored item whose product no longer exists
    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    /// Cart already holds items from a different store.
    ///
    /// A cart belongs to exactly one store at a time; mixing stores would
    /// make the commission split and delivery fee ambiguous.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: 3 items from "store-a"
    ///      │
    ///      ▼
    /// Add item from "store-b"
    ///      │
    ///      ▼
    /// StoreMismatch { cart_store: "store-a", product_store: "store-b" }
    ///      │
    ///      ▼
    /// UI prompts: "Start a new cart with this store?"
    /// ```
    #[error("Cart belongs to store {cart_store}, cannot add item from store {product_store}")]
    StoreMismatch {
        cart_store: String,
        product_store: String,
    },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Operation references a product that is not in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Operation requires a non-empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed postal code, out-of-range latitude).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
