//! # Validation Module
//!
//! Input validation utilities for the checkout flow.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout session (Rust)                                      │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Server-side rules (webhook, admin)                           │
//! │  └── Final authority on order acceptance                               │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lulocart_core::validation::{validate_quantity, validate_price_cents};
//!
//! // Validate quantity before a cart operation
//! validate_quantity(5).unwrap();
//!
//! // Validate a config-supplied fee
//! validate_price_cents("baseFee", 200).unwrap();
//! ```

use crate::distance::Coordinate;
use crate::error::ValidationError;
use crate::types::DeliveryAddress;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free delivery tiers, zero base fee)
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
/// - Tax and commission rates are normally 0-2500 (0% to 25%)
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Address Validators
// =============================================================================

/// Validates the fields of a delivery address that must be present before
/// geocoding. Missing fields block checkout; they are never silently
/// defaulted.
///
/// The coordinate is NOT required here: it is the geocoder's output, not
/// the user's input.
pub fn validate_address(address: &DeliveryAddress) -> ValidationResult<()> {
    validate_required("street", &address.street)?;
    validate_required("city", &address.city)?;
    validate_required("postal code", &address.postal_code)?;

    if address.street.trim().len() > 200 {
        return Err(ValidationError::TooLong {
            field: "street".to_string(),
            max: 200,
        });
    }

    // Canadian postal codes are 6 alphanumerics plus an optional space
    if address.postal_code.trim().len() > 7 {
        return Err(ValidationError::TooLong {
            field: "postal code".to_string(),
            max: 7,
        });
    }

    Ok(())
}

/// Validates a geocoded coordinate is on the globe.
///
/// Geocoders occasionally return junk for ambiguous addresses; an
/// out-of-range coordinate would otherwise flow into distance math and
/// produce a nonsense fee.
pub fn validate_coordinate(coordinate: Coordinate) -> ValidationResult<()> {
    if !(-90.0..=90.0).contains(&coordinate.lat) {
        return Err(ValidationError::InvalidFormat {
            field: "latitude".to_string(),
            reason: "must be between -90 and 90".to_string(),
        });
    }

    if !(-180.0..=180.0).contains(&coordinate.lng) {
        return Err(ValidationError::InvalidFormat {
            field: "longitude".to_string(),
            reason: "must be between -180 and 180".to_string(),
        });
    }

    Ok(())
}

fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
