//! # Delivery Fee Module
//!
//! Distance-tiered delivery fee pricing and the service-area gate.
//!
//! ## Fee Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Tiered Delivery Pricing                              │
//! │                                                                         │
//! │  fee                                                                    │
//! │   │                                          ┌── maxFee cap            │
//! │   │                               ╱──────────                           │
//! │   │                    ╱─────────╱   $0.75/km beyond 10 km             │
//! │   │          ╱────────╱  $0.50/km from 3-10 km                         │
//! │   ├─────────╱           first 3 km free (rate 0)                       │
//! │   │  baseFee                                                            │
//! │   └──┬──────┬──────────┬─────────────────────► distance (km)           │
//! │      0      3         10                                                │
//! │                                                                         │
//! │  totalFee = clamp(baseFee + Σ per-tier charges, minFee, maxFee)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator returns a full audit trail ([`FeeBreakdown`]), never a
//! bare number: the UI shows the per-tier charges and support needs to see
//! how a disputed fee was derived.
//!
//! The range gate ([`check_delivery_range`]) is independent of the fee and
//! runs first in the caller's flow: a too-far address blocks checkout even
//! though a fee number could technically be computed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_price_cents, validate_rate_bps};

/// Service-area fallback when the config store has no value.
pub const DEFAULT_MAX_DELIVERY_DISTANCE_KM: f64 = 25.0;

// =============================================================================
// Configuration
// =============================================================================

/// A contiguous kilometer band with its own per-kilometer rate.
///
/// Half-open interval `[from_km, to_km)`; `None` for `to_km` means the band
/// is unbounded. Bands in a config must be contiguous and non-overlapping
/// when sorted by `from_km`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DistanceTier {
    pub from_km: f64,
    /// Upper bound (exclusive). `None` = unbounded.
    pub to_km: Option<f64>,
    /// Rate in cents per kilometer.
    pub rate_per_km_cents: i64,
}

impl DistanceTier {
    #[inline]
    pub fn rate_per_km(&self) -> Money {
        Money::from_cents(self.rate_per_km_cents)
    }
}

/// Admin-editable delivery fee configuration.
///
/// Fetched once per checkout session from the configuration store; a fresh
/// value always overwrites the previous snapshot wholesale, never merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFeeConfig {
    /// When disabled, tiered pricing is off and only the base fee applies.
    pub enabled: bool,
    pub base_fee_cents: i64,
    pub min_fee_cents: i64,
    pub max_fee_cents: i64,
    pub tiers: Vec<DistanceTier>,
    pub max_delivery_distance_km: f64,
    /// New-customer discount rate in basis points (2000 = 20%).
    pub discount_rate_bps: u32,
    /// Number of completed orders below which the discount applies.
    pub discount_eligible_order_count: u32,
}

impl DeliveryFeeConfig {
    #[inline]
    pub fn base_fee(&self) -> Money {
        Money::from_cents(self.base_fee_cents)
    }

    #[inline]
    pub fn min_fee(&self) -> Money {
        Money::from_cents(self.min_fee_cents)
    }

    #[inline]
    pub fn max_fee(&self) -> Money {
        Money::from_cents(self.max_fee_cents)
    }

    /// Checks the invariants an admin-supplied config must satisfy.
    ///
    /// Tier gaps are NOT rejected here: a gap under-charges for the gap
    /// distance, which is a configuration responsibility. The calculator
    /// stays total either way.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_price_cents("baseFee", self.base_fee_cents)?;
        validate_price_cents("minFee", self.min_fee_cents)?;
        validate_price_cents("maxFee", self.max_fee_cents)?;
        validate_rate_bps("discountPercentage", self.discount_rate_bps)?;

        if self.min_fee_cents > self.max_fee_cents {
            return Err(ValidationError::OutOfRange {
                field: "minFee".to_string(),
                min: 0,
                max: self.max_fee_cents,
            });
        }

        if self.max_delivery_distance_km < 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "maxDeliveryDistanceKm".to_string(),
            });
        }

        for tier in &self.tiers {
            validate_price_cents("ratePerKm", tier.rate_per_km_cents)?;
            if tier.from_km < 0.0 {
                return Err(ValidationError::MustBePositive {
                    field: "tier.fromKm".to_string(),
                });
            }
            if let Some(to) = tier.to_km {
                if to <= tier.from_km {
                    return Err(ValidationError::InvalidFormat {
                        field: "tier.toKm".to_string(),
                        reason: "must be greater than fromKm".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Platform fallback used when the configuration store is unreachable or
/// has no delivery settings yet. Checkout stays available on defaults.
impl Default for DeliveryFeeConfig {
    fn default() -> Self {
        DeliveryFeeConfig {
            enabled: true,
            base_fee_cents: Money::from_major_minor(2, 0).cents(),
            min_fee_cents: Money::from_major_minor(2, 0).cents(),
            max_fee_cents: Money::from_major_minor(25, 0).cents(),
            tiers: vec![
                DistanceTier {
                    from_km: 0.0,
                    to_km: Some(3.0),
                    rate_per_km_cents: 0,
                },
                DistanceTier {
                    from_km: 3.0,
                    to_km: Some(10.0),
                    rate_per_km_cents: 50,
                },
                DistanceTier {
                    from_km: 10.0,
                    to_km: None,
                    rate_per_km_cents: 75,
                },
            ],
            max_delivery_distance_km: DEFAULT_MAX_DELIVERY_DISTANCE_KM,
            discount_rate_bps: crate::discount::DEFAULT_DISCOUNT_RATE_BPS,
            discount_eligible_order_count: crate::discount::DEFAULT_DISCOUNT_ELIGIBLE_ORDER_COUNT,
        }
    }
}

// =============================================================================
// Fee Breakdown
// =============================================================================

/// Which bound clamped the raw fee, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FeeCap {
    Min,
    Max,
}

/// The portion of one tier that a given distance actually crossed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TierSpan {
    /// Start of the tier band.
    pub from_km: f64,
    /// End of the charged span (tier bound or the distance itself).
    pub to_km: f64,
    /// Kilometers charged within this tier.
    pub km_in_tier: f64,
    pub rate_per_km_cents: i64,
    /// Charge for this span, rounded to the cent.
    pub amount_cents: i64,
}

/// Full audit trail of a delivery fee calculation.
///
/// Invariant: `amount_cents` over `tier_breakdown` sums exactly to
/// `distance_fee_cents`, and `total_fee_cents` is `base + distance`
/// clamped to `[min_fee, max_fee]` with the clamp recorded in `capped_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub total_fee_cents: i64,
    pub base_fee_cents: i64,
    pub distance_fee_cents: i64,
    pub distance_km: f64,
    pub tier_breakdown: Vec<TierSpan>,
    pub capped_at: Option<FeeCap>,
}

impl FeeBreakdown {
    #[inline]
    pub fn total_fee(&self) -> Money {
        Money::from_cents(self.total_fee_cents)
    }

    #[inline]
    pub fn distance_fee(&self) -> Money {
        Money::from_cents(self.distance_fee_cents)
    }
}

// =============================================================================
// Fee Calculation
// =============================================================================

/// Calculates the delivery fee for a distance under a tier configuration.
///
/// ## Algorithm
/// Sort tiers by `from_km`; for each tier the distance has entered,
/// charge `(min(to_km, distance) − from_km) × rate_per_km` and record the
/// span. Clamp `base + distance` to `[min_fee, max_fee]`.
///
/// ## Degradation Policy
/// Never panics and never errors for in-range or out-of-range input:
/// a negative distance is treated as 0, and tier gaps simply contribute
/// nothing for the gap kilometers.
///
/// ## Example
/// ```rust
/// use lulocart_core::delivery::{calculate_delivery_fee, DeliveryFeeConfig};
///
/// // Default config: first 3 km free, $0.50/km to 10 km, base $2.00
/// let breakdown = calculate_delivery_fee(5.0, &DeliveryFeeConfig::default());
/// assert_eq!(breakdown.distance_fee_cents, 100); // 2 km × $0.50
/// assert_eq!(breakdown.total_fee_cents, 300);    // base $2.00 + $1.00
/// ```
pub fn calculate_delivery_fee(distance_km: f64, config: &DeliveryFeeConfig) -> FeeBreakdown {
    let distance = if distance_km.is_finite() {
        distance_km.max(0.0)
    } else {
        0.0
    };

    let mut tier_breakdown = Vec::new();
    let mut distance_fee = Money::zero();

    if config.enabled {
        let mut tiers = config.tiers.clone();
        tiers.sort_by(|a, b| a.from_km.total_cmp(&b.from_km));

        for tier in &tiers {
            if tier.from_km >= distance {
                continue;
            }

            let charged_to = match tier.to_km {
                Some(to) => to.min(distance),
                None => distance,
            };
            let km_in_tier = charged_to - tier.from_km;
            if km_in_tier <= 0.0 {
                continue;
            }

            // Round each span to the cent so the spans sum exactly to the
            // distance fee shown next to them.
            let amount = tier.rate_per_km().scale(km_in_tier);
            distance_fee += amount;
            tier_breakdown.push(TierSpan {
                from_km: tier.from_km,
                to_km: charged_to,
                km_in_tier,
                rate_per_km_cents: tier.rate_per_km_cents,
                amount_cents: amount.cents(),
            });
        }
    }

    let raw_total = config.base_fee() + distance_fee;
    let (total, capped_at) = if raw_total < config.min_fee() {
        (config.min_fee(), Some(FeeCap::Min))
    } else if raw_total > config.max_fee() {
        (config.max_fee(), Some(FeeCap::Max))
    } else {
        (raw_total, None)
    };

    FeeBreakdown {
        total_fee_cents: total.cents(),
        base_fee_cents: config.base_fee_cents,
        distance_fee_cents: distance_fee.cents(),
        distance_km: distance,
        tier_breakdown,
        capped_at,
    }
}

// =============================================================================
// Range Gate
// =============================================================================

/// Result of the service-area check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RangeCheck {
    pub is_supported: bool,
    pub distance_km: f64,
    pub max_distance_km: f64,
    /// Human-readable reason when unsupported, `None` otherwise.
    pub reason: Option<String>,
}

/// Checks whether a delivery distance is within the service area.
///
/// `max_distance_km = None` falls back to
/// [`DEFAULT_MAX_DELIVERY_DISTANCE_KM`]. This check precedes fee
/// calculation in the caller's flow and blocks checkout on its own.
pub fn check_delivery_range(distance_km: f64, max_distance_km: Option<f64>) -> RangeCheck {
    let max = max_distance_km.unwrap_or(DEFAULT_MAX_DELIVERY_DISTANCE_KM);
    let is_supported = distance_km <= max;

    RangeCheck {
        is_supported,
        distance_km,
        max_distance_km: max,
        reason: if is_supported {
            None
        } else {
            Some(format!(
                "Delivery distance {distance_km:.1} km exceeds the {max:.0} km service area"
            ))
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeliveryFeeConfig {
        DeliveryFeeConfig::default()
    }

    #[test]
    fn test_worked_example_five_km() {
        // 5 km: 3 km free, 2 km at $0.50 = $1.00, plus base $2.00 = $3.00
        let result = calculate_delivery_fee(5.0, &config());

        assert_eq!(result.distance_fee_cents, 100);
        assert_eq!(result.total_fee_cents, 300);
        assert_eq!(result.capped_at, None);

        // Free tier is still recorded: it covered kilometers
        assert_eq!(result.tier_breakdown.len(), 2);
        assert_eq!(result.tier_breakdown[0].amount_cents, 0);
        assert_eq!(result.tier_breakdown[0].km_in_tier, 3.0);
        assert_eq!(result.tier_breakdown[1].amount_cents, 100);
        assert_eq!(result.tier_breakdown[1].km_in_tier, 2.0);
    }

    #[test]
    fn test_unbounded_tier() {
        // 12 km: 3 free + 7 × $0.50 + 2 × $0.75 = $3.50 + $1.50 = $5.00
        let result = calculate_delivery_fee(12.0, &config());

        assert_eq!(result.distance_fee_cents, 500);
        assert_eq!(result.total_fee_cents, 700);
        assert_eq!(result.tier_breakdown.len(), 3);
        assert_eq!(result.tier_breakdown[2].km_in_tier, 2.0);
        assert_eq!(result.tier_breakdown[2].amount_cents, 150);
    }

    #[test]
    fn test_zero_distance_hits_min() {
        let result = calculate_delivery_fee(0.0, &config());

        // Base $2.00, no distance fee; min is also $2.00, no clamp fires
        assert_eq!(result.total_fee_cents, 200);
        assert_eq!(result.capped_at, None);
        assert!(result.tier_breakdown.is_empty());
    }

    #[test]
    fn test_min_clamp() {
        let mut cfg = config();
        cfg.base_fee_cents = 0;
        cfg.min_fee_cents = 150;

        let result = calculate_delivery_fee(1.0, &cfg); // inside free tier
        assert_eq!(result.total_fee_cents, 150);
        assert_eq!(result.capped_at, Some(FeeCap::Min));
    }

    #[test]
    fn test_max_clamp() {
        // 100 km: 3 free + 7 × $0.50 + 90 × $0.75 = $71.00 + base, way past max
        let result = calculate_delivery_fee(100.0, &config());
        assert_eq!(result.total_fee_cents, 2500);
        assert_eq!(result.capped_at, Some(FeeCap::Max));
    }

    #[test]
    fn test_negative_distance_treated_as_zero() {
        let result = calculate_delivery_fee(-4.0, &config());
        assert_eq!(result.distance_km, 0.0);
        assert_eq!(result.total_fee_cents, 200);
    }

    #[test]
    fn test_disabled_config_charges_base_only() {
        let mut cfg = config();
        cfg.enabled = false;

        let result = calculate_delivery_fee(12.0, &cfg);
        assert_eq!(result.distance_fee_cents, 0);
        assert_eq!(result.total_fee_cents, 200);
        assert!(result.tier_breakdown.is_empty());
    }

    #[test]
    fn test_unsorted_tiers_are_sorted_first() {
        let mut cfg = config();
        cfg.tiers.reverse();

        let sorted = calculate_delivery_fee(12.0, &config());
        let unsorted = calculate_delivery_fee(12.0, &cfg);
        assert_eq!(sorted.total_fee_cents, unsorted.total_fee_cents);
        assert_eq!(sorted.tier_breakdown, unsorted.tier_breakdown);
    }

    #[test]
    fn test_tier_gap_under_charges() {
        // Gap between 3 and 5 km contributes nothing
        let cfg = DeliveryFeeConfig {
            tiers: vec![
                DistanceTier {
                    from_km: 0.0,
                    to_km: Some(3.0),
                    rate_per_km_cents: 100,
                },
                DistanceTier {
                    from_km: 5.0,
                    to_km: None,
                    rate_per_km_cents: 100,
                },
            ],
            ..config()
        };

        let result = calculate_delivery_fee(6.0, &cfg);
        // 3 km × $1.00 + 1 km × $1.00 = $4.00; the 3-5 km gap is free
        assert_eq!(result.distance_fee_cents, 400);
    }

    #[test]
    fn test_fee_monotonicity() {
        let cfg = config();
        let distances = [0.0, 0.5, 1.0, 2.9, 3.0, 3.1, 5.0, 9.9, 10.0, 15.0, 40.0, 80.0];

        let mut last = -1i64;
        for d in distances {
            let fee = calculate_delivery_fee(d, &cfg).total_fee_cents;
            assert!(fee >= last, "fee decreased at {d} km: {fee} < {last}");
            last = fee;
        }
    }

    #[test]
    fn test_fee_always_within_clamp_bounds() {
        let cfg = config();
        for d in [0.0, 0.1, 2.0, 7.5, 19.0, 50.0, 500.0] {
            let fee = calculate_delivery_fee(d, &cfg).total_fee_cents;
            assert!(fee >= cfg.min_fee_cents && fee <= cfg.max_fee_cents);
        }
    }

    #[test]
    fn test_spans_sum_to_distance_fee() {
        for d in [3.5, 7.25, 10.0, 13.37, 24.9] {
            let result = calculate_delivery_fee(d, &config());
            let span_sum: i64 = result.tier_breakdown.iter().map(|s| s.amount_cents).sum();
            assert_eq!(span_sum, result.distance_fee_cents, "at {d} km");
        }
    }

    #[test]
    fn test_range_gate() {
        let ok = check_delivery_range(10.0, Some(25.0));
        assert!(ok.is_supported);
        assert!(ok.reason.is_none());

        let too_far = check_delivery_range(30.0, Some(25.0));
        assert!(!too_far.is_supported);
        assert!(too_far.reason.as_deref().unwrap().contains("30.0 km"));

        // Boundary is inclusive
        assert!(check_delivery_range(25.0, Some(25.0)).is_supported);
    }

    #[test]
    fn test_range_gate_fallback_max() {
        let check = check_delivery_range(20.0, None);
        assert_eq!(check.max_distance_km, DEFAULT_MAX_DELIVERY_DISTANCE_KM);
        assert!(check.is_supported);

        assert!(!check_delivery_range(26.0, None).is_supported);
    }

    #[test]
    fn test_config_validate() {
        assert!(config().validate().is_ok());

        let mut bad = config();
        bad.min_fee_cents = 5000;
        bad.max_fee_cents = 2000;
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.base_fee_cents = -1;
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.tiers[0].to_km = Some(0.0);
        assert!(bad.validate().is_err());
    }
}
