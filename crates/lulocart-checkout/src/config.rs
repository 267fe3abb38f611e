//! # Pricing Configuration
//!
//! Admin-editable pricing settings, fetched once at session start through
//! [`ConfigSource`](crate::providers::ConfigSource).
//!
//! Checkout must never go down because the config store is unreachable or
//! holds a bad document. Each config loads independently; a fetch error or
//! an invalid delivery config falls back to compiled-in defaults with a
//! warning, and the session proceeds on those.

use serde::{Deserialize, Serialize};
use tracing::warn;

use lulocart_core::delivery::DeliveryFeeConfig;
use lulocart_core::money::{Money, Rate};

use crate::providers::ConfigSource;

// =============================================================================
// Platform Fee Config
// =============================================================================

/// Platform fee and commission settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFeeConfig {
    /// When disabled the buyer pays no platform fee; the commission rate
    /// still applies to the store split.
    pub enabled: bool,
    pub fixed_amount_cents: i64,
    pub commission_rate_bps: u32,
}

impl PlatformFeeConfig {
    pub fn fixed_amount(&self) -> Money {
        Money::from_cents(self.fixed_amount_cents)
    }

    pub fn commission_rate(&self) -> Rate {
        Rate::from_bps(self.commission_rate_bps)
    }

    /// The fee actually charged to the buyer: zero when disabled.
    pub fn effective_fee(&self) -> Money {
        if self.enabled {
            self.fixed_amount()
        } else {
            Money::zero()
        }
    }
}

impl Default for PlatformFeeConfig {
    /// $1.99 platform fee, 10% commission.
    fn default() -> Self {
        PlatformFeeConfig {
            enabled: true,
            fixed_amount_cents: 199,
            commission_rate_bps: 1000,
        }
    }
}

// =============================================================================
// Combined Snapshot
// =============================================================================

/// Both pricing configs, loaded together at session start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PricingConfigs {
    pub delivery: DeliveryFeeConfig,
    pub platform: PlatformFeeConfig,
}

/// Loads both pricing configs, falling back per-config on failure.
///
/// A delivery config that fetches fine but fails validation (negative
/// fees, unsorted tiers) is treated the same as a fetch failure.
pub async fn load_pricing_configs(source: &dyn ConfigSource) -> PricingConfigs {
    let delivery = match source.delivery_fee_config().await {
        Ok(config) => match config.validate() {
            Ok(()) => config,
            Err(error) => {
                warn!(%error, "Invalid delivery fee config, using defaults");
                DeliveryFeeConfig::default()
            }
        },
        Err(error) => {
            warn!(%error, "Failed to load delivery fee config, using defaults");
            DeliveryFeeConfig::default()
        }
    };

    let platform = match source.platform_fee_config().await {
        Ok(config) => config,
        Err(error) => {
            warn!(%error, "Failed to load platform fee config, using defaults");
            PlatformFeeConfig::default()
        }
    };

    PricingConfigs { delivery, platform }
}

// =============================================================================
// Unit Tests
// =============================================================================
