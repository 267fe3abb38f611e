//! # Tax Module
//!
//! Per-province GST/PST/HST breakdown for Canadian jurisdictions.
//!
//! Rates are a static table keyed by two-letter province code. Unknown or
//! missing codes fall back to the default jurisdiction (BC) rather than
//! erroring; checkout must not stall on a typo in an address form. The
//! fallback is silent and can mask upstream address-validation bugs, so
//! callers that want strictness should pre-validate the code with
//! [`Province::from_code`].
//!
//! Each component is rounded once on the subtotal; the total is the exact
//! integer sum of the components, never an independently rounded figure.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{Money, Rate};

// =============================================================================
// Province
// =============================================================================

/// Serviced Canadian jurisdictions.
///
/// Quebec is deliberately absent: its QST rate (9.975%) is not
/// representable in basis points and the platform does not deliver there.
/// Addresses with `QC` take the same default-jurisdiction path as unknown
/// codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Province {
    Bc,
    Ab,
    Sk,
    Mb,
    On,
    Nb,
    Ns,
    Pe,
    Nl,
    Yt,
    Nt,
    Nu,
}

/// The component rates for one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRates {
    pub gst: Rate,
    pub pst: Rate,
    pub hst: Rate,
}

impl Province {
    /// Parses a two-letter code, case-insensitively.
    /// Returns `None` for unknown or unserviced codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "BC" => Some(Province::Bc),
            "AB" => Some(Province::Ab),
            "SK" => Some(Province::Sk),
            "MB" => Some(Province::Mb),
            "ON" => Some(Province::On),
            "NB" => Some(Province::Nb),
            "NS" => Some(Province::Ns),
            "PE" => Some(Province::Pe),
            "NL" => Some(Province::Nl),
            "YT" => Some(Province::Yt),
            "NT" => Some(Province::Nt),
            "NU" => Some(Province::Nu),
            _ => None,
        }
    }

    /// The two-letter code.
    pub const fn code(&self) -> &'static str {
        match self {
            Province::Bc => "BC",
            Province::Ab => "AB",
            Province::Sk => "SK",
            Province::Mb => "MB",
            Province::On => "ON",
            Province::Nb => "NB",
            Province::Ns => "NS",
            Province::Pe => "PE",
            Province::Nl => "NL",
            Province::Yt => "YT",
            Province::Nt => "NT",
            Province::Nu => "NU",
        }
    }

    /// Component rates for this jurisdiction.
    ///
    /// ```text
    /// ┌──────┬──────┬──────┬──────┐
    /// │ code │ GST  │ PST  │ HST  │
    /// ├──────┼──────┼──────┼──────┤
    /// │  BC  │  5%  │  7%  │  -   │
    /// │  AB  │  5%  │  -   │  -   │
    /// │  SK  │  5%  │  6%  │  -   │
    /// │  MB  │  5%  │  7%  │  -   │
    /// │  ON  │  5%  │  -   │ 13%  │
    /// │  NB  │  5%  │  -   │ 15%  │
    /// │  NS  │  5%  │  -   │ 15%  │
    /// │  PE  │  5%  │  -   │ 15%  │
    /// │  NL  │  5%  │  -   │ 15%  │
    /// │  YT  │  5%  │  -   │  -   │
    /// │  NT  │  5%  │  -   │  -   │
    /// │  NU  │  5%  │  -   │  -   │
    /// └──────┴──────┴──────┴──────┘
    /// ```
    pub const fn rates(&self) -> TaxRates {
        const fn rates(gst: u32, pst: u32, hst: u32) -> TaxRates {
            TaxRates {
                gst: Rate::from_bps(gst),
                pst: Rate::from_bps(pst),
                hst: Rate::from_bps(hst),
            }
        }

        match self {
            Province::Bc => rates(500, 700, 0),
            Province::Ab => rates(500, 0, 0),
            Province::Sk => rates(500, 600, 0),
            Province::Mb => rates(500, 700, 0),
            Province::On => rates(500, 0, 1300),
            Province::Nb => rates(500, 0, 1500),
            Province::Ns => rates(500, 0, 1500),
            Province::Pe => rates(500, 0, 1500),
            Province::Nl => rates(500, 0, 1500),
            Province::Yt => rates(500, 0, 0),
            Province::Nt => rates(500, 0, 0),
            Province::Nu => rates(500, 0, 0),
        }
    }

    /// All serviced provinces, for table-wide tests and admin listings.
    pub const fn all() -> [Province; 12] {
        [
            Province::Bc,
            Province::Ab,
            Province::Sk,
            Province::Mb,
            Province::On,
            Province::Nb,
            Province::Ns,
            Province::Pe,
            Province::Nl,
            Province::Yt,
            Province::Nt,
            Province::Nu,
        ]
    }
}

/// BC is the default jurisdiction when the address has no usable code.
impl Default for Province {
    fn default() -> Self {
        Province::Bc
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Tax Breakdown
// =============================================================================

/// Component breakdown of the tax on one subtotal.
///
/// Invariant: `total = gst + pst + hst` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub gst_cents: i64,
    pub pst_cents: i64,
    pub hst_cents: i64,
    pub total_cents: i64,
}

impl TaxBreakdown {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Computes the tax breakdown on a subtotal for a province code.
///
/// Unknown or absent codes fall back to [`Province::default`].
///
/// ## Example
/// ```rust
/// use lulocart_core::money::Money;
/// use lulocart_core::tax::tax_breakdown;
///
/// let tax = tax_breakdown(Money::from_cents(10000), Some("ON"));
/// assert_eq!(tax.gst_cents, 500);
/// assert_eq!(tax.hst_cents, 1300);
/// assert_eq!(tax.total_cents, 1800);
/// ```
pub fn tax_breakdown(subtotal: Money, province_code: Option<&str>) -> TaxBreakdown {
    let province = province_code
        .and_then(Province::from_code)
        .unwrap_or_default();
    let rates = province.rates();

    let gst = subtotal.apply_rate(rates.gst);
    let pst = subtotal.apply_rate(rates.pst);
    let hst = subtotal.apply_rate(rates.hst);
    let total = gst + pst + hst;

    TaxBreakdown {
        gst_cents: gst.cents(),
        pst_cents: pst.cents(),
        hst_cents: hst.cents(),
        total_cents: total.cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example_ontario() {
        // $100.00 in ON: GST $5.00, HST $13.00, no PST, total $18.00
        let tax = tax_breakdown(Money::from_cents(10000), Some("ON"));

        assert_eq!(tax.gst_cents, 500);
        assert_eq!(tax.pst_cents, 0);
        assert_eq!(tax.hst_cents, 1300);
        assert_eq!(tax.total_cents, 1800);
    }

    #[test]
    fn test_bc() {
        // $50.00 in BC: GST $2.50 + PST $3.50 = $6.00
        let tax = tax_breakdown(Money::from_cents(5000), Some("BC"));

        assert_eq!(tax.gst_cents, 250);
        assert_eq!(tax.pst_cents, 350);
        assert_eq!(tax.hst_cents, 0);
        assert_eq!(tax.total_cents, 600);
    }

    #[test]
    fn test_alberta_gst_only() {
        let tax = tax_breakdown(Money::from_cents(10000), Some("AB"));
        assert_eq!(tax.gst_cents, 500);
        assert_eq!(tax.pst_cents, 0);
        assert_eq!(tax.hst_cents, 0);
        assert_eq!(tax.total_cents, 500);
    }

    #[test]
    fn test_unknown_code_falls_back_to_bc() {
        let bc = tax_breakdown(Money::from_cents(2000), Some("BC"));

        assert_eq!(tax_breakdown(Money::from_cents(2000), Some("ZZ")), bc);
        assert_eq!(tax_breakdown(Money::from_cents(2000), Some("QC")), bc);
        assert_eq!(tax_breakdown(Money::from_cents(2000), None), bc);
        assert_eq!(tax_breakdown(Money::from_cents(2000), Some("")), bc);
    }

    #[test]
    fn test_case_insensitive_codes() {
        let upper = tax_breakdown(Money::from_cents(3000), Some("ON"));
        let lower = tax_breakdown(Money::from_cents(3000), Some("on"));
        let padded = tax_breakdown(Money::from_cents(3000), Some(" on "));
        assert_eq!(upper, lower);
        assert_eq!(upper, padded);
    }

    #[test]
    fn test_additivity_across_whole_table() {
        // total is always the exact component sum, for awkward subtotals too
        for province in Province::all() {
            for cents in [1, 99, 333, 1099, 3550, 99999] {
                let tax = tax_breakdown(Money::from_cents(cents), Some(province.code()));
                assert_eq!(
                    tax.total_cents,
                    tax.gst_cents + tax.pst_cents + tax.hst_cents,
                    "additivity broke for {province} at {cents} cents"
                );
            }
        }
    }

    #[test]
    fn test_rounding_happens_per_component() {
        // $0.33 in BC: GST 1.65¢ → 2¢, PST 2.31¢ → 2¢, total 4¢
        let tax = tax_breakdown(Money::from_cents(33), Some("BC"));
        assert_eq!(tax.gst_cents, 2);
        assert_eq!(tax.pst_cents, 2);
        assert_eq!(tax.total_cents, 4);
    }

    #[test]
    fn test_province_roundtrip() {
        for province in Province::all() {
            assert_eq!(Province::from_code(province.code()), Some(province));
        }
        assert_eq!(Province::from_code("XX"), None);
        assert_eq!(Province::from_code("QC"), None);
    }

    #[test]
    fn test_province_serde() {
        assert_eq!(serde_json::to_string(&Province::On).unwrap(), "\"ON\"");
        let p: Province = serde_json::from_str("\"NS\"").unwrap();
        assert_eq!(p, Province::Ns);
    }
}
