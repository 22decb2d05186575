//! # Invoice Totals Engine
//!
//! Turns a draft's lines and header (discount, VAT) into the five numbers the
//! invoice footer shows.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Totals                                    │
//! │                                                                         │
//! │  lines ──► line_total_minor() each ──► Σ (integer) ──► subtotal         │
//! │                                                          │              │
//! │                        discount (none / fixed / percent) │              │
//! │                        capped at subtotal ───────────────┤              │
//! │                                                          ▼              │
//! │                                  max(0, subtotal − discount)            │
//! │                                                          │              │
//! │                                  VAT = round(after × bps / 10000)       │
//! │                                                          ▼              │
//! │                                  total = after + VAT                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Permissive Inputs
//! Nothing here returns an error. A draft mid-edit can hold a NaN quantity or
//! a missing minutes value and still needs a number on screen, so bad inputs
//! are coerced to zero instead. Sums and products that leave the i64 range
//! saturate at its bounds.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountType, InvoiceDraft, InvoiceLine, PricingMode};

/// Minutes in an hour, the divisor for hourly pricing.
const MINUTES_PER_HOUR: f64 = 60.0;

/// Financial summary of one invoice, all in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub after_discount_minor: i64,
    pub vat_minor: i64,
    pub total_minor: i64,
}

impl InvoiceTotals {
    /// `max(0, total − paid − deposit)`.
    pub fn balance_due_minor(&self, paid_minor: i64, deposit_minor: i64) -> i64 {
        self.total_minor
            .saturating_sub(paid_minor)
            .saturating_sub(deposit_minor)
            .max(0)
    }
}

/// Computes a single line's contribution in minor units.
///
/// - Flat: `round(quantity × unit_price)`
/// - Hourly: `round(quantity × unit_price × minutes / 60)`
///
/// Rounding happens once, on the final product, with ties away from zero.
/// Negative quantities or prices pass straight through as negative totals.
///
/// ## Example
/// ```rust
/// use quill_core::totals::line_total_minor;
/// use quill_core::types::PricingMode;
///
/// assert_eq!(line_total_minor(3.0, 1050, PricingMode::Flat, None), 3150);
/// assert_eq!(line_total_minor(1.0, 6000, PricingMode::Hourly, Some(90)), 9000);
/// ```
pub fn line_total_minor(
    quantity: f64,
    unit_price_minor: i64,
    pricing_mode: PricingMode,
    minutes_worked: Option<i64>,
) -> i64 {
    let quantity = if quantity.is_finite() { quantity } else { 0.0 };
    let unit = unit_price_minor as f64;

    let raw = match pricing_mode {
        PricingMode::Flat => quantity * unit,
        PricingMode::Hourly => {
            let hours = minutes_worked.unwrap_or(0) as f64 / MINUTES_PER_HOUR;
            quantity * unit * hours
        }
    };

    // f64::round is half-away-from-zero; `as` saturates and maps NaN to 0
    raw.round() as i64
}

impl InvoiceLine {
    /// This line's total in minor units. See [`line_total_minor`].
    pub fn total_minor(&self) -> i64 {
        line_total_minor(
            self.quantity,
            self.unit_price_minor,
            self.pricing_mode,
            self.minutes_worked,
        )
    }
}

/// Computes subtotal, discount, VAT and total for a draft.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use quill_core::types::{ClientSnapshot, DiscountType, InvoiceDraft, VatRate};
/// use quill_core::totals::calculate_totals;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let draft = InvoiceDraft {
///     invoice_id: None,
///     base_number: None,
///     status: None,
///     client_id: 1,
///     issue_date: date,
///     due_by_date: date,
///     client_snapshot: ClientSnapshot::default(),
///     note: String::new(),
///     vat_rate: VatRate::from_bps(2000),
///     discount_type: DiscountType::None,
///     discount_value: 0,
///     lines: vec![],
///     paid_minor: 0,
///     deposit_minor: 0,
/// };
/// assert_eq!(calculate_totals(&draft).total_minor, 0);
/// ```
pub fn calculate_totals(draft: &InvoiceDraft) -> InvoiceTotals {
    let subtotal: Money = draft
        .lines
        .iter()
        .map(|line| Money::from_minor(line.total_minor()))
        .sum();

    totals_from_subtotal(
        subtotal.minor(),
        draft.discount_type,
        draft.discount_value,
        draft.vat_rate.bps() as i64,
    )
}

/// The discount/VAT half of [`calculate_totals`], starting from a known
/// subtotal.
pub fn totals_from_subtotal(
    subtotal_minor: i64,
    discount_type: DiscountType,
    discount_value: i64,
    vat_rate_bps: i64,
) -> InvoiceTotals {
    let subtotal = Money::from_minor(subtotal_minor);

    let discount_minor = match discount_type {
        DiscountType::None => 0,
        DiscountType::Fixed => discount_value.min(subtotal_minor),
        DiscountType::Percent => subtotal.apply_bps(discount_value).minor().min(subtotal_minor),
    };

    let after_discount = (subtotal - Money::from_minor(discount_minor)).floor_zero();
    let vat = after_discount.apply_bps(vat_rate_bps);

    InvoiceTotals {
        subtotal_minor,
        discount_minor,
        after_discount_minor: after_discount.minor(),
        vat_minor: vat.minor(),
        total_minor: (after_discount + vat).minor(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
