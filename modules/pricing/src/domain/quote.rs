use serde::Serialize;

use crate::domain::voucher::VoucherKind;

/// Voucher snapshot embedded in a quote: code, kind, and the magnitude
/// after clamping/rounding.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct AppliedVoucher {
    pub code: String,
    pub kind: VoucherKind,
    pub amount: f64,
}

/// Result of pricing a plan, in currency minor units.
///
/// `final_price` never exceeds `base_price` and never goes below zero.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuote {
    pub base_price: i64,
    pub voucher: Option<AppliedVoucher>,
    pub final_price: i64,
}

/// Percentage discounts are capped; nothing sells for less than 10% of
/// list price.
pub const MAX_PERCENTAGE_DISCOUNT: f64 = 90.0;

impl PricingQuote {
    /// Quote with no voucher applied.
    pub fn base(base_price: i64) -> Self {
        Self {
            base_price,
            voucher: None,
            final_price: base_price,
        }
    }

    /// Apply a percentage discount, clamped to `[0, 90]`.
    #[allow(clippy::cast_possible_truncation)] // bounded by base_price
    pub fn with_percentage(base_price: i64, code: String, percentage: f64) -> Self {
        let pct = percentage.clamp(0.0, MAX_PERCENTAGE_DISCOUNT);
        let discounted = (base_price as f64 * (1.0 - pct / 100.0)).round() as i64;
        Self {
            base_price,
            voucher: Some(AppliedVoucher {
                code,
                kind: VoucherKind::Percentage,
                amount: pct,
            }),
            final_price: discounted.clamp(0, base_price),
        }
    }

    /// Subtract a fixed amount, floored at zero.
    #[allow(clippy::cast_possible_truncation)] // magnitude is validated finite
    pub fn with_fixed(base_price: i64, code: String, amount: f64) -> Self {
        let rounded = amount.round();
        let discounted = base_price.saturating_sub(rounded as i64);
        Self {
            base_price,
            voucher: Some(AppliedVoucher {
                code,
                kind: VoucherKind::Fixed,
                amount: rounded,
            }),
            final_price: discounted.clamp(0, base_price),
        }
    }
}
