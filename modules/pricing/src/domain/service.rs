use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::domain::quote::PricingQuote;
use crate::domain::rejection::VoucherRejection;
use crate::domain::repo::VoucherStore;
use crate::domain::voucher::{parse_magnitude, VoucherKind};

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Base price must be a positive amount")]
    InvalidBasePrice,

    #[error("Voucher lookup failed: {0}")]
    Store(#[from] anyhow::Error),
}

/// Prices a plan against an optional voucher code.
#[derive(Clone)]
pub struct PricingService {
    vouchers: Arc<dyn VoucherStore>,
}

impl PricingService {
    pub fn new(vouchers: Arc<dyn VoucherStore>) -> Self {
        Self { vouchers }
    }

    /// Quote with the voucher removed.
    ///
    /// # Errors
    ///
    /// Fails only when `base_price` is not positive.
    pub fn clear_voucher(&self, base_price: i64) -> Result<PricingQuote, PricingError> {
        if base_price <= 0 {
            return Err(PricingError::InvalidBasePrice);
        }
        Ok(PricingQuote::base(base_price))
    }

    /// Validate a voucher code and compute the discounted price.
    ///
    /// The outer `Result` is infrastructure (store unreachable, bad base
    /// price); the inner one is the domain outcome. An empty or
    /// whitespace-only code clears the voucher instead of rejecting.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Store`] when the voucher lookup itself
    /// fails, and [`PricingError::InvalidBasePrice`] for non-positive
    /// prices.
    #[instrument(skip(self))]
    pub async fn apply_voucher(
        &self,
        base_price: i64,
        code: &str,
    ) -> Result<Result<PricingQuote, VoucherRejection>, PricingError> {
        if base_price <= 0 {
            return Err(PricingError::InvalidBasePrice);
        }

        let code = code.trim();
        if code.is_empty() {
            return Ok(Ok(PricingQuote::base(base_price)));
        }

        let Some(record) = self.vouchers.find_by_code(code).await? else {
            debug!("voucher code not found");
            return Ok(Err(VoucherRejection::InvalidOrInactive));
        };

        if record.is_active == Some(false) {
            return Ok(Err(VoucherRejection::InvalidOrInactive));
        }

        let now = Utc::now();
        if record.valid_from.is_some_and(|from| from > now) {
            return Ok(Err(VoucherRejection::NotYetValid));
        }
        if record.valid_to.is_some_and(|until| until < now) {
            return Ok(Err(VoucherRejection::Expired));
        }

        if let Some(limit) = record.usage_limit {
            if limit > 0 && record.usage_count.unwrap_or(0) >= limit {
                return Ok(Err(VoucherRejection::UsageLimitReached));
            }
        }

        let kind = VoucherKind::normalize(record.kind.as_deref());
        let Some(magnitude) = parse_magnitude(record.value.as_ref()) else {
            return Ok(Err(VoucherRejection::UnsupportedValue));
        };

        let quote = match kind {
            VoucherKind::Percentage => {
                PricingQuote::with_percentage(base_price, record.code, magnitude)
            }
            VoucherKind::Fixed => PricingQuote::with_fixed(base_price, record.code, magnitude),
        };
        debug!(final_price = quote.final_price, "voucher applied");
        Ok(Ok(quote))
    }
}
