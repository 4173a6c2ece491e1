use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::quote::PricingQuote;

/// Body of `POST /api/pricing/quote`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Plan price in currency minor units.
    pub base_price: i64,
    /// Voucher code to apply; empty or absent clears the voucher.
    #[serde(default)]
    pub voucher_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub ok: bool,
    pub quote: PricingQuote,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteRejectedResponse {
    pub ok: bool,
    pub error: String,
}
