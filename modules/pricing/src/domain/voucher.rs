use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Voucher row as stored in the record store.
///
/// Administrative tooling writes these rows; this core only reads them.
/// The `value` column is tolerant: admins have entered `5000`, `"50"`,
/// and `"50%"` over time, so it is kept as raw JSON until normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct VoucherRecord {
    pub code: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub usage_count: Option<i64>,
}

/// Discount shape after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoucherKind {
    Percentage,
    Fixed,
}

impl VoucherKind {
    /// Case-insensitive mapping: `percent`/`percentage` mean a percentage
    /// discount, anything else (including a missing kind) a fixed amount.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("percent" | "percentage") => Self::Percentage,
            _ => Self::Fixed,
        }
    }
}

/// Parse a voucher magnitude tolerantly.
///
/// Strings are stripped of everything but digits and dots before parsing,
/// so `"50%"` and `" 50 "` both resolve to 50. Returns `None` for
/// unparseable, non-finite, or non-positive results; callers treat that as
/// an unusable voucher, not an error.
pub fn parse_magnitude(raw: Option<&serde_json::Value>) -> Option<f64> {
    let parsed = match raw? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    (parsed.is_finite() && parsed > 0.0).then_some(parsed)
}
