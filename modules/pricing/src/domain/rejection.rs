/// Why a voucher did not apply.
///
/// Rejections are domain values, not errors: the checkout form renders the
/// message next to the voucher input and the rest of the form keeps
/// working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VoucherRejection {
    #[error("Invalid or inactive voucher code")]
    InvalidOrInactive,

    #[error("Voucher is not yet valid")]
    NotYetValid,

    #[error("Voucher has expired")]
    Expired,

    #[error("Voucher usage limit reached")]
    UsageLimitReached,

    #[error("Unsupported voucher discount value")]
    UnsupportedValue,
}
