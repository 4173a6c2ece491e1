//! Voucher validation and checkout pricing.
//!
//! The engine turns a plan price plus an optional voucher code into a
//! [`domain::quote::PricingQuote`]. Every way a voucher can fail to apply
//! is a [`domain::rejection::VoucherRejection`] value destined for inline
//! form feedback; only infrastructure trouble (store unreachable) surfaces
//! as an error.

pub mod api;
pub mod domain;
pub mod infra;

pub use domain::quote::{AppliedVoucher, PricingQuote};
pub use domain::rejection::VoucherRejection;
pub use domain::service::{PricingError, PricingService};
pub use domain::voucher::{VoucherKind, VoucherRecord};
