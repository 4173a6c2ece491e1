//! Transactional link dispatch.
//!
//! Four account flows (signup confirmation, magic-link sign-in, password
//! reset, email change) share one pipeline: validate the subject address,
//! pick a redirect target, mint a single-use action link at the identity
//! provider, render the flow's email, and hand it to the delivery
//! provider. Every failure is folded into a [`domain::outcome::DispatchOutcome`];
//! no provider error escapes raw.

pub mod api;
pub mod domain;

pub use domain::flow::FlowKind;
pub use domain::outcome::{DispatchOutcome, OutcomeClass};
pub use domain::service::{
    BestEffortOutcome, DispatchRequest, DispatcherConfig, LinkDispatcher, SignupPayload,
};
