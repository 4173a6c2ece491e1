//! Ports and HTTP clients for the hosted collaborators of the concierge
//! core: the record store, the identity provider, and the email-delivery
//! provider.
//!
//! Domain crates depend only on the traits defined here; the `Http*`
//! implementations speak the providers' REST dialects and are wired in by
//! the server binary. Each client slot is wrapped in [`Provisioned`] so a
//! missing configuration is a known state, not a stub that errors on every
//! call.

pub mod email;
pub mod error;
pub mod identity;
pub mod provisioned;
pub mod record_store;

pub use email::{EmailId, EmailSender, HttpEmailSender, OutboundEmail};
pub use error::ProviderError;
pub use identity::{
    ActionLink, ActionLinkSpec, AuthenticatedUser, HttpIdentityProvider, IdentityProvider,
    LinkKind,
};
pub use provisioned::Provisioned;
pub use record_store::{Filter, HttpRecordStore, RecordStore};
