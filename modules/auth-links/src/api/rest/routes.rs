use std::sync::Arc;

use axum::routing::post;
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::LinkDispatcher;

/// Public origin of the site, used for redirect defaults when the request
/// carries no `Origin` header.
#[derive(Debug, Clone)]
pub struct PublicOrigin(pub String);

/// Routes owned by the auth-links module.
pub fn router(dispatcher: Arc<LinkDispatcher>, public_origin: PublicOrigin) -> Router {
    Router::new()
        .route("/api/auth/confirm-signup", post(handlers::confirm_signup))
        .route("/api/auth/magic-link", post(handlers::magic_link))
        .route("/api/auth/reset-password", post(handlers::reset_password))
        .route("/api/auth/change-email", post(handlers::change_email))
        .layer(Extension(dispatcher))
        .layer(Extension(public_origin))
}
