use std::sync::Arc;

use axum::routing::post;
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::PricingService;

/// Routes owned by the pricing module.
pub fn router(service: Arc<PricingService>) -> Router {
    Router::new()
        .route("/api/pricing/quote", post(handlers::quote))
        .layer(Extension(service))
}
