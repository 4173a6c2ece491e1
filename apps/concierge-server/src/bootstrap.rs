use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use url::Url;

use concierge_auth_links::api::rest::PublicOrigin;
use concierge_auth_links::{DispatcherConfig, LinkDispatcher};
use concierge_pricing::infra::StoreVoucherRepo;
use concierge_pricing::PricingService;
use concierge_providers::{
    EmailSender, HttpEmailSender, HttpIdentityProvider, HttpRecordStore, IdentityProvider,
    Provisioned, RecordStore,
};
use secrecy::SecretString;

use crate::config::{AppConfig, EndpointConfig};

fn endpoint_url(section: &str, endpoint: &EndpointConfig) -> anyhow::Result<Url> {
    Url::parse(&endpoint.url).with_context(|| format!("invalid {section} url"))
}

/// Build the full application router from validated configuration.
///
/// # Errors
///
/// Fails on malformed provider URLs or when required providers are absent
/// (which `AppConfig::validate` should already have caught).
pub fn build_router(config: &AppConfig) -> anyhow::Result<Router> {
    let http = reqwest::Client::new();

    let record_store: Option<Arc<dyn RecordStore>> = match &config.providers.record_store {
        Some(endpoint) => Some(Arc::new(HttpRecordStore::new(
            http.clone(),
            endpoint_url("providers.record_store", endpoint)?,
            SecretString::clone(&endpoint.api_key),
        ))),
        None => None,
    };

    let identity_cfg = config
        .providers
        .identity
        .as_ref()
        .context("providers.identity is required")?;
    let identity: Arc<dyn IdentityProvider> = Arc::new(HttpIdentityProvider::new(
        http.clone(),
        endpoint_url("providers.identity", identity_cfg)?,
        SecretString::clone(&identity_cfg.api_key),
    ));

    let email_cfg = config
        .providers
        .email_api
        .as_ref()
        .context("providers.email_api is required")?;
    let mailer: Arc<dyn EmailSender> = Arc::new(HttpEmailSender::new(
        http,
        endpoint_url("providers.email_api", email_cfg)?,
        SecretString::clone(&email_cfg.api_key),
    ));

    let newsletter = record_store.clone().map_or_else(
        || Provisioned::unconfigured("record store"),
        Provisioned::configured,
    );
    let dispatcher = Arc::new(LinkDispatcher::new(
        identity,
        mailer,
        newsletter,
        DispatcherConfig {
            sender_address: config.email.sender_address.clone(),
            sender_name: config.email.sender_name.clone(),
            admin_recipients: config.email.admin_recipients.clone(),
        },
    ));

    let mut router = Router::new()
        .route("/healthz", get(healthz))
        .merge(concierge_auth_links::api::rest::router(
            dispatcher,
            PublicOrigin(config.server.public_origin.clone()),
        ));

    if let Some(store) = record_store {
        let pricing = Arc::new(PricingService::new(Arc::new(StoreVoucherRepo::new(store))));
        router = router.merge(concierge_pricing::api::rest::router(pricing));
    } else {
        tracing::warn!("record store not configured; pricing quotes disabled");
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt as _;

    fn configured() -> AppConfig {
        let yaml = concat!(
            "providers:\n",
            "  identity:\n",
            "    url: \"https://id.example.com\"\n",
            "    api_key: \"svc-key\"\n",
            "  email_api:\n",
            "    url: \"https://mail.example.com\"\n",
            "    api_key: \"mail-key\"\n",
        );
        use figment::providers::{Format as _, Yaml};
        figment::Figment::new()
            .merge(Yaml::string(yaml))
            .extract()
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let router = build_router(&configured()).unwrap();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn pricing_route_absent_without_record_store() {
        let router = build_router(&configured()).unwrap();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/pricing/quote")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"basePrice":1000}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
