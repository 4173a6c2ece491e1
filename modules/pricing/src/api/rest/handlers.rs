use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use crate::api::rest::dto::{QuoteRejectedResponse, QuoteRequest, QuoteResponse};
use crate::domain::service::{PricingError, PricingService};

/// Quote a plan price against an optional voucher code.
///
/// Rejections come back as `200 {ok:false, error}` — they are inline form
/// feedback, not request failures. Malformed bodies answer in the same
/// `{ok, error}` shape.
pub async fn quote(
    Extension(svc): Extension<Arc<PricingService>>,
    body: Result<Json<QuoteRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(QuoteRejectedResponse {
                    ok: false,
                    error: rejection.body_text(),
                }),
            )
                .into_response()
        }
    };
    let code = req.voucher_code.as_deref().unwrap_or("");
    match svc.apply_voucher(req.base_price, code).await {
        Ok(Ok(quote)) => (StatusCode::OK, Json(QuoteResponse { ok: true, quote })).into_response(),
        Ok(Err(rejection)) => (
            StatusCode::OK,
            Json(QuoteRejectedResponse {
                ok: false,
                error: rejection.to_string(),
            }),
        )
            .into_response(),
        Err(PricingError::InvalidBasePrice) => (
            StatusCode::BAD_REQUEST,
            Json(QuoteRejectedResponse {
                ok: false,
                error: PricingError::InvalidBasePrice.to_string(),
            }),
        )
            .into_response(),
        Err(PricingError::Store(e)) => {
            tracing::error!(error = ?e, "pricing quote failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(QuoteRejectedResponse {
                    ok: false,
                    error: "Failed to price the plan. Please try again later.".to_owned(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repo::VoucherStore;
    use crate::domain::voucher::VoucherRecord;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt as _;

    struct StubStore {
        record: Option<VoucherRecord>,
    }

    #[async_trait]
    impl VoucherStore for StubStore {
        async fn find_by_code(&self, _code: &str) -> anyhow::Result<Option<VoucherRecord>> {
            Ok(self.record.clone())
        }
    }

    fn test_router(record: Option<VoucherRecord>) -> Router {
        let svc = Arc::new(PricingService::new(Arc::new(StubStore { record })));
        Router::new()
            .route("/api/pricing/quote", post(quote))
            .layer(Extension(svc))
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn quote_applies_percentage_voucher() {
        let record: VoucherRecord = serde_json::from_value(serde_json::json!({
            "code": "SAVE20", "type": "percentage", "value": "20%", "is_active": true
        }))
        .unwrap();
        let app = test_router(Some(record));

        let request = Request::builder()
            .method("POST")
            .uri("/api/pricing/quote")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"basePrice":100000,"voucherCode":"SAVE20"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["quote"]["finalPrice"], 80_000);
        assert_eq!(json["quote"]["voucher"]["code"], "SAVE20");
    }

    #[tokio::test]
    async fn quote_reports_rejection_inline() {
        let app = test_router(None);

        let request = Request::builder()
            .method("POST")
            .uri("/api/pricing/quote")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"basePrice":100000,"voucherCode":"NOPE"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "Invalid or inactive voucher code");
    }

    #[tokio::test]
    async fn quote_rejects_non_positive_price() {
        let app = test_router(None);

        let request = Request::builder()
            .method("POST")
            .uri("/api/pricing/quote")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"basePrice":0}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["ok"], false);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_in_the_error_shape() {
        let app = test_router(None);

        let request = Request::builder()
            .method("POST")
            .uri("/api/pricing/quote")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["ok"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let app = test_router(None);

        let request = Request::builder()
            .method("GET")
            .uri("/api/pricing/quote")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
