use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::header::{AUTHORIZATION, ORIGIN, RETRY_AFTER};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use crate::api::rest::dto::{
    AckResponse, ApiErrorResponse, ChangeEmailRequest, EmailFlowRequest, SignupRequest,
};
use crate::api::rest::routes::PublicOrigin;
use crate::domain::flow::FlowKind;
use crate::domain::outcome::{DispatchOutcome, OutcomeClass, RATE_LIMIT_COOLDOWN_SECS};
use crate::domain::service::{DispatchRequest, LinkDispatcher, SignupPayload};

/// Origin the redirect defaults are built from: request `Origin` header
/// when the browser sent one, else the configured public origin.
fn request_origin(headers: &HeaderMap, public_origin: &str) -> String {
    headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|o| !o.trim().is_empty())
        .map_or_else(|| public_origin.to_owned(), ToOwned::to_owned)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

/// Malformed or mistyped request bodies answer in the same error shape as
/// every other failure.
fn malformed_body(rejection: &JsonRejection) -> Response {
    (
        rejection.status(),
        Json(ApiErrorResponse {
            ok: false,
            error: rejection.body_text(),
        }),
    )
        .into_response()
}

fn outcome_response(outcome: DispatchOutcome) -> Response {
    if outcome.success {
        return (outcome.status, Json(AckResponse { ok: true })).into_response();
    }
    let body = Json(ApiErrorResponse {
        ok: false,
        error: outcome.message,
    });
    if outcome.class == OutcomeClass::RateLimited {
        let headers = [(RETRY_AFTER, RATE_LIMIT_COOLDOWN_SECS.to_string())];
        (outcome.status, headers, body).into_response()
    } else {
        (outcome.status, body).into_response()
    }
}

pub async fn confirm_signup(
    Extension(dispatcher): Extension<Arc<LinkDispatcher>>,
    Extension(PublicOrigin(public_origin)): Extension<PublicOrigin>,
    headers: HeaderMap,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(&rejection),
    };
    let mut req = DispatchRequest::for_email(&body.email, request_origin(&headers, &public_origin));
    req.redirect_to = body.redirect_to;
    req.signup = Some(SignupPayload {
        password: body.password,
        metadata: body.metadata,
    });

    let outcome = dispatcher.dispatch(FlowKind::Signup, req).await;
    if outcome.success {
        for effect in dispatcher.signup_side_effects(body.email.trim()).await {
            if !effect.ok {
                warn!(
                    operation = effect.operation,
                    detail = effect.detail.as_deref().unwrap_or("-"),
                    "best-effort signup side effect failed"
                );
            }
        }
    }
    outcome_response(outcome)
}

pub async fn magic_link(
    Extension(dispatcher): Extension<Arc<LinkDispatcher>>,
    Extension(PublicOrigin(public_origin)): Extension<PublicOrigin>,
    headers: HeaderMap,
    body: Result<Json<EmailFlowRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(&rejection),
    };
    let mut req = DispatchRequest::for_email(&body.email, request_origin(&headers, &public_origin));
    req.redirect_to = body.redirect_to;
    outcome_response(dispatcher.dispatch(FlowKind::MagicLink, req).await)
}

pub async fn reset_password(
    Extension(dispatcher): Extension<Arc<LinkDispatcher>>,
    Extension(PublicOrigin(public_origin)): Extension<PublicOrigin>,
    headers: HeaderMap,
    body: Result<Json<EmailFlowRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(&rejection),
    };
    let mut req = DispatchRequest::for_email(&body.email, request_origin(&headers, &public_origin));
    req.redirect_to = body.redirect_to;
    outcome_response(dispatcher.dispatch(FlowKind::PasswordReset, req).await)
}

pub async fn change_email(
    Extension(dispatcher): Extension<Arc<LinkDispatcher>>,
    Extension(PublicOrigin(public_origin)): Extension<PublicOrigin>,
    headers: HeaderMap,
    body: Result<Json<ChangeEmailRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(&rejection),
    };
    let mut req = DispatchRequest::for_email("", request_origin(&headers, &public_origin));
    req.redirect_to = body.redirect_to;
    req.new_email = Some(body.new_email);
    req.bearer_token = bearer_token(&headers);
    outcome_response(dispatcher.dispatch(FlowKind::EmailChange, req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::routes::router;
    use crate::domain::service::DispatcherConfig;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use concierge_providers::{
        ActionLink, ActionLinkSpec, AuthenticatedUser, EmailId, EmailSender, IdentityProvider,
        OutboundEmail, ProviderError, Provisioned,
    };
    use serde_json::Value;
    use tower::ServiceExt as _;

    struct StubIdentity;

    #[async_trait]
    impl IdentityProvider for StubIdentity {
        async fn generate_action_link(
            &self,
            _spec: &ActionLinkSpec,
        ) -> Result<ActionLink, ProviderError> {
            Ok(ActionLink {
                url: "https://id.example.com/verify?token=t".to_owned(),
            })
        }

        async fn resolve_session(
            &self,
            token: &str,
        ) -> Result<AuthenticatedUser, ProviderError> {
            if token == "good-token" {
                Ok(AuthenticatedUser {
                    id: "user-1".to_owned(),
                    email: Some("current@example.com".to_owned()),
                })
            } else {
                Err(ProviderError::http("identity", 401, "invalid JWT"))
            }
        }
    }

    struct StubMailer {
        fail_with: Option<&'static str>,
    }

    #[async_trait]
    impl EmailSender for StubMailer {
        async fn send(&self, _email: &OutboundEmail) -> Result<EmailId, ProviderError> {
            match self.fail_with {
                Some(message) => Err(ProviderError::http("email", 500, message.to_owned())),
                None => Ok(EmailId("msg-1".to_owned())),
            }
        }
    }

    fn test_app(mailer: StubMailer) -> axum::Router {
        let dispatcher = Arc::new(LinkDispatcher::new(
            Arc::new(StubIdentity),
            Arc::new(mailer),
            Provisioned::unconfigured("record store"),
            DispatcherConfig {
                sender_address: "hello@concierge.example".to_owned(),
                sender_name: "Concierge".to_owned(),
                admin_recipients: vec![],
            },
        ));
        router(
            dispatcher,
            PublicOrigin("https://concierge.example".to_owned()),
        )
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn every_flow_acknowledges_on_success() {
        let cases = [
            (
                "/api/auth/confirm-signup",
                r#"{"email":"user@example.com","password":"hunter2hunter2"}"#,
            ),
            ("/api/auth/magic-link", r#"{"email":"user@example.com"}"#),
            ("/api/auth/reset-password", r#"{"email":"user@example.com"}"#),
        ];
        for (uri, body) in cases {
            let app = test_app(StubMailer { fail_with: None });
            let response = app.oneshot(post_json(uri, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "endpoint {uri}");
            let json = body_json(response).await;
            assert_eq!(json["ok"], true);
        }
    }

    #[tokio::test]
    async fn invalid_email_is_400_with_error_shape() {
        let app = test_app(StubMailer { fail_with: None });
        let response = app
            .oneshot(post_json(
                "/api/auth/magic-link",
                r#"{"email":"not-an-email"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "Invalid email");
    }

    #[tokio::test]
    async fn change_email_without_bearer_is_401() {
        let app = test_app(StubMailer { fail_with: None });
        let response = app
            .oneshot(post_json(
                "/api/auth/change-email",
                r#"{"newEmail":"new@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["ok"], false);
    }

    #[tokio::test]
    async fn change_email_with_valid_bearer_succeeds() {
        let app = test_app(StubMailer { fail_with: None });
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/change-email")
            .header("content-type", "application/json")
            .header("authorization", "Bearer good-token")
            .body(Body::from(r#"{"newEmail":"new@example.com"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn change_email_with_bad_token_is_401() {
        let app = test_app(StubMailer { fail_with: None });
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/change-email")
            .header("content-type", "application/json")
            .header("authorization", "Bearer stale-token")
            .body(Body::from(r#"{"newEmail":"new@example.com"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rate_limited_send_is_429_with_retry_after() {
        let app = test_app(StubMailer {
            fail_with: Some("rate limit exceeded"),
        });
        let response = app
            .oneshot(post_json(
                "/api/auth/reset-password",
                r#"{"email":"user@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("retry-after").unwrap(),
            &RATE_LIMIT_COOLDOWN_SECS.to_string()
        );
    }

    #[tokio::test]
    async fn provider_failure_is_500_with_generic_message() {
        let app = test_app(StubMailer {
            fail_with: Some("smtp handshake broke"),
        });
        let response = app
            .oneshot(post_json(
                "/api/auth/magic-link",
                r#"{"email":"user@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to send email. Please try again later.");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_in_the_error_shape() {
        let app = test_app(StubMailer { fail_with: None });
        let response = app
            .oneshot(post_json("/api/auth/magic-link", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["ok"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let app = test_app(StubMailer { fail_with: None });
        let request = Request::builder()
            .method("GET")
            .uri("/api/auth/magic-link")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn origin_header_overrides_configured_origin() {
        // The dispatch succeeds either way; this exercises the header path.
        let app = test_app(StubMailer { fail_with: None });
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/magic-link")
            .header("content-type", "application/json")
            .header("origin", "https://staging.concierge.example")
            .body(Body::from(r#"{"email":"user@example.com"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
