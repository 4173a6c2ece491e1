use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/auth/confirm-signup`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
    /// Free-form profile fields stored on the new account.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Body of `POST /api/auth/magic-link` and `POST /api/auth/reset-password`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailFlowRequest {
    pub email: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Body of `POST /api/auth/change-email`. The current account comes from
/// the `Authorization` bearer token, not the body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    pub new_email: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub ok: bool,
    pub error: String,
}
