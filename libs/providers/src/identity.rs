use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::error::{message_from_body, ProviderError};

const PROVIDER: &str = "identity";

/// Kind of single-use action link requested from the identity provider,
/// using the provider's wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Signup,
    Magiclink,
    Recovery,
    EmailChangeNew,
}

/// Request for a single-use action link.
#[derive(Debug, Clone, Serialize)]
pub struct ActionLinkSpec {
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub redirect_to: String,
}

impl ActionLinkSpec {
    pub fn new(kind: LinkKind, email: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            kind,
            email: email.into(),
            new_email: None,
            password: None,
            data: None,
            redirect_to: redirect_to.into(),
        }
    }
}

/// A provider-issued single-use URL authenticating one account action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    pub url: String,
}

/// Identity resolved from a bearer session token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Ask the provider to mint a single-use action link.
    async fn generate_action_link(
        &self,
        spec: &ActionLinkSpec,
    ) -> Result<ActionLink, ProviderError>;

    /// Resolve a bearer session token to the account it belongs to.
    async fn resolve_session(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, ProviderError>;
}

/// Identity client for a GoTrue-style admin API:
/// `POST /auth/v1/admin/generate_link` and `GET /auth/v1/user`.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: Url,
    service_key: SecretString,
}

impl HttpIdentityProvider {
    pub fn new(client: reqwest::Client, base_url: Url, service_key: SecretString) -> Self {
        Self {
            client,
            base_url,
            service_key,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::decode(PROVIDER, "base URL cannot be a base"))?
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateLinkResponse {
    #[serde(default)]
    action_link: Option<String>,
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip_all, fields(kind = ?spec.kind))]
    async fn generate_action_link(
        &self,
        spec: &ActionLinkSpec,
    ) -> Result<ActionLink, ProviderError> {
        let url = self.endpoint(&["auth", "v1", "admin", "generate_link"])?;

        let response = self
            .client
            .post(url)
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
            .json(spec)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;
        if !status.is_success() {
            return Err(ProviderError::http(
                PROVIDER,
                status.as_u16(),
                message_from_body(&body),
            ));
        }

        let parsed: GenerateLinkResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;
        match parsed.action_link {
            Some(url) if !url.is_empty() => Ok(ActionLink { url }),
            _ => Err(ProviderError::decode(
                PROVIDER,
                "response carried no action link",
            )),
        }
    }

    #[instrument(skip_all)]
    async fn resolve_session(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, ProviderError> {
        let url = self.endpoint(&["auth", "v1", "user"])?;

        let response = self
            .client
            .get(url)
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;
        if !status.is_success() {
            return Err(ProviderError::http(
                PROVIDER,
                status.as_u16(),
                message_from_body(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_spec_serializes_with_wire_names() {
        let mut spec = ActionLinkSpec::new(
            LinkKind::EmailChangeNew,
            "user@example.com",
            "https://app.example.com/login",
        );
        spec.new_email = Some("new@example.com".to_owned());

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "email_change_new");
        assert_eq!(json["email"], "user@example.com");
        assert_eq!(json["new_email"], "new@example.com");
        assert_eq!(json["redirect_to"], "https://app.example.com/login");
        assert!(json.get("password").is_none());
    }
}
