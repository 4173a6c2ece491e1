use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::error::{message_from_body, ProviderError};

const PROVIDER: &str = "email";

/// A fully rendered message ready for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Provider-assigned identifier of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailId(pub String);

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Hand the message to the delivery provider.
    async fn send(&self, email: &OutboundEmail) -> Result<EmailId, ProviderError>;
}

/// Email client for a Resend-style delivery API (`POST /emails`).
pub struct HttpEmailSender {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl HttpEmailSender {
    pub fn new(client: reqwest::Client, base_url: Url, api_key: SecretString) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    #[instrument(skip_all, fields(subject = %email.subject, recipients = email.to.len()))]
    async fn send(&self, email: &OutboundEmail) -> Result<EmailId, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::decode(PROVIDER, "base URL cannot be a base"))?
            .extend(&["emails"]);

        let response = self
            .client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(email)
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

        let parsed: SendResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;
        match parsed.id {
            Some(id) => Ok(EmailId(id)),
            None => Err(ProviderError::decode(
                PROVIDER,
                "response carried no message id",
            )),
        }
    }
}
