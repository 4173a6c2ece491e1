/// Errors produced by provider ports.
///
/// The original provider message text is preserved verbatim in `Http` and
/// `Decode` variants; the dispatch layer pattern-matches it to distinguish
/// rate-limiting from other failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} provider is not configured")]
    Unconfigured { provider: &'static str },

    #[error("{provider} returned HTTP {status}: {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned an unexpected payload: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

/// Pull a human-readable message out of a provider error body.
///
/// Providers disagree on the key (`message`, `error`, `msg`,
/// `error_description`); fall back to the raw body so nothing is lost for
/// downstream classification.
pub(crate) fn message_from_body(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "msg", "error_description"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_owned();
            }
        }
    }
    body.trim().to_owned()
}

impl ProviderError {
    pub fn unconfigured(provider: &'static str) -> Self {
        Self::Unconfigured { provider }
    }

    pub fn http(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { provider, source }
    }

    pub fn decode(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    /// HTTP status reported by the provider, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Unconfigured { .. } | Self::Decode { .. } => None,
        }
    }
}
