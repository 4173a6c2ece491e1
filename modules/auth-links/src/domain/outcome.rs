use http::StatusCode;

use concierge_providers::ProviderError;

use crate::domain::flow::FlowKind;

/// Advertised client-side cooldown after a rate-limited dispatch.
pub const RATE_LIMIT_COOLDOWN_SECS: u64 = 60;

/// HTTP-style classification of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    Ok,
    ClientError,
    RateLimited,
    ServerError,
}

/// Normalized result of one dispatch invocation.
///
/// Constructed once per call and returned to the caller; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub success: bool,
    pub class: OutcomeClass,
    pub status: StatusCode,
    pub message: String,
}

impl DispatchOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            class: OutcomeClass::Ok,
            status: StatusCode::OK,
            message: "ok".to_owned(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            success: false,
            class: OutcomeClass::ClientError,
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            success: false,
            class: OutcomeClass::ClientError,
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn rate_limited() -> Self {
        Self {
            success: false,
            class: OutcomeClass::RateLimited,
            status: StatusCode::TOO_MANY_REQUESTS,
            message: format!(
                "Too many requests. Please try again in {RATE_LIMIT_COOLDOWN_SECS} seconds."
            ),
        }
    }

    pub fn server_error() -> Self {
        Self {
            success: false,
            class: OutcomeClass::ServerError,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to send email. Please try again later.".to_owned(),
        }
    }

    /// Fold a provider failure into an outcome, reclassifying anything that
    /// smells like throttling as rate-limited so the UI can apply a
    /// cooldown instead of a generic error.
    pub fn from_provider_error(flow: FlowKind, err: &ProviderError) -> Self {
        tracing::error!(flow = %flow, error = %err, "provider call failed");
        if err.status() == Some(429) || looks_rate_limited(&err.to_string()) {
            Self::rate_limited()
        } else {
            Self::server_error()
        }
    }
}

/// Case-insensitive match for the throttling vocabulary providers use.
fn looks_rate_limited(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ["rate", "too many", "exceed"]
        .iter()
        .any(|needle| lowered.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_vocabulary_is_detected_case_insensitively() {
        assert!(looks_rate_limited("Rate limit exceeded"));
        assert!(looks_rate_limited("TOO MANY requests"));
        assert!(looks_rate_limited("quota EXCEEDed"));
        assert!(!looks_rate_limited("connection refused"));
    }

    #[test]
    fn provider_429_is_rate_limited_even_without_vocabulary() {
        let err = ProviderError::http("email", 429, "slow down");
        let outcome = DispatchOutcome::from_provider_error(FlowKind::MagicLink, &err);
        assert_eq!(outcome.class, OutcomeClass::RateLimited);
        assert_eq!(outcome.status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn other_provider_errors_are_server_errors() {
        let err = ProviderError::http("identity", 502, "upstream down");
        let outcome = DispatchOutcome::from_provider_error(FlowKind::Signup, &err);
        assert_eq!(outcome.class, OutcomeClass::ServerError);
        assert!(!outcome.success);
    }
}
