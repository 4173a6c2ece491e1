use std::sync::Arc;

use tracing::{info, instrument, warn};

use concierge_providers::{
    ActionLinkSpec, EmailSender, IdentityProvider, OutboundEmail, Provisioned, RecordStore,
};

use crate::domain::flow::FlowKind;
use crate::domain::outcome::DispatchOutcome;
use crate::domain::template;
use crate::domain::validate::is_valid_email;

const NEWSLETTER_TABLE: &str = "newsletter_subscribers";

/// Dispatcher configuration, passed in explicitly at construction time.
/// The dispatcher never reads ambient environment state.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub sender_address: String,
    pub sender_name: String,
    pub admin_recipients: Vec<String>,
}

impl DispatcherConfig {
    /// RFC 5322 `From` header value.
    pub fn from_header(&self) -> String {
        if self.sender_name.trim().is_empty() {
            self.sender_address.clone()
        } else {
            format!("{} <{}>", self.sender_name, self.sender_address)
        }
    }
}

/// Signup-only extras forwarded to the identity provider.
#[derive(Debug, Clone)]
pub struct SignupPayload {
    pub password: String,
    pub metadata: Option<serde_json::Value>,
}

/// One dispatch invocation's input, assembled by the API layer.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Subject address. Ignored for email-change, where the subject comes
    /// from the resolved session.
    pub email: String,
    /// Caller-supplied redirect target; empty or absent falls back to the
    /// flow default under `origin`.
    pub redirect_to: Option<String>,
    /// Origin the defaults are built from (request `Origin` header or the
    /// configured public origin).
    pub origin: String,
    pub signup: Option<SignupPayload>,
    pub new_email: Option<String>,
    pub bearer_token: Option<String>,
}

impl DispatchRequest {
    pub fn for_email(email: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            redirect_to: None,
            origin: origin.into(),
            signup: None,
            new_email: None,
            bearer_token: None,
        }
    }
}

/// Result of one best-effort side effect. The caller logs failures and
/// moves on; these never flip a dispatch outcome.
#[derive(Debug, Clone)]
pub struct BestEffortOutcome {
    pub operation: &'static str,
    pub ok: bool,
    pub detail: Option<String>,
}

impl BestEffortOutcome {
    fn succeeded(operation: &'static str) -> Self {
        Self {
            operation,
            ok: true,
            detail: None,
        }
    }

    fn failed(operation: &'static str, detail: impl Into<String>) -> Self {
        Self {
            operation,
            ok: false,
            detail: Some(detail.into()),
        }
    }
}

/// Orchestrates the shared dispatch pipeline: validate, resolve identity
/// (email-change only), mint the action link, render, send.
pub struct LinkDispatcher {
    identity: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn EmailSender>,
    newsletter: Provisioned<Arc<dyn RecordStore>>,
    config: DispatcherConfig,
}

impl LinkDispatcher {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn EmailSender>,
        newsletter: Provisioned<Arc<dyn RecordStore>>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            identity,
            mailer,
            newsletter,
            config,
        }
    }

    /// Run one flow end to end.
    ///
    /// Validation failures return before any external call. Once the link
    /// has been minted, a failed send still reports failure; the link is
    /// discarded, never surfaced to the user.
    #[instrument(skip_all, fields(flow = %flow))]
    pub async fn dispatch(&self, flow: FlowKind, req: DispatchRequest) -> DispatchOutcome {
        let (subject_email, recipient) = match self.resolve_subject(flow, &req).await {
            Ok(pair) => pair,
            Err(outcome) => return outcome,
        };

        let redirect_to = resolve_redirect(flow, &req);

        let mut spec = ActionLinkSpec::new(flow.link_kind(), subject_email, redirect_to);
        if flow == FlowKind::EmailChange {
            spec.new_email = req.new_email.clone();
        }
        if let Some(signup) = &req.signup {
            spec.password = Some(signup.password.clone());
            spec.data = signup.metadata.clone();
        }

        let link = match self.identity.generate_action_link(&spec).await {
            Ok(link) => link,
            Err(e) => return DispatchOutcome::from_provider_error(flow, &e),
        };

        let rendered = template::render(flow, &link.url);
        let message = OutboundEmail {
            from: self.config.from_header(),
            to: vec![recipient],
            subject: rendered.subject,
            html: rendered.html,
            text: Some(rendered.text),
        };

        match self.mailer.send(&message).await {
            Ok(id) => {
                info!(message_id = %id.0, "dispatched action link email");
                DispatchOutcome::ok()
            }
            Err(e) => DispatchOutcome::from_provider_error(flow, &e),
        }
    }

    /// Figure out whose account the flow acts on and where the email goes.
    async fn resolve_subject(
        &self,
        flow: FlowKind,
        req: &DispatchRequest,
    ) -> Result<(String, String), DispatchOutcome> {
        if flow != FlowKind::EmailChange {
            let email = req.email.trim();
            if !is_valid_email(email) {
                return Err(DispatchOutcome::invalid("Invalid email"));
            }
            return Ok((email.to_owned(), email.to_owned()));
        }

        // Shape-check the new address before any provider round-trip.
        let new_email = req.new_email.as_deref().unwrap_or("").trim().to_owned();
        if !is_valid_email(&new_email) {
            return Err(DispatchOutcome::invalid("Invalid email"));
        }

        let Some(token) = req.bearer_token.as_deref().filter(|t| !t.trim().is_empty()) else {
            return Err(DispatchOutcome::unauthorized("Missing bearer token"));
        };
        let user = match self.identity.resolve_session(token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(flow = %flow, error = %e, "session resolution failed");
                return Err(DispatchOutcome::unauthorized("Invalid or expired session"));
            }
        };
        let Some(current_email) = user.email.filter(|e| !e.is_empty()) else {
            return Err(DispatchOutcome::unauthorized(
                "Session has no email on file",
            ));
        };

        // The confirmation goes to the address being added.
        Ok((current_email, new_email))
    }

    /// Post-signup extras: newsletter subscription and an internal
    /// notification. Both best-effort.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn signup_side_effects(&self, email: &str) -> Vec<BestEffortOutcome> {
        let mut outcomes = Vec::new();

        match self.newsletter.get() {
            Ok(store) => {
                let row = serde_json::json!({ "email": email });
                match store.insert(NEWSLETTER_TABLE, vec![row]).await {
                    Ok(()) => outcomes.push(BestEffortOutcome::succeeded("newsletter_subscribe")),
                    Err(e) => outcomes
                        .push(BestEffortOutcome::failed("newsletter_subscribe", e.to_string())),
                }
            }
            Err(e) => {
                outcomes.push(BestEffortOutcome::failed(
                    "newsletter_subscribe",
                    e.to_string(),
                ));
            }
        }

        if !self.config.admin_recipients.is_empty() {
            let message = OutboundEmail {
                from: self.config.from_header(),
                to: self.config.admin_recipients.clone(),
                subject: "New member signup".to_owned(),
                html: format!("<p>New signup: {email}</p>"),
                text: Some(format!("New signup: {email}\n")),
            };
            match self.mailer.send(&message).await {
                Ok(_) => outcomes.push(BestEffortOutcome::succeeded("admin_notification")),
                Err(e) => {
                    outcomes.push(BestEffortOutcome::failed("admin_notification", e.to_string()));
                }
            }
        }

        outcomes
    }
}

/// Caller-supplied target wins; otherwise `{origin}{flow suffix}`.
fn resolve_redirect(flow: FlowKind, req: &DispatchRequest) -> String {
    if let Some(target) = req.redirect_to.as_deref() {
        let target = target.trim();
        if !target.is_empty() {
            return target.to_owned();
        }
    }
    format!(
        "{}{}",
        req.origin.trim_end_matches('/'),
        flow.default_redirect_suffix()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_header_includes_display_name_when_set() {
        let config = DispatcherConfig {
            sender_address: "hello@example.com".to_owned(),
            sender_name: "Concierge".to_owned(),
            admin_recipients: vec![],
        };
        assert_eq!(config.from_header(), "Concierge <hello@example.com>");

        let bare = DispatcherConfig {
            sender_address: "hello@example.com".to_owned(),
            sender_name: String::new(),
            admin_recipients: vec![],
        };
        assert_eq!(bare.from_header(), "hello@example.com");
    }

    #[test]
    fn redirect_prefers_caller_target() {
        let mut req = DispatchRequest::for_email("user@example.com", "https://app.example.com/");
        req.redirect_to = Some("https://app.example.com/welcome".to_owned());
        assert_eq!(
            resolve_redirect(FlowKind::Signup, &req),
            "https://app.example.com/welcome"
        );

        req.redirect_to = Some("   ".to_owned());
        assert_eq!(
            resolve_redirect(FlowKind::PasswordReset, &req),
            "https://app.example.com/reset-password"
        );
    }
}
