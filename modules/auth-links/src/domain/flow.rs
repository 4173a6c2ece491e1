use std::fmt;

use concierge_providers::LinkKind;

/// The four transactional flows, each with a fixed subject, preheader, and
/// default redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Signup,
    MagicLink,
    PasswordReset,
    EmailChange,
}

impl FlowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::MagicLink => "magic-link",
            Self::PasswordReset => "password-reset",
            Self::EmailChange => "email-change",
        }
    }

    pub fn subject(self) -> &'static str {
        match self {
            Self::Signup => "Confirm your signup",
            Self::MagicLink => "Your magic sign-in link",
            Self::PasswordReset => "Reset your password",
            Self::EmailChange => "Confirm your email change",
        }
    }

    /// Hidden preview text rendered ahead of the visible body.
    pub fn preheader(self) -> &'static str {
        match self {
            Self::Signup => "Confirm your signup and complete your account setup",
            Self::MagicLink => "Sign in securely with your one-time magic link",
            Self::PasswordReset => "Use this link to reset your password",
            Self::EmailChange => "Confirm your email change",
        }
    }

    /// Path appended to the request origin when the caller supplies no
    /// redirect target.
    pub fn default_redirect_suffix(self) -> &'static str {
        match self {
            Self::PasswordReset => "/reset-password",
            Self::Signup | Self::MagicLink | Self::EmailChange => "/login",
        }
    }

    /// Wire name the identity provider expects for this flow.
    pub fn link_kind(self) -> LinkKind {
        match self {
            Self::Signup => LinkKind::Signup,
            Self::MagicLink => LinkKind::Magiclink,
            Self::PasswordReset => LinkKind::Recovery,
            Self::EmailChange => LinkKind::EmailChangeNew,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_suffixes_match_the_flow_table() {
        assert_eq!(FlowKind::Signup.default_redirect_suffix(), "/login");
        assert_eq!(FlowKind::MagicLink.default_redirect_suffix(), "/login");
        assert_eq!(
            FlowKind::PasswordReset.default_redirect_suffix(),
            "/reset-password"
        );
        assert_eq!(FlowKind::EmailChange.default_redirect_suffix(), "/login");
    }

    #[test]
    fn subjects_match_the_flow_table() {
        assert_eq!(FlowKind::Signup.subject(), "Confirm your signup");
        assert_eq!(FlowKind::MagicLink.subject(), "Your magic sign-in link");
        assert_eq!(FlowKind::PasswordReset.subject(), "Reset your password");
        assert_eq!(FlowKind::EmailChange.subject(), "Confirm your email change");
    }
}
