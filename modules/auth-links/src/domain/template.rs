use crate::domain::flow::FlowKind;

/// A rendered message: subject plus HTML and plaintext alternatives.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

fn cta_label(flow: FlowKind) -> &'static str {
    match flow {
        FlowKind::Signup => "Confirm signup",
        FlowKind::MagicLink => "Sign in",
        FlowKind::PasswordReset => "Reset password",
        FlowKind::EmailChange => "Confirm email change",
    }
}

fn body_copy(flow: FlowKind) -> &'static str {
    match flow {
        FlowKind::Signup => {
            "Thanks for joining. Confirm your signup below to finish setting up your account."
        }
        FlowKind::MagicLink => {
            "Use the button below to sign in. The link works once and expires shortly."
        }
        FlowKind::PasswordReset => {
            "We received a request to reset your password. If this wasn't you, ignore this email."
        }
        FlowKind::EmailChange => {
            "Confirm that this address should become the new email on your account."
        }
    }
}

/// Render the flow's email around the action link. The CTA anchor's `href`
/// is the action link verbatim, with a plain URL fallback underneath for
/// clients that strip buttons.
pub fn render(flow: FlowKind, action_link: &str) -> RenderedEmail {
    let subject = flow.subject();
    let preheader = flow.preheader();
    let copy = body_copy(flow);
    let label = cta_label(flow);

    let html = format!(
        r#"<!doctype html>
<html>
  <body style="margin:0;padding:0;background:#f6f5f2;font-family:Georgia,serif;color:#1f1d1a;">
    <span style="display:none;max-height:0;overflow:hidden;">{preheader}</span>
    <table role="presentation" width="100%" cellpadding="0" cellspacing="0">
      <tr><td align="center" style="padding:40px 16px;">
        <table role="presentation" width="560" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;padding:40px;">
          <tr><td>
            <h1 style="font-size:22px;margin:0 0 16px;">{subject}</h1>
            <p style="font-size:15px;line-height:1.6;margin:0 0 28px;">{copy}</p>
            <p style="margin:0 0 28px;">
              <a href="{action_link}" style="background:#1f1d1a;color:#ffffff;text-decoration:none;padding:14px 28px;border-radius:4px;display:inline-block;">{label}</a>
            </p>
            <p style="font-size:13px;color:#6b675f;line-height:1.6;margin:0;">
              If the button doesn't work, copy this link into your browser:<br>
              <a href="{action_link}" style="color:#6b675f;">{action_link}</a>
            </p>
          </td></tr>
        </table>
      </td></tr>
    </table>
  </body>
</html>"#
    );

    let text = format!("{subject}\n\n{copy}\n\n{label}: {action_link}\n");

    RenderedEmail {
        subject: subject.to_owned(),
        html,
        text,
    }
}
