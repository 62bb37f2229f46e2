//! Fixed transactional email templates.
//!
//! Values are interpolated verbatim; callers pass codes or links they
//! generated themselves, never user-controlled markup.

pub const VERIFICATION_CODE_SUBJECT: &str = "Your verification code";
pub const PASSWORD_RESET_SUBJECT: &str = "Password reset request";

/// Subject and HTML body of a templated email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: &'static str,
    pub html: String,
}

pub fn verification_code(code: &str) -> RenderedEmail {
    RenderedEmail {
        subject: VERIFICATION_CODE_SUBJECT,
        html: format!(
            "<p>Your verification code is <strong>{}</strong>. It will expire in 10 minutes.</p>",
            code
        ),
    }
}

pub fn password_reset(code_or_link: &str) -> RenderedEmail {
    RenderedEmail {
        subject: PASSWORD_RESET_SUBJECT,
        html: format!(
            "<p>We received a request to reset your password. Use the code below or click the link:</p><p><strong>{}</strong></p>",
            code_or_link
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_code_template() {
        let email = verification_code("482913");
        assert_eq!(email.subject, "Your verification code");
        assert!(email.html.contains("<strong>482913</strong>"));
    }

    #[test]
    fn test_password_reset_template() {
        let email = password_reset("https://x/reset/abc");
        assert_eq!(email.subject, "Password reset request");
        assert!(email.html.contains("https://x/reset/abc"));
    }
}
