use crate::domain::user::models::PersonName;

/// Password reset message, ready for the mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordEmail {
    pub subject: String,
    pub body: String,
}

impl ResetPasswordEmail {
    pub const SUBJECT: &'static str = "Reset Password";

    pub fn new(first_name: &PersonName, link: &str, valid_for_minutes: i64) -> Self {
        let body = format!(
            "Hi {first_name},\n\n\
             We received a request to reset the password for your account.\n\
             Follow the link below to choose a new one:\n\n\
             {link}\n\n\
             The link expires in {valid_for_minutes} minutes. If you did not ask \
             for a reset you can ignore this email; your password stays the same.\n"
        );

        Self {
            subject: Self::SUBJECT.to_string(),
            body,
        }
    }
}

/// Append the token as a `token` query parameter.
///
/// Tokens are base64url segments joined by dots, so they need no escaping.
pub fn reset_link(base_url: &str, token: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}token={token}")
}
