//! Password reset delivery via SMTP.
//!
//! The transport is built once from configuration and reused for every
//! message.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::SmtpConfig;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::Mailer;
use crate::user::errors::MailerError;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the SMTP transport.
    ///
    /// # Errors
    /// * `InvalidAddress` - `from_address` is not a valid mailbox
    /// * `DeliveryFailed` - Relay host could not be configured for TLS
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e: lettre::address::AddressError| {
                MailerError::InvalidAddress(e.to_string())
            })?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailerError::DeliveryFailed(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let mut builder = builder.port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(
        &self,
        to: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<Message, MailerError> {
        let to: Mailbox = to
            .as_str()
            .parse()
            .map_err(|e: lettre::address::AddressError| {
                MailerError::InvalidAddress(e.to_string())
            })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailerError::BuildFailed(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), MailerError> {
        let message = self.build_message(to, subject, body)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::DeliveryFailed(e.to_string()))?;

        tracing::debug!(to = %to, subject, "Email delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(from_address: &str) -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            starttls: false,
            from_address: from_address.to_string(),
            username: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_from_address() {
        let result = SmtpMailer::new(&config("not an address"));
        assert!(matches!(result, Err(MailerError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_build_message_headers() {
        let mailer = SmtpMailer::new(&config("Accounts <noreply@example.com>")).unwrap();
        let to = EmailAddress::new("ada@x.com").unwrap();

        let message = mailer
            .build_message(&to, "Reset Password", "Hi Ada")
            .unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("To: ada@x.com"));
        assert!(formatted.contains("Subject: Reset Password"));
        assert!(formatted.contains("noreply@example.com"));
    }

    #[test]
    fn test_mailer_error_display() {
        let err = MailerError::BuildFailed("missing body".to_string());
        assert_eq!(err.to_string(), "Failed to build message: missing body");
    }
}
