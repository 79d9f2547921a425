//! Outgoing mail via SMTP.
//!
//! Sends the verification and password reset mails. When SMTP is not
//! configured every send fails with [`MailError::NotConfigured`]; the
//! registration path treats that like any other delivery failure and rolls
//! the registration back.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use torque_core::Email;

use crate::config::SmtpConfig;

/// Errors that can occur when sending mail.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// No SMTP configuration was provided.
    #[error("SMTP is not configured")]
    NotConfigured,

    /// An address could not be parsed.
    #[error("invalid mail address: {0}")]
    Address(String),

    /// The message could not be built.
    #[error("failed to build message: {0}")]
    Build(String),

    /// The SMTP transport rejected the message.
    #[error("failed to send mail: {0}")]
    Send(String),
}

/// Outgoing mail sender.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl Mailer {
    /// Build a mailer from the optional SMTP configuration.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the relay host or from address is invalid.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, MailError> {
        let Some(smtp) = smtp else {
            return Ok(Self {
                transport: None,
                from: None,
            });
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| MailError::Send(e.to_string()))?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.expose_secret().to_owned(),
            ))
            .build();

        let from = smtp
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(e.to_string()))?;

        Ok(Self {
            transport: Some(transport),
            from: Some(from),
        })
    }

    /// Send the email verification mail.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if SMTP is not configured or delivery fails.
    pub async fn send_verification(&self, to: &Email, link: &str) -> Result<(), MailError> {
        let body = format!(
            "Welcome to Torque!\n\n\
             Please verify your email address by clicking the link below:\n\
             {link}\n\n\
             This link will expire in 24 hours.\n\n\
             If you didn't create an account, please ignore this email."
        );
        self.send(to, "Email Verification - Torque", body).await
    }

    /// Send the password reset mail.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if SMTP is not configured or delivery fails.
    pub async fn send_password_reset(&self, to: &Email, link: &str) -> Result<(), MailError> {
        let body = format!(
            "To reset your password, click the link below:\n\
             {link}\n\
             This link will expire in 1 hour."
        );
        self.send(to, "Password Reset Request", body).await
    }

    async fn send(&self, to: &Email, subject: &str, body: String) -> Result<(), MailError> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            return Err(MailError::NotConfigured);
        };

        let to = to
            .as_str()
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(subject)
            .body(body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_mailer_refuses_to_send() {
        let mailer = Mailer::from_config(None).expect("mailer");
        let to = Email::parse("rider@example.com").expect("email");
        let result = mailer.send_verification(&to, "http://localhost/verify").await;
        assert!(matches!(result, Err(MailError::NotConfigured)));
    }
}
