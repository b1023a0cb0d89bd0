//! SMTP delivery backend implementation.
//!
//! Delivers login codes as plain-text emails over an authenticated
//! STARTTLS connection. Connection parameters come from an
//! [`SmtpConfig`], either built directly or read from the environment.

use crate::AuthError;
use crate::otp::notifier::Notifier;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// Connection parameters for the SMTP delivery backend.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Hostname of the SMTP relay.
    pub host: String,
    /// Relay port; 587 is the usual STARTTLS submission port.
    pub port: u16,
    /// Username for SMTP authentication.
    pub username: String,
    /// Password for SMTP authentication.
    pub password: String,
    /// Sender address placed in the `From` header.
    pub from: String,
}

impl SmtpConfig {
    /// Loads the configuration from environment variables.
    ///
    /// | Variable | Required | Default |
    /// |----------|----------|---------|
    /// | `OTP_AUTH_SMTP_HOST` | yes | - |
    /// | `OTP_AUTH_SMTP_PORT` | no | `587` |
    /// | `OTP_AUTH_SMTP_USER` | yes | - |
    /// | `OTP_AUTH_SMTP_PASS` | yes | - |
    /// | `OTP_AUTH_SMTP_FROM` | no | `no-reply@example.com` |
    pub fn from_env() -> Result<Self, AuthError> {
        let host = std::env::var("OTP_AUTH_SMTP_HOST")
            .map_err(|_| AuthError::internal("OTP_AUTH_SMTP_HOST is not set"))?;
        let port = match std::env::var("OTP_AUTH_SMTP_PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| {
                AuthError::internal(format!("Invalid OTP_AUTH_SMTP_PORT value: {value}"))
            })?,
            Err(_) => 587,
        };
        let username = std::env::var("OTP_AUTH_SMTP_USER")
            .map_err(|_| AuthError::internal("OTP_AUTH_SMTP_USER is not set"))?;
        let password = std::env::var("OTP_AUTH_SMTP_PASS")
            .map_err(|_| AuthError::internal("OTP_AUTH_SMTP_PASS is not set"))?;
        let from = std::env::var("OTP_AUTH_SMTP_FROM")
            .unwrap_or_else(|_| "no-reply@example.com".to_string());

        Ok(Self {
            host,
            port,
            username,
            password,
            from,
        })
    }
}

/// Builds the plain-text body for a login-code email.
fn login_code_body(code: &str, valid_for: Duration) -> String {
    format!(
        "Your OTP for login is: {}. It will expire in {} minutes.",
        code,
        valid_for.as_secs() / 60
    )
}

/// SMTP implementation of [`Notifier`].
///
/// Holds a pooled async transport, so one instance can be shared by
/// every issued code for the lifetime of the service.
///
/// # Example
///
/// ```rust
/// use otp_auth::smtp::{SmtpConfig, SmtpNotifier};
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), otp_auth::AuthError> {
/// let notifier = Arc::new(SmtpNotifier::new(SmtpConfig {
///     host: "smtp.example.com".to_string(),
///     port: 587,
///     username: "mailer".to_string(),
///     password: "secret".to_string(),
///     from: "no-reply@example.com".to_string(),
/// })?);
/// # Ok(())
/// # }
/// ```
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Creates a notifier from the given connection parameters.
    ///
    /// Fails with [`AuthError::Internal`] when the sender address does
    /// not parse or the relay hostname is unusable; no connection is
    /// attempted until the first send.
    pub fn new(config: SmtpConfig) -> Result<Self, AuthError> {
        let from = config.from.parse::<Mailbox>().map_err(|e| {
            AuthError::internal(format!("Invalid sender address `{}`: {}", config.from, e))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AuthError::internal(format!("Invalid SMTP relay: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { transport, from })
    }

    /// Creates a notifier from `OTP_AUTH_SMTP_*` environment variables.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::new(SmtpConfig::from_env()?)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: &str, code: &str, valid_for: Duration) -> Result<(), AuthError> {
        let to = email.parse::<Mailbox>().map_err(|e| {
            AuthError::DeliveryFailed(format!("Invalid recipient address `{email}`: {e}"))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your Login OTP")
            .header(ContentType::TEXT_PLAIN)
            .body(login_code_body(code, valid_for))
            .map_err(|e| AuthError::DeliveryFailed(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}
