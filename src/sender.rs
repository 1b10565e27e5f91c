//! Outbound email delivery — SMTP via lettre.
//!
//! The pipeline treats delivery as a black box behind [`OutboundSender`]:
//! it hands over `(to, subject, body)` and records success or failure.
//! No retries happen here; the workflow logs the outcome and moves on.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

use crate::error::SendError;

// ── Configuration ───────────────────────────────────────────────────

/// SMTP relay settings and credentials, built from environment variables.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: SecretString,
}

impl SmtpConfig {
    /// Build config from environment variables.
    /// Returns `None` if `EMAIL_SENDER` or `EMAIL_PASSWORD` is not set
    /// (outbound email disabled).
    pub fn from_env() -> Option<Self> {
        let sender = std::env::var("EMAIL_SENDER").ok()?;
        let password = std::env::var("EMAIL_PASSWORD").ok()?;

        let host =
            std::env::var("EMAIL_SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());

        let port: u16 = std::env::var("EMAIL_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        Some(Self {
            host,
            port,
            sender,
            password: SecretString::from(password),
        })
    }
}

/// Loose shape check for a recipient address before attempting delivery.
pub fn looks_like_email(address: &str) -> bool {
    !address.is_empty() && address.contains('@') && address.contains('.')
}

// ── Sender trait ────────────────────────────────────────────────────

/// Outbound delivery capability for rendered drafts.
#[async_trait]
pub trait OutboundSender: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError>;
}

// ── SMTP sender ─────────────────────────────────────────────────────

/// Delivers drafts through an SMTP relay.
pub struct SmtpSender {
    config: Option<SmtpConfig>,
}

impl SmtpSender {
    pub fn new(config: Option<SmtpConfig>) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(SmtpConfig::from_env())
    }
}

/// Build and send one message over SMTP (blocking — run in spawn_blocking).
fn deliver(config: &SmtpConfig, to: &str, subject: &str, body: &str) -> Result<(), SendError> {
    let creds = Credentials::new(
        config.sender.clone(),
        config.password.expose_secret().to_string(),
    );

    let transport = SmtpTransport::relay(&config.host)
        .map_err(|e| SendError::Transport(format!("SMTP relay error: {e}")))?
        .port(config.port)
        .credentials(creds)
        .build();

    let email = Message::builder()
        .from(
            config
                .sender
                .parse()
                .map_err(|e| SendError::MessageBuild(format!("Invalid from address: {e}")))?,
        )
        .to(to
            .parse()
            .map_err(|e| SendError::MessageBuild(format!("Invalid to address: {e}")))?)
        .subject(subject)
        .body(body.to_string())
        .map_err(|e| SendError::MessageBuild(format!("Failed to build email: {e}")))?;

    transport
        .send(&email)
        .map_err(|e| SendError::Transport(e.to_string()))?;

    Ok(())
}

#[async_trait]
impl OutboundSender for SmtpSender {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError> {
        let Some(config) = self.config.clone() else {
            return Err(SendError::NotConfigured);
        };
        if !looks_like_email(to) {
            return Err(SendError::InvalidRecipient);
        }

        let recipient = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();
        tokio::task::spawn_blocking(move || deliver(&config, &recipient, &subject, &body))
            .await
            .map_err(|e| SendError::Transport(format!("Send task failed: {e}")))??;

        tracing::info!("Email sent to {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            sender: "insights@example.com".to_string(),
            password: SecretString::from("hunter2"),
        }
    }

    #[test]
    fn looks_like_email_accepts_plausible_addresses() {
        assert!(looks_like_email("team@example.com"));
        assert!(looks_like_email("a.b@c.d"));
    }

    #[test]
    fn looks_like_email_rejects_malformed_addresses() {
        assert!(!looks_like_email(""));
        assert!(!looks_like_email("no-at-sign.com"));
        assert!(!looks_like_email("missing@dot"));
    }

    #[tokio::test]
    async fn unconfigured_sender_reports_missing_credentials() {
        let sender = SmtpSender::new(None);
        let err = sender.send("team@example.com", "subject", "body").await;
        assert!(matches!(err, Err(SendError::NotConfigured)));
        assert_eq!(
            err.unwrap_err().to_string(),
            "Missing email credentials (EMAIL_SENDER or EMAIL_PASSWORD) in environment."
        );
    }

    #[tokio::test]
    async fn bad_recipient_is_rejected_before_any_transport_work() {
        let sender = SmtpSender::new(Some(make_config()));
        let err = sender.send("not-an-address", "subject", "body").await;
        assert!(matches!(err, Err(SendError::InvalidRecipient)));
        assert_eq!(
            err.unwrap_err().to_string(),
            "Invalid recipient email address."
        );
    }
}
