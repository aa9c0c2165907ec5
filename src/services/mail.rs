// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound mail.
//!
//! The password reset workflow hands a [`MailMessage`] to a [`Mailer`] and
//! does not retry: a failure is reported once and logged. Senders are
//! synchronous and are driven from the blocking pool by [`deliver`].

use crate::config::SmtpConfig;
use crate::error::AppError;
use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);
const STARTTLS_PORT: u16 = 587;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Mail delivery abstraction.
pub trait Mailer: Send + Sync {
    /// Deliver a message or report why it could not be sent.
    fn send(&self, message: &MailMessage) -> anyhow::Result<()>;
}

/// Send `message` on the blocking pool.
pub async fn deliver(mailer: Arc<dyn Mailer>, message: MailMessage) -> Result<(), AppError> {
    let to = message.to.clone();
    let subject = message.subject.clone();

    let result = tokio::task::spawn_blocking(move || mailer.send(&message))
        .await
        .map_err(|e| AppError::MailDelivery(format!("mail task failed: {}", e)))?;

    match result {
        Ok(()) => {
            tracing::info!(to = %to, subject = %subject, "Mail sent");
            Ok(())
        }
        Err(e) => Err(AppError::MailDelivery(format!("{:#}", e))),
    }
}

// ─── Senders ─────────────────────────────────────────────────

/// SMTP relay sender.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Build a pooled SMTP transport. Port 587 uses STARTTLS, anything else implicit TLS.
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let builder = if config.port == STARTTLS_PORT {
            SmtpTransport::starttls_relay(&config.host)
        } else {
            SmtpTransport::relay(&config.host)
        }
        .with_context(|| format!("invalid SMTP relay {}", config.host))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(message.from.parse().context("invalid from address")?)
            .to(message.to.parse().context("invalid to address")?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .context("failed to build message")?;

        self.transport.send(&email).context("SMTP send failed")?;
        Ok(())
    }
}

/// Local dev sender that logs instead of sending. The body is not logged
/// because it may carry a reset token.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "SMTP not configured, mail not sent"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory. Used by tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<MailMessage>>,
    fail: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("mail relay unavailable");
        }
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("mailbox lock poisoned"))?
            .push(message.clone());
        Ok(())
    }
}

// ─── Templates ───────────────────────────────────────────────

/// Email carrying the password reset link.
pub fn reset_link_message(from: &str, to: &str, reset_url: &str) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        from: from.to_string(),
        subject: "YelpCamp Password Reset".to_string(),
        body: format!(
            "You are receiving this because you (or someone else) have requested the reset \
             of the password for your account.\n\n\
             Please click on the following link, or paste this into your browser to complete \
             the process:\n\n\
             {}\n\n\
             If you did not request this, please ignore this email and your password will \
             remain unchanged.\n",
            reset_url
        ),
    }
}

/// Email confirming a completed password change.
pub fn reset_confirmation_message(from: &str, to: &str) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        from: from.to_string(),
        subject: "Your password has been changed".to_string(),
        body: format!(
            "Hello,\n\n\
             This is a confirmation that the password for your account {} has just been \
             changed.\n",
            to
        ),
    }
}
