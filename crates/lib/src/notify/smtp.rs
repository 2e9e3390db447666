//! SMTP relay transport (STARTTLS + login) built on lettre.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailTransport, NotifyError, OutgoingEmail};
use crate::Result;

/// Default submission port for STARTTLS relays.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Relay connection settings.
///
/// The sender address doubles as the relay login, as with most hosted
/// mailboxes.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    /// Per-command network timeout; `None` keeps lettre's default.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Sends e-mails through an authenticated STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    relay: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let sender: Mailbox = config
            .sender
            .parse()
            .map_err(|_| NotifyError::InvalidSender {
                address: config.sender.clone(),
            })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::RelayConfig {
                reason: format!("{}: {e}", config.host),
            })?
            .port(config.port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .timeout(config.timeout)
            .build();

        Ok(Self {
            transport,
            sender,
            relay: format!("{}:{}", config.host, config.port),
        })
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("relay", &self.relay)
            .field("sender", &self.sender.to_string())
            .finish()
    }
}

/// Build the MIME message: an HTML part followed by the attachment.
pub fn build_message(sender: &Mailbox, email: &OutgoingEmail) -> Result<Message> {
    let to: Mailbox = email
        .to
        .as_str()
        .parse()
        .map_err(|_| NotifyError::InvalidRecipient {
            address: email.to.to_string(),
        })?;

    let content_type =
        ContentType::parse(&email.attachment.content_type).map_err(|e| NotifyError::Message {
            reason: format!("bad attachment type {}: {e}", email.attachment.content_type),
        })?;

    let message = Message::builder()
        .from(sender.clone())
        .to(to)
        .subject(email.subject.as_str())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(email.html_body.clone()))
                .singlepart(
                    MimeAttachment::new(email.attachment.filename.clone())
                        .body(email.attachment.bytes.clone(), content_type),
                ),
        )
        .map_err(|e| NotifyError::Message {
            reason: e.to_string(),
        })?;

    Ok(message)
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<()> {
        let message = build_message(&self.sender, email)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport {
                reason: format!("{}: {e}", self.relay),
            })?;

        tracing::debug!(relay = %self.relay, code = %response.code(), "Relay accepted message");
        Ok(())
    }
}
