//! Outbound e-mail of receipt photos.
//!
//! [`NotificationService`] composes the message; a [`MailTransport`] delivers it.
//! Production uses [`SmtpMailer`] against the configured relay. One send attempt
//! per call: nothing is queued or retried.

pub mod address;
pub mod errors;
#[cfg(any(test, feature = "testing"))]
pub mod recording;
pub mod smtp;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

pub use address::Recipient;
pub use errors::NotifyError;
#[cfg(any(test, feature = "testing"))]
pub use recording::RecordingTransport;
pub use smtp::{SmtpConfig, SmtpMailer};

use crate::Result;
use crate::receipt::{InvoiceNumber, ReceiptService};

/// Subject used when the operator leaves the subject empty.
pub const DEFAULT_SUBJECT: &str = "Canhoto de Nota Fiscal";

/// MIME type of every receipt attachment.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// A file attached to an outgoing e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A fully composed e-mail: HTML body plus exactly one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Recipient,
    pub subject: String,
    pub html_body: String,
    pub attachment: Attachment,
}

/// Delivers composed e-mails.
#[async_trait]
pub trait MailTransport: Send + Sync + Debug {
    /// Make one delivery attempt.
    async fn deliver(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Result of asking for a stored receipt to be e-mailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The relay accepted the message.
    Sent,
    /// No receipt is stored for the invoice number; nothing was sent.
    NoReceipt,
}

/// HTML body of a receipt e-mail.
pub fn receipt_body(invoice: &InvoiceNumber) -> String {
    format!("<p>Segue em anexo o canhoto da Nota Fiscal {invoice}.</p>")
}

fn subject_or_default(subject: &str) -> &str {
    match subject.trim() {
        "" => DEFAULT_SUBJECT,
        s => s,
    }
}

/// The text parts of a receipt e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptEmail {
    pub subject: String,
    pub html_body: String,
    pub attachment_name: String,
}

impl ReceiptEmail {
    /// Compose the e-mail for `invoice`. A blank subject becomes
    /// [`DEFAULT_SUBJECT`].
    pub fn for_receipt(invoice: &InvoiceNumber, subject: &str) -> Self {
        Self {
            subject: subject_or_default(subject).to_string(),
            html_body: receipt_body(invoice),
            attachment_name: invoice.attachment_name(),
        }
    }
}

/// Composes and sends receipt e-mails.
#[derive(Debug, Clone)]
pub struct NotificationService {
    transport: Arc<dyn MailTransport>,
}

impl NotificationService {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Send one e-mail with a single JPEG attachment.
    pub async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        html_body: &str,
        attachment_bytes: Vec<u8>,
        attachment_name: &str,
    ) -> Result<()> {
        let subject = subject_or_default(subject);

        let email = OutgoingEmail {
            to: recipient.clone(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachment: Attachment {
                filename: attachment_name.to_string(),
                content_type: JPEG_CONTENT_TYPE.to_string(),
                bytes: attachment_bytes,
            },
        };

        match self.transport.deliver(&email).await {
            Ok(()) => {
                tracing::info!(
                    to = %recipient,
                    attachment = attachment_name,
                    "E-mail sent"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(to = %recipient, "E-mail not sent: {e}");
                Err(e)
            }
        }
    }

    /// Look up the receipt for `invoice` and e-mail it to `recipient`.
    pub async fn send_receipt(
        &self,
        receipts: &ReceiptService,
        recipient: &Recipient,
        invoice: &InvoiceNumber,
        subject: &str,
    ) -> Result<SendOutcome> {
        let Some(receipt) = receipts.find(invoice).await? else {
            tracing::info!(invoice = %invoice, "No receipt to send");
            return Ok(SendOutcome::NoReceipt);
        };

        let email = ReceiptEmail::for_receipt(invoice, subject);
        self.send(
            recipient,
            &email.subject,
            &email.html_body,
            receipt.image,
            &email.attachment_name,
        )
        .await?;

        Ok(SendOutcome::Sent)
    }
}
