//! Error types for outbound mail
use thiserror::Error;

/// Errors raised while building or sending a receipt e-mail.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The recipient is not a plain `local@host.domain` address.
    #[error("Invalid recipient address: {address}")]
    InvalidRecipient {
        /// The address as entered
        address: String,
    },

    /// The configured sender address cannot be used as a mailbox.
    #[error("Invalid sender address: {address}")]
    InvalidSender {
        /// The configured sender
        address: String,
    },

    /// The relay host or TLS settings could not be applied.
    #[error("Mail relay configuration error: {reason}")]
    RelayConfig {
        /// Description of the configuration failure
        reason: String,
    },

    /// The MIME message could not be assembled.
    #[error("Could not build e-mail: {reason}")]
    Message {
        /// Description of the build failure
        reason: String,
    },

    /// The relay refused the message or could not be reached.
    #[error("Mail relay rejected or failed the send: {reason}")]
    Transport {
        /// Connection, TLS, authentication or SMTP reply detail
        reason: String,
    },
}

impl NotifyError {
    /// Check if the relay itself failed (connect, TLS, auth or SMTP reply).
    pub fn is_transport_error(&self) -> bool {
        matches!(self, NotifyError::Transport { .. })
    }

    /// Check if this error was caused by operator input.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, NotifyError::InvalidRecipient { .. })
    }
}

impl From<NotifyError> for crate::Error {
    fn from(err: NotifyError) -> Self {
        crate::Error::Notify(err)
    }
}
