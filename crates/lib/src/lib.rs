//!
//! Canhoto: a delivery-receipt archive.
//! This library provides the services behind the receipt capture, lookup and
//! e-mail screens.
//!
//! ## Core Concepts
//!
//! * **Store (`store::SqlxStore`)**: The SQL database (SQLite or PostgreSQL) holding
//!   the credential table and the receipt table.
//! * **Auth (`auth::AuthService`)**: Verifies operator credentials against Argon2id hashes.
//! * **Receipts (`receipt::ReceiptService`)**: Existence check, save, count and lookup of
//!   receipt photos keyed by invoice number (`receipt::InvoiceNumber`).
//! * **Notification (`notify::NotificationService`)**: Sends a stored receipt photo as an
//!   e-mail attachment through a mail relay (`notify::MailTransport`).

pub mod auth;
pub mod clock;
pub mod notify;
pub mod receipt;
pub mod store;

pub use auth::AuthService;
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use notify::NotificationService;
pub use receipt::{InvoiceNumber, Receipt, ReceiptService};
pub use store::SqlxStore;

/// Result type used throughout the Canhoto library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Canhoto library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured receipt errors from the receipt module
    #[error(transparent)]
    Receipt(receipt::ReceiptError),

    /// Structured mail errors from the notify module
    #[error(transparent)]
    Notify(notify::NotifyError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Auth(_) => "auth",
            Error::Receipt(_) => "receipt",
            Error::Notify(_) => "notify",
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_unique_violation(),
            Error::Auth(auth_err) => auth_err.is_conflict(),
            Error::Receipt(receipt_err) => receipt_err.is_conflict(),
            Error::Notify(_) => false,
        }
    }

    /// Check if this error was caused by invalid operator input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_validation_error(),
            Error::Receipt(receipt_err) => receipt_err.is_validation_error(),
            Error::Notify(notify_err) => notify_err.is_validation_error(),
            Error::Store(_) => false,
        }
    }

    /// Check if this error is a mail relay (transport-level) failure.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Notify(notify_err) => notify_err.is_transport_error(),
            _ => false,
        }
    }

    /// Check if this error is database/store-related.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}
