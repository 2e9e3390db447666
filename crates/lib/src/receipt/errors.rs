//! Error types for receipt capture and lookup
use thiserror::Error;

/// Errors raised while capturing or looking up receipts.
#[derive(Error, Debug)]
pub enum ReceiptError {
    /// The invoice number is not a positive run of digits.
    #[error("Invalid invoice number {input:?}: {reason}")]
    InvalidInvoiceNumber {
        /// The text the operator entered
        input: String,
        /// Which rule the input broke
        reason: &'static str,
    },

    /// A photo for this invoice is already archived.
    #[error("A receipt for invoice {invoice} is already stored")]
    AlreadyStored {
        /// The normalized invoice number
        invoice: String,
    },

    /// The upload carried no bytes.
    #[error("No image was uploaded")]
    EmptyUpload,

    /// The upload is not a readable JPEG or PNG.
    #[error("Unreadable image: {reason}")]
    ImageDecode {
        /// Decoder message
        reason: String,
    },

    /// Re-encoding the photo as JPEG failed.
    #[error("Image encoding failed: {reason}")]
    ImageEncode {
        /// Encoder message
        reason: String,
    },
}

impl ReceiptError {
    /// Check if this error was caused by operator input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ReceiptError::InvalidInvoiceNumber { .. }
                | ReceiptError::EmptyUpload
                | ReceiptError::ImageDecode { .. }
        )
    }

    /// Check if this error reports an existing receipt.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReceiptError::AlreadyStored { .. })
    }
}

impl From<ReceiptError> for crate::Error {
    fn from(err: ReceiptError) -> Self {
        crate::Error::Receipt(err)
    }
}
