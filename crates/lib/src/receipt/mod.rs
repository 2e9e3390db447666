//! Receipt capture and lookup.
//!
//! A receipt is the photo of a signed delivery counterfoil ("canhoto"),
//! stored against its invoice number together with the capture time.

pub mod errors;
pub mod invoice;
pub mod photo;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use errors::ReceiptError;
pub use invoice::InvoiceNumber;

use crate::clock::{Clock, SystemClock};
use crate::store::{self, SqlxStore, StoreError};
use crate::{Error, Result};

/// A stored receipt photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub invoice: InvoiceNumber,
    /// JPEG bytes, always 3-channel.
    pub image: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

/// A receipt without its image, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub invoice: InvoiceNumber,
    pub captured_at: DateTime<Utc>,
}

/// Existence check, save, count and lookup of receipts.
#[derive(Debug, Clone)]
pub struct ReceiptService {
    store: SqlxStore,
    clock: Arc<dyn Clock>,
}

impl ReceiptService {
    /// Create a service stamping receipts with the system time.
    pub fn new(store: SqlxStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a service with an explicit time source.
    pub fn with_clock(store: SqlxStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Whether a receipt is stored for this invoice number.
    pub async fn exists(&self, invoice: &InvoiceNumber) -> Result<bool> {
        store::receipts::exists(&self.store, invoice).await
    }

    /// Normalize an uploaded photo to JPEG and store it with the current time.
    ///
    /// Fails with [`ReceiptError::AlreadyStored`] when the invoice number
    /// already has a receipt, including when another capture of the same
    /// number committed first. Nothing is written on failure.
    pub async fn save(&self, invoice: &InvoiceNumber, upload: Vec<u8>) -> Result<Receipt> {
        let upload_len = upload.len();
        let image = tokio::task::spawn_blocking(move || photo::normalize_to_jpeg(&upload))
            .await
            .map_err(|e| ReceiptError::ImageEncode {
                reason: format!("image task failed: {e}"),
            })??;

        let receipt = Receipt {
            invoice: invoice.clone(),
            image,
            captured_at: self.clock.now(),
        };

        match store::receipts::insert(&self.store, &receipt).await {
            Ok(()) => {
                tracing::info!(
                    invoice = %invoice,
                    upload_bytes = upload_len,
                    stored_bytes = receipt.image.len(),
                    "Receipt saved"
                );
                Ok(receipt)
            }
            Err(Error::Store(StoreError::UniqueViolation { .. })) => {
                tracing::warn!(invoice = %invoice, "Receipt already stored, capture rejected");
                Err(ReceiptError::AlreadyStored {
                    invoice: invoice.to_string(),
                }
                .into())
            }
            Err(e) => {
                tracing::error!(invoice = %invoice, "Failed to save receipt: {e}");
                Err(e)
            }
        }
    }

    /// Total number of stored receipts.
    pub async fn count(&self) -> Result<u64> {
        let count = store::receipts::count(&self.store).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Look up the receipt for an invoice number. `None` is a normal outcome.
    pub async fn find(&self, invoice: &InvoiceNumber) -> Result<Option<Receipt>> {
        store::receipts::find(&self.store, invoice).await
    }

    /// The most recent captures, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<ReceiptSummary>> {
        store::receipts::list(&self.store, i64::from(limit)).await
    }
}

