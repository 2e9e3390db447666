//! Receipt table operations.
//!
//! Rows are keyed by the canonical invoice number; the primary key is what
//! guarantees a single photo per invoice, even when two captures race.

use chrono::{DateTime, Utc};

use crate::Result;
use crate::receipt::{InvoiceNumber, Receipt, ReceiptSummary};

use super::{SqlxResultExt, SqlxStore, StoreError, is_unique_violation};

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        StoreError::CorruptRow {
            table: "receipts",
            reason: format!("captured_at {millis} is out of range"),
        }
        .into()
    })
}

fn invoice_from_row(value: String) -> Result<InvoiceNumber> {
    InvoiceNumber::parse(&value).map_err(|_| {
        StoreError::CorruptRow {
            table: "receipts",
            reason: format!("invoice_number {value:?} is not canonical"),
        }
        .into()
    })
}

/// Check whether a receipt row exists for the invoice number.
pub async fn exists(store: &SqlxStore, invoice: &InvoiceNumber) -> Result<bool> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM receipts WHERE invoice_number = $1")
            .bind(invoice.as_str())
            .fetch_one(store.pool())
            .await
            .sql_context("Failed to check receipt")?;

    Ok(count > 0)
}

/// Insert a receipt row. Fails with [`StoreError::UniqueViolation`] when a
/// receipt for the same invoice number is already stored.
pub async fn insert(store: &SqlxStore, receipt: &Receipt) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO receipts (invoice_number, image, captured_at) VALUES ($1, $2, $3)",
    )
    .bind(receipt.invoice.as_str())
    .bind(receipt.image.as_slice())
    .bind(receipt.captured_at.timestamp_millis())
    .execute(store.pool())
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(StoreError::UniqueViolation {
            table: "receipts",
            key: receipt.invoice.to_string(),
        }
        .into()),
        Err(e) => Err(e).sql_context("Failed to insert receipt"),
    }
}

/// Count receipt rows.
pub async fn count(store: &SqlxStore) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM receipts")
        .fetch_one(store.pool())
        .await
        .sql_context("Failed to count receipts")?;

    Ok(count)
}

/// Fetch the receipt for an invoice number.
///
/// Ordered by capture time so that, should a database ever hold more than one
/// row per key (e.g. imported without the primary key), the newest one wins.
pub async fn find(store: &SqlxStore, invoice: &InvoiceNumber) -> Result<Option<Receipt>> {
    let row: Option<(Vec<u8>, i64)> = sqlx::query_as(
        "SELECT image, captured_at FROM receipts
         WHERE invoice_number = $1
         ORDER BY captured_at DESC
         LIMIT 1",
    )
    .bind(invoice.as_str())
    .fetch_optional(store.pool())
    .await
    .sql_context("Failed to fetch receipt")?;

    match row {
        Some((image, captured_at)) => Ok(Some(Receipt {
            invoice: invoice.clone(),
            image,
            captured_at: timestamp_from_millis(captured_at)?,
        })),
        None => Ok(None),
    }
}

/// List the most recently captured receipts, without their image bytes.
pub async fn list(store: &SqlxStore, limit: i64) -> Result<Vec<ReceiptSummary>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT invoice_number, captured_at FROM receipts
         ORDER BY captured_at DESC, invoice_number
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(store.pool())
    .await
    .sql_context("Failed to list receipts")?;

    rows.into_iter()
        .map(|(invoice, captured_at)| {
            Ok(ReceiptSummary {
                invoice: invoice_from_row(invoice)?,
                captured_at: timestamp_from_millis(captured_at)?,
            })
        })
        .collect()
}
