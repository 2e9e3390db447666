//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query or connection failed in the sqlx driver.
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context message including the driver error text
        reason: String,
        /// The underlying driver error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },

    /// An insert collided with an existing key.
    #[error("Duplicate key in {table}: {key}")]
    UniqueViolation {
        /// The table that rejected the row
        table: &'static str,
        /// The colliding key value
        key: String,
    },

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow {
        /// The table the row came from
        table: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl StoreError {
    /// Check if this error is a key collision.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }

    /// Check if this error indicates the stored data is inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, StoreError::CorruptRow { .. })
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = StoreError::UniqueViolation {
            table: "receipts",
            key: "1001".to_string(),
        };
        assert!(err.is_unique_violation());
        assert!(!err.is_integrity_error());
        assert_eq!(err.to_string(), "Duplicate key in receipts: 1001");

        let err = StoreError::CorruptRow {
            table: "receipts",
            reason: "timestamp out of range".to_string(),
        };
        assert!(err.is_integrity_error());
    }
}
