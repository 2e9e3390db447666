//! Invoice number ("Nota Fiscal") parsing.

use std::fmt;
use std::str::FromStr;

use super::errors::ReceiptError;

/// Longest invoice number accepted, in digits.
pub const MAX_INVOICE_DIGITS: usize = 50;

/// A validated invoice number, the lookup key for a stored receipt.
///
/// Operators type invoice numbers as text on the capture screen and as
/// numbers on the lookup screens, so the canonical form drops leading zeros:
/// `"00123"` and `"123"` address the same receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Parse operator input into an invoice number.
    ///
    /// Surrounding whitespace is ignored. The rest must be 1 to
    /// [`MAX_INVOICE_DIGITS`] ASCII digits and must not be zero.
    pub fn parse(input: &str) -> Result<Self, ReceiptError> {
        let invalid = |reason: &'static str| ReceiptError::InvalidInvoiceNumber {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("invoice number is empty"));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("invoice number must contain digits only"));
        }
        if trimmed.len() > MAX_INVOICE_DIGITS {
            return Err(invalid("invoice number is too long"));
        }

        let canonical = trimmed.trim_start_matches('0');
        if canonical.is_empty() {
            return Err(invalid("invoice number must be greater than zero"));
        }

        Ok(Self(canonical.to_string()))
    }

    /// The canonical digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Attachment file name used when the receipt is e-mailed.
    pub fn attachment_name(&self) -> String {
        format!("Canhoto_{}.jpeg", self.0)
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InvoiceNumber {
    type Err = ReceiptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for InvoiceNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_digits() {
        let invoice = InvoiceNumber::parse("1001").unwrap();
        assert_eq!(invoice.as_str(), "1001");
        assert_eq!(invoice.to_string(), "1001");
    }

    #[test]
    fn trims_whitespace_and_leading_zeros() {
        assert_eq!(InvoiceNumber::parse("  001001 ").unwrap().as_str(), "1001");
        assert_eq!(
            InvoiceNumber::parse("0123").unwrap(),
            InvoiceNumber::parse("123").unwrap()
        );
    }

    #[test]
    fn rejects_non_numeric_input() {
        for input in ["", "   ", "12a", "-5", "1.5", "１２３", "12 34"] {
            let err = InvoiceNumber::parse(input).unwrap_err();
            assert!(err.is_validation_error(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn rejects_zero() {
        assert!(InvoiceNumber::parse("0").is_err());
        assert!(InvoiceNumber::parse("0000").is_err());
    }

    #[test]
    fn enforces_length_limit() {
        let max = "9".repeat(MAX_INVOICE_DIGITS);
        assert!(InvoiceNumber::parse(&max).is_ok());

        let too_long = "9".repeat(MAX_INVOICE_DIGITS + 1);
        assert!(InvoiceNumber::parse(&too_long).is_err());
    }

    #[test]
    fn attachment_name_uses_canonical_number() {
        let invoice: InvoiceNumber = "0042".parse().unwrap();
        assert_eq!(invoice.attachment_name(), "Canhoto_42.jpeg");
    }
}
