//! Recipient address validation.

use std::fmt;

use email_address::EmailAddress;

use super::errors::NotifyError;

/// A syntactically valid recipient address: `local-part@domain` where the
/// domain is a dotted host name. Display names (`Name <addr>`) and domain
/// literals (`a@[1.2.3.4]`) are rejected, and the address must also be one
/// the relay's message builder accepts.
///
/// Holding a `Recipient` is the precondition for sending; there is no way to
/// hand the notification service an unchecked string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Recipient(String);

impl Recipient {
    pub fn parse(input: &str) -> Result<Self, NotifyError> {
        let address = input.trim();
        let invalid = || NotifyError::InvalidRecipient {
            address: input.to_string(),
        };

        if address.is_empty() || address.contains(['<', '>']) || address.contains(char::is_whitespace) {
            return Err(invalid());
        }

        let parsed =
            EmailAddress::parse_with_options(address, Default::default()).map_err(|_| invalid())?;

        let domain = parsed.domain();
        if domain.starts_with('[')
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(invalid());
        }

        address
            .parse::<lettre::Address>()
            .map_err(|_| invalid())?;

        Ok(Self(address.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
