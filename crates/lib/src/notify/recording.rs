//! In-process mail transport for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{MailTransport, NotifyError, OutgoingEmail};
use crate::Result;

/// Records every delivered e-mail instead of sending it.
///
/// A failing instance rejects every delivery with a transport error and
/// records nothing.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingEmail>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose relay is always unreachable.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// E-mails delivered so far.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Delivery attempts so far, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;

        if self.fail {
            return Err(NotifyError::Transport {
                reason: "connection refused".to_string(),
            }
            .into());
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
