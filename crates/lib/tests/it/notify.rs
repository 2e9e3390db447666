use std::sync::Arc;

use canhoto::notify::{
    DEFAULT_SUBJECT, NotifyError, Recipient, RecordingTransport, SendOutcome, receipt_body,
};
use canhoto::{Error, NotificationService};

use crate::helpers::{invoice, sample_jpeg, test_receipts};

#[tokio::test]
async fn test_send_receipt_attaches_stored_photo() {
    let (receipts, _) = test_receipts().await;
    let nf = invoice("4815");
    let saved = receipts.save(&nf, sample_jpeg()).await.unwrap();

    let transport = Arc::new(RecordingTransport::new());
    let notifier = NotificationService::new(transport.clone());
    let to = Recipient::parse("financeiro@cliente.com.br").unwrap();

    let outcome = notifier
        .send_receipt(&receipts, &to, &nf, "Comprovante de entrega")
        .await
        .unwrap();
    assert_eq!(outcome, SendOutcome::Sent);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.to, to);
    assert_eq!(email.subject, "Comprovante de entrega");
    assert_eq!(email.html_body, receipt_body(&nf));
    assert_eq!(email.attachment.filename, "Canhoto_4815.jpeg");
    assert_eq!(email.attachment.content_type, "image/jpeg");
    assert_eq!(email.attachment.bytes, saved.image);
}

#[tokio::test]
async fn test_blank_subject_uses_default() {
    let (receipts, _) = test_receipts().await;
    let nf = invoice("16");
    receipts.save(&nf, sample_jpeg()).await.unwrap();

    let transport = Arc::new(RecordingTransport::new());
    let notifier = NotificationService::new(transport.clone());
    let to = Recipient::parse("a@b.com").unwrap();

    notifier.send_receipt(&receipts, &to, &nf, "").await.unwrap();
    assert_eq!(transport.sent()[0].subject, DEFAULT_SUBJECT);
}

#[tokio::test]
async fn test_missing_receipt_sends_nothing() {
    let (receipts, _) = test_receipts().await;
    let transport = Arc::new(RecordingTransport::new());
    let notifier = NotificationService::new(transport.clone());
    let to = Recipient::parse("a@b.com").unwrap();

    let outcome = notifier
        .send_receipt(&receipts, &to, &invoice("99999"), "")
        .await
        .unwrap();
    assert_eq!(outcome, SendOutcome::NoReceipt);
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test]
async fn test_relay_failure_is_reported_as_transport_error() {
    let (receipts, _) = test_receipts().await;
    let nf = invoice("23");
    receipts.save(&nf, sample_jpeg()).await.unwrap();

    let transport = Arc::new(RecordingTransport::failing());
    let notifier = NotificationService::new(transport.clone());
    let to = Recipient::parse("a@b.com").unwrap();

    let err = notifier
        .send_receipt(&receipts, &to, &nf, "")
        .await
        .unwrap_err();
    assert!(err.is_transport_error());
    assert!(matches!(err, Error::Notify(NotifyError::Transport { .. })));
    assert_eq!(transport.attempts(), 1);
    assert!(transport.sent().is_empty());

    // The stored receipt is untouched by the failed send.
    assert!(receipts.exists(&nf).await.unwrap());
}

#[test]
fn test_malformed_recipient_never_reaches_transport() {
    // A send requires a parsed Recipient, so bad input stops here.
    for input in ["cliente.empresa.com", "cliente@[10.0.0.1]"] {
        let err = Recipient::parse(input).unwrap_err();
        assert!(err.is_validation_error(), "{input:?}");
        assert!(!err.is_transport_error(), "{input:?}");
    }
}
