use std::sync::Arc;

use canhoto::receipt::ReceiptError;
use canhoto::{Error, FixedClock, ReceiptService, SqlxStore};
use chrono::Utc;

use crate::helpers::{
    assert_visually_equal, invoice, sample_jpeg, sample_png, test_receipts, test_store,
};

#[tokio::test]
async fn test_exists_before_and_after_save() {
    let (receipts, _) = test_receipts().await;
    let nf = invoice("1001");

    assert!(!receipts.exists(&nf).await.unwrap());
    receipts.save(&nf, sample_jpeg()).await.unwrap();
    assert!(receipts.exists(&nf).await.unwrap());
    assert!(!receipts.exists(&invoice("1002")).await.unwrap());
}

#[tokio::test]
async fn test_find_returns_saved_photo_and_timestamp() {
    let receipts = ReceiptService::new(test_store().await);
    let nf = invoice("2024");
    let upload = sample_png();

    // Stored times have millisecond precision.
    let before = Utc::now().timestamp_millis();
    receipts.save(&nf, upload.clone()).await.unwrap();

    let found = receipts.find(&nf).await.unwrap().expect("receipt stored");
    assert_eq!(found.invoice, nf);
    assert!(found.captured_at.timestamp_millis() >= before);
    assert!(found.captured_at <= Utc::now());

    // PNG in, JPEG out, same picture.
    assert_eq!(
        image::guess_format(&found.image).unwrap(),
        image::ImageFormat::Jpeg
    );
    assert_visually_equal(&found.image, &upload);
}

#[tokio::test]
async fn test_find_missing_is_none() {
    let (receipts, _) = test_receipts().await;
    assert!(receipts.find(&invoice("404")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_capture_time_comes_from_clock() {
    let (receipts, clock) = test_receipts().await;
    clock.set(1_717_243_200_123);

    let saved = receipts.save(&invoice("55"), sample_jpeg()).await.unwrap();
    assert_eq!(saved.captured_at.timestamp_millis(), 1_717_243_200_123);

    let found = receipts.find(&invoice("55")).await.unwrap().unwrap();
    assert_eq!(found.captured_at, saved.captured_at);
}

#[tokio::test]
async fn test_count_tracks_successful_saves_only() {
    let (receipts, _) = test_receipts().await;
    assert_eq!(receipts.count().await.unwrap(), 0);

    receipts.save(&invoice("1"), sample_jpeg()).await.unwrap();
    receipts.save(&invoice("2"), sample_png()).await.unwrap();
    assert_eq!(receipts.count().await.unwrap(), 2);

    // Duplicate, empty and undecodable uploads change nothing.
    assert!(receipts.save(&invoice("1"), sample_jpeg()).await.is_err());
    assert!(receipts.save(&invoice("3"), Vec::new()).await.is_err());
    assert!(receipts.save(&invoice("4"), b"not a photo".to_vec()).await.is_err());
    assert_eq!(receipts.count().await.unwrap(), 2);
    assert!(!receipts.exists(&invoice("3")).await.unwrap());
    assert!(!receipts.exists(&invoice("4")).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_capture_is_rejected_and_original_kept() {
    let (receipts, clock) = test_receipts().await;
    let nf = invoice("777");

    let first = receipts.save(&nf, sample_jpeg()).await.unwrap();
    clock.advance(60_000);

    let err = receipts.save(&nf, sample_png()).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(
        err,
        Error::Receipt(ReceiptError::AlreadyStored { ref invoice }) if invoice == "777"
    ));

    let found = receipts.find(&nf).await.unwrap().unwrap();
    assert_eq!(found.image, first.image);
    assert_eq!(found.captured_at, first.captured_at);
}

#[tokio::test]
async fn test_leading_zeros_address_the_same_receipt() {
    let (receipts, _) = test_receipts().await;
    receipts.save(&invoice("00123"), sample_jpeg()).await.unwrap();

    assert!(receipts.exists(&invoice("123")).await.unwrap());
    let err = receipts.save(&invoice("0123"), sample_jpeg()).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_undecodable_upload_is_a_validation_error() {
    let (receipts, _) = test_receipts().await;
    let err = receipts
        .save(&invoice("9"), b"GIF89a not really".to_vec())
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
}

#[tokio::test]
async fn test_recent_is_newest_first() {
    let (receipts, clock) = test_receipts().await;
    for n in ["10", "11", "12"] {
        receipts.save(&invoice(n), sample_jpeg()).await.unwrap();
        clock.advance(1_000);
    }

    let recent = receipts.recent(2).await.unwrap();
    let numbers: Vec<_> = recent.iter().map(|r| r.invoice.as_str()).collect();
    assert_eq!(numbers, vec!["12", "11"]);
}

#[tokio::test]
async fn test_concurrent_captures_store_exactly_one() {
    // File-backed so the two saves really use separate connections.
    let dir = tempfile::tempdir().unwrap();
    let store = SqlxStore::open_sqlite(dir.path().join("canhoto.db"))
        .await
        .unwrap();
    let receipts = ReceiptService::with_clock(store, Arc::new(FixedClock::default()));
    let nf = invoice("31337");

    let (a, b) = tokio::join!(
        receipts.save(&nf, sample_jpeg()),
        receipts.save(&nf, sample_png())
    );

    let outcomes = [a, b];
    let stored = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_conflict()))
        .count();
    assert_eq!(stored, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(receipts.count().await.unwrap(), 1);
}
