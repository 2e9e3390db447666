use std::io::Cursor;
use std::sync::Arc;

use canhoto::{FixedClock, InvoiceNumber, ReceiptService, SqlxStore};
use image::{ImageFormat, Rgb, RgbImage};

/// Creates a test store based on the TEST_BACKEND env var.
///
/// Supported values:
/// - "sqlite" or unset: SQLite in-memory store (default)
/// - "postgres": PostgreSQL in an isolated schema (TEST_POSTGRES_URL)
///
/// ```bash
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/canhoto_test" cargo test
/// ```
pub async fn test_store() -> SqlxStore {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("postgres") => {
            let url = std::env::var("TEST_POSTGRES_URL")
                .unwrap_or_else(|_| "postgres://localhost/canhoto_test".to_string());
            SqlxStore::connect_postgres_isolated(&url)
                .await
                .expect("Failed to connect to PostgreSQL")
        }
        Ok("sqlite") | Err(_) => SqlxStore::sqlite_in_memory()
            .await
            .expect("Failed to create SQLite store"),
        Ok(other) => panic!("Unknown TEST_BACKEND: {other}"),
    }
}

/// Receipt service over a fresh store with a controllable clock.
pub async fn test_receipts() -> (ReceiptService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::default());
    let service = ReceiptService::with_clock(test_store().await, clock.clone());
    (service, clock)
}

pub fn invoice(n: &str) -> InvoiceNumber {
    InvoiceNumber::parse(n).expect("valid invoice number")
}

/// A small two-colour photo, encoded in the given format.
pub fn sample_photo(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(32, 24, |x, _| {
        if x < 16 {
            Rgb([200, 40, 40])
        } else {
            Rgb([40, 40, 200])
        }
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode sample");
    buf.into_inner()
}

pub fn sample_png() -> Vec<u8> {
    sample_photo(ImageFormat::Png)
}

pub fn sample_jpeg() -> Vec<u8> {
    sample_photo(ImageFormat::Jpeg)
}

/// Assert that two encoded images show the same picture, allowing for JPEG loss.
pub fn assert_visually_equal(a: &[u8], b: &[u8]) {
    let a = image::load_from_memory(a).expect("decode a").to_rgb8();
    let b = image::load_from_memory(b).expect("decode b").to_rgb8();
    assert_eq!(a.dimensions(), b.dimensions());
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        for c in 0..3 {
            let diff = (i16::from(pa[c]) - i16::from(pb[c])).abs();
            assert!(diff <= 40, "pixel channel differs by {diff}");
        }
    }
}
