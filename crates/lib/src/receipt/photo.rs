//! Receipt photo normalization.
//!
//! Every upload is decoded, flattened to 8-bit RGB (any alpha plane is
//! dropped) and re-encoded as JPEG before it is stored. Stored bytes are
//! therefore never the uploaded bytes; only the picture survives.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use super::errors::ReceiptError;

/// JPEG quality used for stored receipts.
pub const JPEG_QUALITY: u8 = 85;

/// Upload formats accepted by the capture screen.
pub const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png];

/// Decode an uploaded photo and re-encode it as a 3-channel JPEG.
pub fn normalize_to_jpeg(upload: &[u8]) -> Result<Vec<u8>, ReceiptError> {
    if upload.is_empty() {
        return Err(ReceiptError::EmptyUpload);
    }

    let format = image::guess_format(upload).map_err(|e| ReceiptError::ImageDecode {
        reason: e.to_string(),
    })?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(ReceiptError::ImageDecode {
            reason: format!("{format:?} images are not accepted, use JPEG or PNG"),
        });
    }

    let decoded = image::load_from_memory_with_format(upload, format).map_err(|e| {
        ReceiptError::ImageDecode {
            reason: e.to_string(),
        }
    })?;

    encode_rgb_jpeg(&decoded)
}

/// Encode an already-decoded image as a 3-channel JPEG.
pub fn encode_rgb_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ReceiptError> {
    let rgb = image.to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ReceiptError::ImageEncode {
            reason: e.to_string(),
        })?;

    Ok(jpeg)
}
