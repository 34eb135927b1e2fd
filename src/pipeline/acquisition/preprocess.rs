//! Image preparation before OCR.
//!
//! Steps, in order: validate size, decode, fix EXIF orientation, greyscale,
//! downscale (aspect preserved) when the longest side exceeds the cap, sharpen.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageOutputFormat};
use tracing::debug;

use super::AcquisitionError;

/// Maximum input image size in bytes.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// Classic 3x3 sharpen kernel (centre 32, ring -2). `filter3x3` divides by the sum, 16.
const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Decode and prepare an image for OCR.
pub fn preprocess_image_bytes(bytes: &[u8], max_dim: u32) -> Result<GrayImage, AcquisitionError> {
    validate_image_bytes(bytes)?;

    let img = image::load_from_memory(bytes)
        .map_err(|e| AcquisitionError::ImageProcessing(format!("Image decode failed: {e}")))?;

    let orientation = read_exif_orientation(bytes);
    let gray = apply_orientation(img, orientation).to_luma8();

    let (w, h) = gray.dimensions();
    let (new_w, new_h) = compute_downscale_dimensions(w, h, max_dim);
    let gray = if (new_w, new_h) != (w, h) {
        debug!(
            from = %format!("{w}x{h}"),
            to = %format!("{new_w}x{new_h}"),
            "Downscaling image before OCR"
        );
        image::imageops::resize(&gray, new_w, new_h, FilterType::CatmullRom)
    } else {
        gray
    };

    Ok(sharpen(&gray))
}

/// Reject payloads too small or too large to be a usable image.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), AcquisitionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(AcquisitionError::ImageProcessing(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AcquisitionError::ImageProcessing(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Target dimensions when the longest side exceeds `max_dim`.
///
/// The longest side becomes `max_dim`, the other shrinks by the same factor
/// (truncated). Images within the cap are returned unchanged.
pub fn compute_downscale_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let largest = width.max(height);
    if largest <= max_dim || largest == 0 {
        return (width, height);
    }

    let scale = max_dim as f64 / largest as f64;
    let new_w = ((width as f64 * scale) as u32).max(1);
    let new_h = ((height as f64 * scale) as u32).max(1);
    (new_w, new_h)
}

/// Sharpen a greyscale image with [`SHARPEN_KERNEL`].
///
/// `filter3x3` leaves the outermost ring at zero, so the border is copied
/// from the input.
pub fn sharpen(img: &GrayImage) -> GrayImage {
    let mut out = image::imageops::filter3x3(img, &SHARPEN_KERNEL);
    let (width, height) = img.dimensions();
    for (x, y, pixel) in img.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            out.put_pixel(x, y, *pixel);
        }
    }
    out
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
///
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        1 => img,
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Encode a greyscale image as PNG bytes for the OCR engine.
pub fn encode_png(img: GrayImage) -> Result<Vec<u8>, AcquisitionError> {
    let dynamic = DynamicImage::ImageLuma8(img);
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| AcquisitionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}
