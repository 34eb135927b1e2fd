use super::confidence::compute_ocr_confidence;
use super::preprocess::{encode_png, preprocess_image_bytes};
use super::sanitize::sanitize_extracted_text;
use super::types::{OcrEngine, TextResult};
use super::AcquisitionError;
use crate::config::{LITERAL_TEXT_CONFIDENCE, MAX_IMAGE_DIMENSION};
use crate::models::ProcessInput;

/// Turn caller input into text plus confidence. Never fails.
pub fn acquire_text(input: &ProcessInput, engine: &dyn OcrEngine) -> TextResult {
    match input {
        ProcessInput::Text(text) => acquire_literal_text(text),
        ProcessInput::Image(bytes) => acquire_image_text(bytes, engine),
    }
}

/// Typed text: trimmed, trusted at a fixed high confidence, even when empty.
pub fn acquire_literal_text(text: &str) -> TextResult {
    TextResult {
        raw_text: text.trim().to_string(),
        confidence: LITERAL_TEXT_CONFIDENCE,
    }
}

/// OCR an image. Any decode or recognition failure yields [`TextResult::unreadable`].
pub fn acquire_image_text(bytes: &[u8], engine: &dyn OcrEngine) -> TextResult {
    tracing::debug!(bytes = bytes.len(), "Acquisition: starting image OCR");

    match try_acquire_image_text(bytes, engine) {
        Ok(result) => {
            tracing::info!(
                text_length = result.raw_text.len(),
                confidence = result.confidence,
                "Acquisition: OCR complete"
            );
            result
        }
        Err(e) => {
            tracing::warn!(error = %e, "Acquisition: image unreadable");
            TextResult::unreadable()
        }
    }
}

fn try_acquire_image_text(
    bytes: &[u8],
    engine: &dyn OcrEngine,
) -> Result<TextResult, AcquisitionError> {
    let prepared = preprocess_image_bytes(bytes, MAX_IMAGE_DIMENSION)?;
    let png = encode_png(prepared)?;
    let page = engine.recognize(&png)?;

    Ok(TextResult {
        raw_text: sanitize_extracted_text(&page.text).trim().to_string(),
        confidence: compute_ocr_confidence(&page.word_confidences),
    })
}
