//! Text acquisition: typed text or an image becomes `(text, confidence)`.
//!
//! Image failures never escape this module. They are logged and turned into
//! an empty, zero-confidence [`TextResult`] for the guardrail to catch.

pub mod types;
pub mod confidence;
pub mod sanitize;
pub mod preprocess;
pub mod ocr;
pub mod acquire;

pub use types::*;
pub use confidence::*;
pub use sanitize::*;
pub use preprocess::*;
pub use ocr::*;
pub use acquire::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Tesseract OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Tessdata not found at: {0}")]
    TessdataNotFound(PathBuf),
}
