use serde::{Deserialize, Serialize};

use super::AcquisitionError;

/// Text handed to entity extraction, with how much we trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResult {
    pub raw_text: String,
    /// 0.0 to 1.0. Only typed text may exceed the heuristic cap.
    pub confidence: f32,
}

impl TextResult {
    /// The result of a failed acquisition.
    pub fn unreadable() -> Self {
        Self {
            raw_text: String::new(),
            confidence: 0.0,
        }
    }
}

/// One recognized word and the engine's score for it (0-100).
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWordResult {
    pub text: String,
    pub score: f32,
}

/// Raw OCR result from the engine
#[derive(Debug, Clone)]
pub struct OcrPageResult {
    pub text: String,
    /// Empty when the engine could not report per-word scores.
    pub word_confidences: Vec<OcrWordResult>,
}

/// OCR engine abstraction (allows mocking for tests).
///
/// Loaded once at startup and shared read-only afterwards.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in an encoded image.
    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPageResult, AcquisitionError>;
}
