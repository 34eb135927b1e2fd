//! Entity extraction: text -> date phrase, time phrase, department.
//!
//! Two channels. An optional statistical recognizer fills the date and time
//! phrases first; the pattern channel then fills whatever is still empty.

pub mod types;
pub mod patterns;
pub mod recognizer;
pub mod extractor;

pub use types::*;
pub use patterns::*;
pub use recognizer::*;
pub use extractor::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("Recognizer model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Recognizer initialization failed: {0}")]
    ModelInit(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}
