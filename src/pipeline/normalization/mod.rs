//! Date/time normalization: phrases -> calendar date, 24-hour time, timezone.
//!
//! The outcome is binary. A resolved result always carries a date, a time,
//! and the fixed success confidence; anything else is unresolved at 0.0.

pub mod types;
pub mod clock;
pub mod time;
pub mod natural;
pub mod normalizer;

pub use types::*;
pub use clock::*;
pub use time::*;
pub use natural::*;
pub use normalizer::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("No date or time phrase provided")]
    NoPhrases,

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Could not resolve a date from '{0}'")]
    Unparseable(String),

    #[error("Local time {0} does not exist in {1}")]
    NonexistentLocalTime(String, String),
}
