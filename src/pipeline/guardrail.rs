//! Guardrail: the policy gate between extraction and a committed appointment.
//!
//! Checks run in fixed order and the first failure wins.

use serde::{Deserialize, Serialize};

use super::acquisition::TextResult;
use super::entities::{EntityField, EntitySet};
use super::normalization::NormalizedDateTime;
use crate::models::VerdictStatus;

/// Minimum confidences. A value equal to the threshold passes.
pub mod thresholds {
    /// Below this the text itself is not trusted.
    pub const TEXT: f32 = 0.5;

    /// Below this the entity set is too thin to act on.
    pub const ENTITIES: f32 = 0.7;

    /// Below this the resolved date/time is not trusted.
    pub const NORMALIZATION: f32 = 0.7;
}

pub const UNREADABLE_MESSAGE: &str = "Image/text unreadable - please re-upload or type the text.";
pub const AMBIGUOUS_ENTITIES_MESSAGE: &str = "Entities missing or ambiguous.";
pub const NORMALIZATION_MESSAGE: &str =
    "Could not normalize date/time confidently. Please specify a clearer date or exact time.";
pub const PASSED_MESSAGE: &str = "All checks passed.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    pub status: VerdictStatus,
    pub message: String,
    /// Ordered hints for the user. `None` when the verdict is ok.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl GuardrailVerdict {
    pub fn ok() -> Self {
        Self {
            status: VerdictStatus::Ok,
            message: PASSED_MESSAGE.to_string(),
            suggestions: None,
        }
    }

    fn clarify(message: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            status: VerdictStatus::NeedsClarification,
            message: message.into(),
            suggestions: Some(suggestions),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == VerdictStatus::Ok
    }
}

pub fn evaluate_guardrails(
    text: &TextResult,
    entities: &EntitySet,
    normalized: &NormalizedDateTime,
) -> GuardrailVerdict {
    let verdict = if text.confidence < thresholds::TEXT {
        GuardrailVerdict::clarify(
            UNREADABLE_MESSAGE,
            vec![
                "Retake the photo in good light with the whole slip in frame.".to_string(),
                "Or type the appointment details instead.".to_string(),
            ],
        )
    } else if entities.confidence < thresholds::ENTITIES {
        let missing = entities.missing_fields();
        if missing.is_empty() {
            GuardrailVerdict::clarify(
                AMBIGUOUS_ENTITIES_MESSAGE,
                vec!["Rephrase the request with a department plus a date and time.".to_string()],
            )
        } else {
            let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
            GuardrailVerdict::clarify(
                format!("Missing entities: {}", names.join(", ")),
                missing.iter().map(|f| missing_field_hint(*f).to_string()).collect(),
            )
        }
    } else if !normalized.is_resolved() || normalized.confidence < thresholds::NORMALIZATION {
        GuardrailVerdict::clarify(
            NORMALIZATION_MESSAGE,
            vec![
                "Use a weekday or a calendar date, like 'Friday' or '15 March'.".to_string(),
                "Give an exact time, like '3pm' or '10:30'.".to_string(),
            ],
        )
    } else {
        GuardrailVerdict::ok()
    };

    tracing::info!(
        status = %verdict.status,
        text_confidence = text.confidence,
        entity_confidence = entities.confidence,
        normalization_confidence = normalized.confidence,
        "Guardrail evaluated"
    );
    verdict
}

fn missing_field_hint(field: EntityField) -> &'static str {
    match field {
        EntityField::DatePhrase => "Add a date, like 'tomorrow' or 'next Friday'.",
        EntityField::TimePhrase => "Add a time, like '3pm' or '10:30'.",
        EntityField::Department => "Name the department, like 'dentist' or 'eye'.",
    }
}
