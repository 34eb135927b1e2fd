use serde::{Deserialize, Serialize};

use super::RecognizerError;

/// Phrases pulled from the text. Nothing here is resolved to a calendar value yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    pub date_phrase: Option<String>,
    pub time_phrase: Option<String>,
    pub department: Option<String>,
    pub confidence: f32,
}

impl EntitySet {
    /// Fields left empty, in reporting order.
    pub fn missing_fields(&self) -> Vec<EntityField> {
        EntityField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    pub fn get(&self, field: EntityField) -> Option<&str> {
        let value = match field {
            EntityField::DatePhrase => &self.date_phrase,
            EntityField::TimePhrase => &self.time_phrase,
            EntityField::Department => &self.department,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// The three extractable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityField {
    DatePhrase,
    TimePhrase,
    Department,
}

impl EntityField {
    pub const ALL: [EntityField; 3] = [Self::DatePhrase, Self::TimePhrase, Self::Department];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatePhrase => "date_phrase",
            Self::TimePhrase => "time_phrase",
            Self::Department => "department",
        }
    }
}

/// Label attached to a recognized span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanLabel {
    Date,
    Time,
    Other(String),
}

impl SpanLabel {
    /// Map a model label (`DATE`, `time`, `B-DATE` already stripped) to a span label.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A labelled substring found by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub label: SpanLabel,
    pub text: String,
}

/// Named-entity recognizer capability.
///
/// Optional: when none is configured the statistical channel is skipped.
pub trait EntityRecognizer: Send + Sync {
    fn find_spans(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError>;
}
