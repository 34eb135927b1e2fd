use super::patterns::{clean_date_phrase, extract_date_phrase, extract_department, extract_time};
use super::types::{EntityRecognizer, EntitySet, SpanLabel};
use crate::config::HEURISTIC_CONFIDENCE_CAP;

/// Confidence points, in hundredths.
const BASE_POINTS: u32 = 50;
const DATE_POINTS: u32 = 20;
const TIME_POINTS: u32 = 20;
const DEPARTMENT_POINTS: u32 = 10;

/// Entity extractor with an optional statistical recognizer.
///
/// Without a recognizer the pattern channel alone fills every field.
pub struct EntityExtractor {
    recognizer: Option<Box<dyn EntityRecognizer>>,
}

impl EntityExtractor {
    pub fn new(recognizer: Option<Box<dyn EntityRecognizer>>) -> Self {
        Self { recognizer }
    }

    /// Pattern channel only.
    pub fn patterns_only() -> Self {
        Self { recognizer: None }
    }

    pub fn has_recognizer(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn extract(&self, text: &str) -> EntitySet {
        if text.trim().is_empty() {
            tracing::debug!("Empty text, skipping entity extraction");
            return EntitySet::default();
        }

        let mut date_phrase = None;
        let mut time_phrase = None;

        if let Some(recognizer) = &self.recognizer {
            match recognizer.find_spans(text) {
                Ok(spans) => {
                    for span in spans {
                        match span.label {
                            SpanLabel::Date if date_phrase.is_none() => {
                                tracing::debug!(date = %span.text, "Recognizer found date");
                                date_phrase = Some(span.text);
                            }
                            SpanLabel::Time if time_phrase.is_none() => {
                                tracing::debug!(time = %span.text, "Recognizer found time");
                                time_phrase = Some(span.text);
                            }
                            _ => {}
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Entity recognizer failed, using patterns only");
                }
            }
        }

        if time_phrase.is_none() {
            time_phrase = extract_time(text);
        }
        if date_phrase.is_none() {
            date_phrase = extract_date_phrase(text);
        }
        let department = extract_department(text);
        let date_phrase = clean_date_phrase(date_phrase);

        let mut set = EntitySet {
            date_phrase,
            time_phrase,
            department,
            confidence: 0.0,
        };
        set.confidence = entity_confidence(&set);

        tracing::info!(
            confidence = set.confidence,
            has_date = set.date_phrase.is_some(),
            has_time = set.time_phrase.is_some(),
            has_department = set.department.is_some(),
            "Entities extracted"
        );
        set
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::patterns_only()
    }
}

/// 0.5 base, +0.2 date, +0.2 time, +0.1 department, capped.
pub fn entity_confidence(set: &EntitySet) -> f32 {
    let mut points = BASE_POINTS;
    if set.date_phrase.as_deref().is_some_and(|p| !p.is_empty()) {
        points += DATE_POINTS;
    }
    if set.time_phrase.as_deref().is_some_and(|p| !p.is_empty()) {
        points += TIME_POINTS;
    }
    if set.department.as_deref().is_some_and(|p| !p.is_empty()) {
        points += DEPARTMENT_POINTS;
    }
    (points as f32 / 100.0).min(HEURISTIC_CONFIDENCE_CAP)
}
