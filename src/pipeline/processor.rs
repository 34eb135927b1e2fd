//! Appointment processing orchestrator.
//!
//! Single entry point that drives the full pipeline:
//! acquire → extract → normalize → guardrail → canonicalize.
//!
//! Uses trait-based DI for every engine (OcrEngine, EntityRecognizer,
//! DateParser, Clock) so the orchestrator stays testable with mocks.

use serde::Serialize;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::models::{Appointment, InputKind, ProcessInput, VerdictStatus};
use crate::pipeline::acquisition::{acquire_text, MockOcrEngine, OcrEngine, TextResult};
use crate::pipeline::department::canonicalize_department;
use crate::pipeline::entities::{EntityExtractor, EntityRecognizer, EntitySet, RecognizerError};
use crate::pipeline::guardrail::{evaluate_guardrails, GuardrailVerdict};
use crate::pipeline::normalization::{
    normalize_datetime, Clock, DateParser, NormalizedDateTime, RelativeDateParser, SystemClock,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Engine construction failures. Processing itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("Entity recognizer initialization failed: {0}")]
    Recognizer(#[from] RecognizerError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// What the caller gets back: an appointment, or a request to clarify.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessOutcome {
    Scheduled(Appointment),
    NeedsClarification(GuardrailVerdict),
}

impl ProcessOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }

    pub fn appointment(&self) -> Option<&Appointment> {
        match self {
            Self::Scheduled(appointment) => Some(appointment),
            Self::NeedsClarification(_) => None,
        }
    }

    pub fn verdict(&self) -> Option<&GuardrailVerdict> {
        match self {
            Self::Scheduled(_) => None,
            Self::NeedsClarification(verdict) => Some(verdict),
        }
    }
}

/// Every stage result of one run, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub request_id: Uuid,
    pub input_kind: InputKind,
    pub locale: String,
    pub text: TextResult,
    pub entities: EntitySet,
    pub normalized: NormalizedDateTime,
    pub verdict: GuardrailVerdict,
    pub outcome: ProcessOutcome,
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Orchestrates one request end to end. Holds read-only engines, so a single
/// instance can serve any number of sequential or concurrent calls.
pub struct AppointmentProcessor {
    ocr: Box<dyn OcrEngine>,
    extractor: EntityExtractor,
    date_parser: Box<dyn DateParser>,
    clock: Box<dyn Clock>,
    default_locale: String,
}

impl AppointmentProcessor {
    pub fn new(
        ocr: Box<dyn OcrEngine>,
        recognizer: Option<Box<dyn EntityRecognizer>>,
        date_parser: Box<dyn DateParser>,
        clock: Box<dyn Clock>,
        default_locale: &str,
    ) -> Self {
        Self {
            ocr,
            extractor: EntityExtractor::new(recognizer),
            date_parser,
            clock,
            default_locale: default_locale.to_string(),
        }
    }

    /// Run the pipeline and return the caller-facing outcome.
    pub fn process(&self, input: &ProcessInput, locale: &str) -> ProcessOutcome {
        self.process_with_report(input, locale).outcome
    }

    /// Run the pipeline, keeping every intermediate result.
    ///
    /// A blank `locale` falls back to the processor's default.
    pub fn process_with_report(&self, input: &ProcessInput, locale: &str) -> ProcessReport {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("process", %request_id, input = %input.kind());
        let _guard = span.enter();

        let locale = match locale.trim() {
            "" => self.default_locale.as_str(),
            given => given,
        };

        let text = acquire_text(input, self.ocr.as_ref());
        let entities = self.extractor.extract(&text.raw_text);
        let normalized = normalize_datetime(
            entities.date_phrase.as_deref(),
            entities.time_phrase.as_deref(),
            locale,
            self.clock.now(),
            self.date_parser.as_ref(),
        );
        let verdict = evaluate_guardrails(&text, &entities, &normalized);

        let outcome = if verdict.is_ok() {
            let appointment = Appointment {
                department: canonicalize_department(entities.department.as_deref()),
                date: normalized.date.clone(),
                time: normalized.time.clone(),
                timezone: normalized.timezone.clone(),
                status: VerdictStatus::Ok,
            };
            tracing::info!(
                department = %appointment.department,
                date = appointment.date.as_deref().unwrap_or_default(),
                time = appointment.time.as_deref().unwrap_or_default(),
                "Appointment scheduled"
            );
            ProcessOutcome::Scheduled(appointment)
        } else {
            tracing::info!(message = %verdict.message, "Clarification needed");
            ProcessOutcome::NeedsClarification(verdict.clone())
        };

        ProcessReport {
            request_id,
            input_kind: input.kind(),
            locale: locale.to_string(),
            text,
            entities,
            normalized,
            verdict,
            outcome,
        }
    }

    pub fn has_recognizer(&self) -> bool {
        self.extractor.has_recognizer()
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build an `AppointmentProcessor` with production implementations.
///
/// - OCR: `BundledTesseract` (feature-gated) or a failing `MockOcrEngine`
/// - Entities: `OnnxEntityRecognizer` (feature-gated) or patterns only
/// - Dates: `RelativeDateParser` against the system clock
///
/// Engines that cannot be built are logged and replaced by their degraded
/// stand-ins; the pipeline always runs.
pub fn build_processor(config: &PipelineConfig) -> AppointmentProcessor {
    let ocr = build_ocr_engine(config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "OCR engine unavailable, images will be reported unreadable");
        Box::new(MockOcrEngine::failing(&e.to_string()))
    });

    let recognizer = build_recognizer(config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Entity recognizer unavailable, using patterns only");
        None
    });

    AppointmentProcessor::new(
        ocr,
        recognizer,
        Box::new(RelativeDateParser),
        Box::new(SystemClock),
        &config.default_locale,
    )
}

/// Build the OCR engine, respecting feature flags.
fn build_ocr_engine(config: &PipelineConfig) -> Result<Box<dyn OcrEngine>, ProcessingError> {
    #[cfg(feature = "ocr")]
    {
        if let Some(tessdata) = &config.tessdata_dir {
            let engine = crate::pipeline::acquisition::BundledTesseract::new(tessdata)
                .map_err(|e| ProcessingError::OcrInit(e.to_string()))?;
            tracing::info!(tessdata = %tessdata.display(), "Tesseract OCR initialized");
            return Ok(Box::new(engine));
        }
        Err(ProcessingError::OcrInit(
            "Tesseract data directory not found. Set TESSDATA_PREFIX or install tesseract-ocr-eng"
                .into(),
        ))
    }

    #[cfg(not(feature = "ocr"))]
    {
        let _ = config;
        Err(ProcessingError::OcrInit(
            "built without the `ocr` feature".into(),
        ))
    }
}

/// Build the optional statistical recognizer. `Ok(None)` means none is configured.
fn build_recognizer(
    config: &PipelineConfig,
) -> Result<Option<Box<dyn EntityRecognizer>>, ProcessingError> {
    let Some(model_dir) = &config.ner_model_dir else {
        tracing::info!("No entity recognizer model configured");
        return Ok(None);
    };

    #[cfg(feature = "onnx-ner")]
    {
        let recognizer = crate::pipeline::entities::OnnxEntityRecognizer::load(model_dir)?;
        Ok(Some(Box::new(recognizer)))
    }

    #[cfg(not(feature = "onnx-ner"))]
    {
        tracing::info!(
            model_dir = %model_dir.display(),
            "Recognizer model present but built without the `onnx-ner` feature"
        );
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::entities::{EntitySpan, MockEntityRecognizer, SpanLabel};
    use crate::pipeline::guardrail::{NORMALIZATION_MESSAGE, UNREADABLE_MESSAGE};
    use crate::pipeline::normalization::FixedClock;
    use chrono::{TimeZone, Utc};
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    const KOLKATA: &str = "Asia/Kolkata";

    fn png_fixture() -> Vec<u8> {
        let img = RgbImage::from_fn(80, 40, |x, y| {
            let shade = 230 + ((x * 5 + y * 3) % 24) as u8;
            Rgb([shade, shade, shade])
        });
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    /// Wednesday 2025-03-12, 15:40 in Kolkata.
    fn processor_with(ocr: MockOcrEngine, recognizer: Option<Box<dyn EntityRecognizer>>) -> AppointmentProcessor {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 10, 10, 0).unwrap();
        AppointmentProcessor::new(
            Box::new(ocr),
            recognizer,
            Box::new(RelativeDateParser),
            Box::new(FixedClock(now)),
            KOLKATA,
        )
    }

    fn text_processor() -> AppointmentProcessor {
        processor_with(MockOcrEngine::failing("no ocr in tests"), None)
    }

    fn text(s: &str) -> ProcessInput {
        ProcessInput::Text(s.to_string())
    }

    #[test]
    fn dentist_next_friday_at_three() {
        let outcome = text_processor().process(&text("Book dentist next Friday at 3pm"), KOLKATA);
        let appointment = outcome.appointment().expect("scheduled");
        assert_eq!(appointment.department, "Dentistry");
        assert_eq!(appointment.date.as_deref(), Some("2025-03-14"));
        assert_eq!(appointment.time.as_deref(), Some("15:00"));
        assert_eq!(appointment.timezone, KOLKATA);
        assert_eq!(appointment.status, VerdictStatus::Ok);
    }

    #[test]
    fn tomorrow_noon_without_department_reaches_normalization() {
        let report = text_processor().process_with_report(&text("tomorrow noon"), KOLKATA);
        assert_eq!(report.entities.confidence, 0.9);
        assert!(report.entities.department.is_none());
        // Entities pass, so the outcome is decided by normalization.
        let appointment = report.outcome.appointment().expect("scheduled");
        assert_eq!(appointment.department, "");
        assert_eq!(appointment.date.as_deref(), Some("2025-03-13"));
        assert_eq!(appointment.time.as_deref(), Some("00:00"));
    }

    #[test]
    fn empty_text_lists_every_missing_field() {
        let report = text_processor().process_with_report(&text(""), KOLKATA);
        assert_eq!(report.text.confidence, 0.99);
        let verdict = report.outcome.verdict().expect("clarification");
        assert_eq!(verdict.status, VerdictStatus::NeedsClarification);
        assert_eq!(
            verdict.message,
            "Missing entities: date_phrase, time_phrase, department"
        );
    }

    #[test]
    fn low_ocr_confidence_is_unreadable() {
        let processor = processor_with(
            MockOcrEngine::new("Book dentist next Friday at 3pm", 30.0),
            None,
        );
        let outcome = processor.process(&ProcessInput::Image(png_fixture()), KOLKATA);
        assert_eq!(outcome.verdict().map(|v| v.message.as_str()), Some(UNREADABLE_MESSAGE));
    }

    #[test]
    fn clear_image_schedules() {
        let processor = processor_with(
            MockOcrEngine::new("Book cardio tomorrow at 10:30am", 91.0),
            None,
        );
        let report = processor.process_with_report(&ProcessInput::Image(png_fixture()), KOLKATA);
        assert_eq!(report.input_kind, InputKind::Image);
        assert_eq!(report.text.confidence, 0.91);
        let appointment = report.outcome.appointment().expect("scheduled");
        assert_eq!(appointment.department, "Cardiology");
        assert_eq!(appointment.date.as_deref(), Some("2025-03-13"));
        assert_eq!(appointment.time.as_deref(), Some("10:30"));
    }

    #[test]
    fn undecodable_image_is_unreadable() {
        let processor = processor_with(MockOcrEngine::new("tomorrow 3pm dentist", 95.0), None);
        let outcome = processor.process(&ProcessInput::Image(vec![0u8; 200]), KOLKATA);
        assert_eq!(outcome.verdict().map(|v| v.message.as_str()), Some(UNREADABLE_MESSAGE));
    }

    #[test]
    fn day_month_date_and_unmapped_department() {
        let outcome = text_processor().process(&text("I want to see Pediatrics on 15th March at 4pm"), KOLKATA);
        let appointment = outcome.appointment().expect("scheduled");
        assert_eq!(appointment.department, "pediatrics");
        assert_eq!(appointment.date.as_deref(), Some("2025-03-15"));
        assert_eq!(appointment.time.as_deref(), Some("16:00"));
    }

    #[test]
    fn unknown_locale_fails_normalization() {
        let outcome = text_processor().process(&text("Book dentist next Friday at 3pm"), "Nowhere/City");
        assert_eq!(outcome.verdict().map(|v| v.message.as_str()), Some(NORMALIZATION_MESSAGE));
    }

    #[test]
    fn blank_locale_uses_default() {
        let report = text_processor().process_with_report(&text("Book dentist next Friday at 3pm"), "  ");
        assert_eq!(report.locale, KOLKATA);
        assert!(report.outcome.is_scheduled());
    }

    #[test]
    fn other_timezone_is_echoed() {
        let outcome = text_processor().process(&text("Book eye checkup tomorrow at 9am"), "Europe/London");
        let appointment = outcome.appointment().expect("scheduled");
        assert_eq!(appointment.department, "Ophthalmology");
        assert_eq!(appointment.timezone, "Europe/London");
        assert_eq!(appointment.date.as_deref(), Some("2025-03-13"));
        assert_eq!(appointment.time.as_deref(), Some("09:00"));
    }

    #[test]
    fn recognizer_spans_feed_normalization() {
        let recognizer = MockEntityRecognizer::new(vec![
            EntitySpan {
                label: SpanLabel::Date,
                text: "March 20th".into(),
            },
            EntitySpan {
                label: SpanLabel::Time,
                text: "11 am".into(),
            },
        ]);
        let processor = processor_with(MockOcrEngine::failing("unused"), Some(Box::new(recognizer)));
        assert!(processor.has_recognizer());
        let outcome = processor.process(&text("gynac appointment March 20th 11 am"), KOLKATA);
        let appointment = outcome.appointment().expect("scheduled");
        assert_eq!(appointment.department, "Gynaecology");
        assert_eq!(appointment.date.as_deref(), Some("2025-03-20"));
        assert_eq!(appointment.time.as_deref(), Some("11:00"));
    }

    #[test]
    fn report_serializes_every_stage() {
        let report = text_processor().process_with_report(&text("Book dentist next Friday at 3pm"), KOLKATA);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["input_kind"], "text");
        assert_eq!(json["entities"]["date_phrase"], "friday");
        assert_eq!(json["normalized"]["time"], "15:00");
        assert_eq!(json["verdict"]["status"], "ok");
        assert_eq!(json["outcome"]["department"], "Dentistry");
        assert_eq!(json["outcome"]["status"], "ok");
    }

    #[test]
    fn clarification_outcome_serializes_as_verdict() {
        let outcome = text_processor().process(&text(""), KOLKATA);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "needs_clarification");
        assert!(json.get("department").is_none());
    }

    #[test]
    fn each_run_gets_its_own_request_id() {
        let processor = text_processor();
        let a = processor.process_with_report(&text("tomorrow 3pm"), KOLKATA);
        let b = processor.process_with_report(&text("tomorrow 3pm"), KOLKATA);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn default_build_runs_text_and_degrades_images() {
        let processor = build_processor(&PipelineConfig::default());
        assert!(!processor.has_recognizer());
        let outcome = processor.process(&text("Book dentist tomorrow at 3pm"), "");
        assert!(outcome.is_scheduled());
        let outcome = processor.process(&ProcessInput::Image(png_fixture()), "");
        assert_eq!(outcome.verdict().map(|v| v.message.as_str()), Some(UNREADABLE_MESSAGE));
    }
}
