use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Slotwise";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timezone used when the caller does not name one.
pub const DEFAULT_LOCALE: &str = "Asia/Kolkata";

/// Longest image side handed to the OCR engine, in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 1600;

/// Confidence reported for text typed by the user.
pub const LITERAL_TEXT_CONFIDENCE: f32 = 0.99;

/// Confidence reported for OCR output when the engine gives no per-word scores.
pub const OCR_FALLBACK_CONFIDENCE: f32 = 0.8;

/// Confidence reported for any date/time that resolved.
pub const NORMALIZATION_SUCCESS_CONFIDENCE: f32 = 0.95;

/// Heuristic stages never claim certainty.
pub const HEURISTIC_CONFIDENCE_CAP: f32 = 0.99;

/// Default tracing filter, overridable with `SLOTWISE_LOG` (and `RUST_LOG`).
pub fn default_log_filter() -> String {
    std::env::var("SLOTWISE_LOG").unwrap_or_else(|_| "slotwise_lib=info,slotwise=info".to_string())
}

/// Locale from `SLOTWISE_LOCALE`, else [`DEFAULT_LOCALE`].
pub fn default_locale() -> String {
    std::env::var("SLOTWISE_LOCALE")
        .ok()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Get the application data directory
/// ~/Slotwise/ on all platforms. Falls back to the working directory
/// when no home directory can be determined (containers, CI).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the models directory
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Get the entity recognizer model directory.
/// `SLOTWISE_NER_MODEL_DIR` wins over the default location.
pub fn ner_model_dir() -> PathBuf {
    match std::env::var("SLOTWISE_NER_MODEL_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => models_dir().join("ner"),
    }
}

/// Candidate tessdata directories, in lookup order.
pub fn tessdata_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(path) = std::env::var("TESSDATA_PREFIX") {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(app_data_dir().join("tessdata"));
    for path in [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
        "/opt/homebrew/share/tessdata",
    ] {
        candidates.push(PathBuf::from(path));
    }
    candidates
}

/// First candidate directory holding English traineddata.
pub fn tessdata_dir() -> Option<PathBuf> {
    first_tessdata_dir(tessdata_candidates())
}

fn first_tessdata_dir(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|p| p.join("eng.traineddata").exists())
}

/// `dir` if it holds an exported `model.onnx`.
fn installed_ner_model(dir: PathBuf) -> Option<PathBuf> {
    dir.join("model.onnx").exists().then_some(dir)
}

/// Everything the processor factory needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_locale: String,
    pub tessdata_dir: Option<PathBuf>,
    pub ner_model_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            default_locale: default_locale(),
            tessdata_dir: tessdata_dir(),
            ner_model_dir: installed_ner_model(ner_model_dir()),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            tessdata_dir: None,
            ner_model_dir: None,
        }
    }
}
