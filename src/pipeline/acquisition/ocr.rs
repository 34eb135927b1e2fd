use super::types::{OcrEngine, OcrPageResult, OcrWordResult};
use super::AcquisitionError;

/// Bundled Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct BundledTesseract {
    tessdata_dir: std::path::PathBuf,
    lang: String,
}

#[cfg(feature = "ocr")]
impl BundledTesseract {
    /// Initialize with a tessdata directory holding `eng.traineddata`.
    pub fn new(tessdata_dir: &std::path::Path) -> Result<Self, AcquisitionError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(AcquisitionError::TessdataNotFound(tessdata_dir.to_path_buf()));
        }

        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            lang: "eng".to_string(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for BundledTesseract {
    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPageResult, AcquisitionError> {
        let tessdata_str = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| AcquisitionError::OcrInit("Invalid tessdata path".into()))?;

        let tess = tesseract::Tesseract::new(Some(tessdata_str), Some(self.lang.as_str()))
            .map_err(|e| AcquisitionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| AcquisitionError::OcrProcessing(format!("{e:?}")))?;

        let text = tess
            .get_text()
            .map_err(|e| AcquisitionError::OcrProcessing(format!("{e:?}")))?;

        // Word scores come from TSV output. Losing them is not fatal:
        // the caller falls back to a fixed confidence.
        let word_confidences = match tess.get_tsv_text(0) {
            Ok(tsv) => parse_tsv_word_confidences(&tsv),
            Err(e) => {
                tracing::warn!(error = ?e, "Tesseract TSV output unavailable, no word scores");
                Vec::new()
            }
        };

        Ok(OcrPageResult {
            text,
            word_confidences,
        })
    }
}

/// Mock OCR engine for tests, and the stand-in when Tesseract is not installed.
pub struct MockOcrEngine {
    outcome: Result<(String, Option<f32>), String>,
}

impl MockOcrEngine {
    /// Recognizes `text`, scoring every word `score` (0-100).
    pub fn new(text: &str, score: f32) -> Self {
        Self {
            outcome: Ok((text.to_string(), Some(score))),
        }
    }

    /// Recognizes `text` but reports no per-word scores.
    pub fn without_scores(text: &str) -> Self {
        Self {
            outcome: Ok((text.to_string(), None)),
        }
    }

    /// Fails every call with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, AcquisitionError> {
        let (text, score) = self
            .outcome
            .as_ref()
            .map_err(|reason| AcquisitionError::OcrUnavailable(reason.clone()))?;

        let word_confidences = match score {
            Some(score) => text
                .split_whitespace()
                .map(|w| OcrWordResult {
                    text: w.to_string(),
                    score: *score,
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(OcrPageResult {
            text: text.clone(),
            word_confidences,
        })
    }
}

/// Parse Tesseract TSV output to extract per-word scores.
/// TSV columns: level page_num block_num par_num line_num word_num left top width height conf text
/// Level 5 = individual word entries. Scores stay on Tesseract's 0-100 scale.
/// Words scored -1 (no confidence assigned) are dropped.
pub fn parse_tsv_word_confidences(tsv: &str) -> Vec<OcrWordResult> {
    let mut results = Vec::new();

    for line in tsv.lines().skip(1) {
        // Skip header row
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // Level 5 = word
        let level: i32 = match fields[0].parse() {
            Ok(l) => l,
            Err(_) => continue,
        };
        if level != 5 {
            continue;
        }

        // Tesseract 5 may print fractional confidences
        let conf: f32 = match fields[10].trim().parse() {
            Ok(c) => c,
            Err(_) => continue,
        };
        if conf < 0.0 {
            continue;
        }

        let word = fields[11].trim();
        if word.is_empty() {
            continue;
        }

        results.push(OcrWordResult {
            text: word.to_string(),
            score: conf,
        });
    }

    results
}
