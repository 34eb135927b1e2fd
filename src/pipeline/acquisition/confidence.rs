use super::types::OcrWordResult;
use crate::config::{HEURISTIC_CONFIDENCE_CAP, OCR_FALLBACK_CONFIDENCE};

/// Overall OCR confidence: mean word score scaled from 0-100 to 0-1.
///
/// Falls back to [`OCR_FALLBACK_CONFIDENCE`] when the engine gave no scores.
/// Rounded to two decimals and capped below certainty.
pub fn compute_ocr_confidence(words: &[OcrWordResult]) -> f32 {
    if words.is_empty() {
        return OCR_FALLBACK_CONFIDENCE;
    }

    let total: f32 = words.iter().map(|w| w.score).sum();
    let mean = total / (100.0 * words.len() as f32);

    clamp_heuristic(round2(mean))
}

/// Clamp a heuristic confidence into `[0, 0.99]`.
pub fn clamp_heuristic(confidence: f32) -> f32 {
    confidence.clamp(0.0, HEURISTIC_CONFIDENCE_CAP)
}

/// Round to two decimals, the precision confidences are reported with.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(scores: &[f32]) -> Vec<OcrWordResult> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| OcrWordResult {
                text: format!("w{i}"),
                score,
            })
            .collect()
    }

    #[test]
    fn mean_of_scores_scaled_to_unit() {
        let conf = compute_ocr_confidence(&words(&[90.0, 80.0, 70.0]));
        assert!((conf - 0.80).abs() < f32::EPSILON, "got {conf}");
    }

    #[test]
    fn no_scores_uses_fallback() {
        let conf = compute_ocr_confidence(&[]);
        assert!((conf - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn perfect_scores_are_capped() {
        let conf = compute_ocr_confidence(&words(&[100.0, 100.0]));
        assert!((conf - 0.99).abs() < f32::EPSILON);
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        let conf = compute_ocr_confidence(&words(&[91.0, 92.0, 92.0]));
        // 91.666.. / 100 -> 0.92
        assert!((conf - 0.92).abs() < f32::EPSILON, "got {conf}");
    }

    #[test]
    fn clamp_handles_out_of_range() {
        assert_eq!(clamp_heuristic(-0.2), 0.0);
        assert!((clamp_heuristic(1.4) - 0.99).abs() < f32::EPSILON);
        assert!((clamp_heuristic(0.42) - 0.42).abs() < f32::EPSILON);
    }
}
