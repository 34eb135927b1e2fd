use super::types::{EntityRecognizer, EntitySpan, SpanLabel};
use super::RecognizerError;

// ═══════════════════════════════════════════════════════════
// ONNX token-classification recognizer, behind the `onnx-ner` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-ner")]
mod onnx {
    use super::{group_bio_tokens, EntityRecognizer, EntitySpan, RecognizerError, TaggedToken};
    use ort::session::Session;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    /// Named-entity recognizer running a token-classification model with ONNX Runtime.
    ///
    /// The model directory must contain:
    /// - `model.onnx`: BERT-style model taking `input_ids`, `attention_mask`,
    ///   `token_type_ids` and returning logits `[1, seq_len, num_labels]`
    /// - `tokenizer.json`: HuggingFace tokenizer definition
    /// - `config.json`: HuggingFace config with an `id2label` map (BIO tags)
    ///
    /// The session sits behind a Mutex because `Session::run` requires `&mut self`.
    pub struct OnnxEntityRecognizer {
        session: Mutex<Session>,
        tokenizer: tokenizers::Tokenizer,
        labels: Vec<String>,
    }

    impl OnnxEntityRecognizer {
        pub fn load(model_dir: &Path) -> Result<Self, RecognizerError> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");
            let config_path = model_dir.join("config.json");

            for path in [&model_path, &tokenizer_path, &config_path] {
                if !path.exists() {
                    return Err(RecognizerError::ModelNotFound(path.clone()));
                }
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| RecognizerError::ModelInit(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| RecognizerError::ModelInit(e.to_string()))?
                .commit_from_file(&model_path)
                .map_err(|e: ort::Error| {
                    RecognizerError::ModelInit(format!("ONNX load failed: {e}"))
                })?;

            let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| RecognizerError::ModelInit(format!("Tokenizer load failed: {e}")))?;

            let labels = load_labels(&config_path)?;

            tracing::info!(
                labels = labels.len(),
                "ONNX entity recognizer loaded from {}",
                model_dir.display()
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                labels,
            })
        }

        fn infer(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
            use ort::value::TensorRef;

            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| RecognizerError::Tokenization(e.to_string()))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> = encoding
                .get_type_ids()
                .iter()
                .map(|&t| t as i64)
                .collect();

            let seq_len = input_ids.len();

            let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;
            let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask)
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;
            let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;

            let ids_tensor = TensorRef::from_array_view(&ids_array)
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;
            let mask_tensor = TensorRef::from_array_view(&mask_array)
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;
            let type_tensor = TensorRef::from_array_view(&type_array)
                .map_err(|e| RecognizerError::Inference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| RecognizerError::Inference("Session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
                .map_err(|e| RecognizerError::Inference(format!("ONNX inference failed: {e}")))?;

            let (shape, logits) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| RecognizerError::Inference(format!("Output extraction: {e}")))?;

            let num_labels = self.labels.len();
            if shape.len() != 3 || shape[1] as usize != seq_len || shape[2] as usize != num_labels {
                return Err(RecognizerError::Inference(format!(
                    "Unexpected output shape: {shape:?}, expected [1, {seq_len}, {num_labels}]"
                )));
            }

            let special = encoding.get_special_tokens_mask();
            let offsets = encoding.get_offsets();

            let tokens: Vec<TaggedToken<'_>> = (0..seq_len)
                .filter(|&i| special.get(i).copied().unwrap_or(0) == 0)
                .map(|i| {
                    let row = &logits[i * num_labels..(i + 1) * num_labels];
                    let best = row
                        .iter()
                        .enumerate()
                        .max_by(|a, b| a.1.total_cmp(b.1))
                        .map(|(idx, _)| idx)
                        .unwrap_or(0);
                    TaggedToken {
                        tag: self.labels[best].as_str(),
                        start: offsets[i].0,
                        end: offsets[i].1,
                    }
                })
                .collect();

            Ok(group_bio_tokens(text, &tokens))
        }
    }

    impl EntityRecognizer for OnnxEntityRecognizer {
        fn find_spans(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
            self.infer(text)
        }
    }

    /// Read `id2label` from a HuggingFace `config.json` into an index-ordered list.
    fn load_labels(config_path: &Path) -> Result<Vec<String>, RecognizerError> {
        #[derive(serde::Deserialize)]
        struct ModelConfig {
            id2label: HashMap<String, String>,
        }

        let raw = std::fs::read_to_string(config_path)
            .map_err(|e| RecognizerError::ModelInit(format!("Config read failed: {e}")))?;
        let config: ModelConfig = serde_json::from_str(&raw)
            .map_err(|e| RecognizerError::ModelInit(format!("Config parse failed: {e}")))?;

        let mut labels = vec![String::new(); config.id2label.len()];
        for (id, label) in config.id2label {
            let idx: usize = id
                .parse()
                .map_err(|_| RecognizerError::ModelInit(format!("Bad label id: {id}")))?;
            let slot = labels
                .get_mut(idx)
                .ok_or_else(|| RecognizerError::ModelInit(format!("Label id out of range: {idx}")))?;
            *slot = label;
        }
        Ok(labels)
    }
}

#[cfg(feature = "onnx-ner")]
pub use onnx::OnnxEntityRecognizer;

/// A token with its predicted tag and byte offsets into the source text.
#[derive(Debug, Clone, Copy)]
pub struct TaggedToken<'a> {
    /// `O`, `B-DATE`, `I-TIME`, or a bare `DATE`.
    pub tag: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Merge tagged tokens into labelled spans.
///
/// A span opens on `B-X` (or on `I-X` / bare `X` after a different label)
/// and extends over following `I-X` / `X` tokens. `O` closes it.
/// Span text is the source slice from first to last token, so inner
/// whitespace is preserved.
pub fn group_bio_tokens(text: &str, tokens: &[TaggedToken<'_>]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut current: Option<(String, usize, usize)> = None;

    let mut close = |current: &mut Option<(String, usize, usize)>| {
        if let Some((label, start, end)) = current.take() {
            if let Some(slice) = text.get(start..end) {
                let slice = slice.trim();
                if !slice.is_empty() {
                    spans.push(EntitySpan {
                        label: SpanLabel::from_tag(&label),
                        text: slice.to_string(),
                    });
                }
            }
        }
    };

    for token in tokens {
        let (prefix, label) = match token.tag.split_once('-') {
            Some((p, l)) if p == "B" || p == "I" => (p, l),
            _ => ("", token.tag),
        };

        if label == "O" || label.is_empty() {
            close(&mut current);
            continue;
        }

        let continues = match &current {
            Some((open_label, _, _)) => prefix != "B" && open_label == label,
            None => false,
        };

        if continues {
            if let Some((_, _, end)) = current.as_mut() {
                *end = token.end;
            }
        } else {
            close(&mut current);
            current = Some((label.to_string(), token.start, token.end));
        }
    }
    close(&mut current);

    spans
}

/// Mock recognizer for testing. Returns configured spans or an error.
pub struct MockEntityRecognizer {
    spans: Vec<EntitySpan>,
    fail: bool,
}

impl MockEntityRecognizer {
    pub fn new(spans: Vec<EntitySpan>) -> Self {
        Self { spans, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            spans: Vec::new(),
            fail: true,
        }
    }
}

impl EntityRecognizer for MockEntityRecognizer {
    fn find_spans(&self, _text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        if self.fail {
            return Err(RecognizerError::Inference("mock failure".into()));
        }
        Ok(self.spans.clone())
    }
}
