use thiserror::Error;

use super::enums::InputKind;

/// Raw material for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessInput {
    /// Text typed by the user.
    Text(String),
    /// Encoded image bytes (PNG, JPEG, TIFF).
    Image(Vec<u8>),
}

/// Caller broke the input contract: the payload for the declared kind is absent.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("text is required when input_type=text")]
    MissingText,

    #[error("image bytes are required when input_type=image")]
    MissingImage,
}

impl ProcessInput {
    /// Build an input from the loosely-typed fields a boundary layer receives.
    ///
    /// Only the payload matching `kind` is consulted; the other one is ignored.
    /// An empty string is accepted: emptiness is a pipeline concern, absence is not.
    pub fn from_parts(
        kind: InputKind,
        text: Option<String>,
        image_bytes: Option<Vec<u8>>,
    ) -> Result<Self, InputError> {
        match kind {
            InputKind::Text => text.map(Self::Text).ok_or(InputError::MissingText),
            InputKind::Image => image_bytes.map(Self::Image).ok_or(InputError::MissingImage),
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Text(_) => InputKind::Text,
            Self::Image(_) => InputKind::Image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_kind_takes_text_payload() {
        let input = ProcessInput::from_parts(InputKind::Text, Some("tomorrow 3pm".into()), None)
            .unwrap();
        assert_eq!(input, ProcessInput::Text("tomorrow 3pm".into()));
        assert_eq!(input.kind(), InputKind::Text);
    }

    #[test]
    fn image_kind_ignores_text_payload() {
        let input =
            ProcessInput::from_parts(InputKind::Image, Some("ignored".into()), Some(vec![1, 2, 3]))
                .unwrap();
        assert_eq!(input, ProcessInput::Image(vec![1, 2, 3]));
    }

    #[test]
    fn missing_payload_is_rejected() {
        assert_eq!(
            ProcessInput::from_parts(InputKind::Text, None, Some(vec![1])),
            Err(InputError::MissingText)
        );
        assert_eq!(
            ProcessInput::from_parts(InputKind::Image, Some("x".into()), None),
            Err(InputError::MissingImage)
        );
    }

    #[test]
    fn empty_text_is_accepted() {
        let input = ProcessInput::from_parts(InputKind::Text, Some(String::new()), None).unwrap();
        assert_eq!(input, ProcessInput::Text(String::new()));
    }
}
