use serde::Serialize;
use utoipa::ToSchema;

use crate::validation::{deserialize_via_decoder, Fields, Record, ValidationError};

/// Request payload asking for a generated page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Prompt {
    pub input: String,
}

impl Prompt {
    pub fn new(input: &str) -> Self {
        Prompt {
            input: input.to_string(),
        }
    }
}

impl Record for Prompt {
    const ENTITY: &'static str = "Prompt";

    fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError> {
        Ok(Prompt {
            input: fields.required_text("input")?,
        })
    }
}

deserialize_via_decoder!(Prompt);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Decoder, ValidationErrorKind};

    #[test]
    fn test_prompt_requires_input() {
        let err = Decoder::default().decode_str::<Prompt>("{}").unwrap_err();
        assert_eq!(err.entity, "Prompt");
        assert_eq!(err.field, "input");
        assert_eq!(err.kind, ValidationErrorKind::Missing);
        assert_eq!(err.to_string(), "invalid Prompt at `input`: missing required field");
    }

    #[test]
    fn test_prompt_round_trip() {
        let prompt = Prompt::new("a todo list with dark mode");
        let json = serde_json::to_string(&prompt).unwrap();
        assert_eq!(json, r#"{"input":"a todo list with dark mode"}"#);
        assert_eq!(serde_json::from_str::<Prompt>(&json).unwrap(), prompt);
    }

    #[test]
    fn test_prompt_rejects_unknown_fields() {
        let err = Decoder::default()
            .decode_str::<Prompt>(r#"{"input":"x","temperature":0.2}"#)
            .unwrap_err();
        assert_eq!(err.field, "temperature");
        assert_eq!(err.kind, ValidationErrorKind::UnknownField);
    }
}
