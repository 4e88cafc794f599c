use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::{
    deserialize_via_decoder, Fields, Record, ValidationError, ValidationErrorKind,
};

/// Who authored a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")] // JSON value name
pub enum MessageType {
    Ai,
    #[default]
    User,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Ai => "ai",
            MessageType::User => "user",
        }
    }
}

impl FromStr for MessageType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(MessageType::Ai),
            "user" => Ok(MessageType::User),
            other => Err(ValidationError::new(
                "MessageType",
                "",
                ValidationErrorKind::InvalidVariant {
                    value: other.to_string(),
                },
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Message {
    pub id: String, // 32 lowercase hex chars unless supplied by the caller
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
}

impl Message {
    pub fn new(kind: MessageType, content: &str) -> Self {
        Message {
            kind,
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn user(content: &str) -> Self {
        Message::new(MessageType::User, content)
    }

    pub fn ai(content: &str) -> Self {
        Message::new(MessageType::Ai, content)
    }

    /// Random v4 UUID rendered without hyphens.
    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl Default for Message {
    fn default() -> Self {
        Message {
            id: Message::generate_id(),
            kind: MessageType::User,
            content: String::new(),
        }
    }
}

impl Record for Message {
    const ENTITY: &'static str = "Message";

    fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError> {
        Ok(Message {
            id: fields.text("id")?.unwrap_or_else(Message::generate_id),
            kind: fields.variant("type")?.unwrap_or_default(),
            content: fields.text("content")?.unwrap_or_default(),
        })
    }
}

deserialize_via_decoder!(Message);
