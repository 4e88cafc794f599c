use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::models::code::{CodeSnippet, Response};
use crate::models::message::Message;
use crate::types::Prompt;
use crate::validation::{deserialize_via_decoder, Fields, Record, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub user_id: String,
    pub messages: Vec<Message>, // conversation order
    pub name: String,
    pub code: CodeSnippet,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub const DEFAULT_NAME: &'static str = "New Chat";

    pub fn new(user_id: &str) -> Self {
        Chat {
            user_id: user_id.to_string(),
            messages: Vec::new(),
            name: Chat::DEFAULT_NAME.to_string(),
            code: CodeSnippet::default(),
            created_at: now(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_code(mut self, code: CodeSnippet) -> Self {
        self.code = code;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Appends to the end of the conversation. No dedup, no cap.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Swaps in a new snippet wholesale and hands back the previous one.
    pub fn replace_code(&mut self, code: CodeSnippet) -> CodeSnippet {
        std::mem::replace(&mut self.code, code)
    }

    /// Folds one prompt/response exchange into the chat: the prompt becomes a
    /// user turn, the explanation an ai turn, and the response's code
    /// replaces the current snippet.
    pub fn apply_response(&mut self, prompt: &Prompt, response: Response) {
        let (code, explanation) = response.into_parts();

        self.push_message(Message::user(&prompt.input));
        self.push_message(Message::ai(&explanation));
        self.replace_code(code);

        debug!(
            "Chat for user {} updated, {} messages",
            self.user_id,
            self.messages.len()
        );
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

// Stored with microsecond precision so it survives a trip through JSON
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl Record for Chat {
    const ENTITY: &'static str = "Chat";

    fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError> {
        Ok(Chat {
            user_id: fields.required_text("userId")?,
            messages: fields.records("messages")?.unwrap_or_default(),
            name: fields
                .text("name")?
                .unwrap_or_else(|| Chat::DEFAULT_NAME.to_string()),
            code: fields.record("code")?.unwrap_or_default(),
            created_at: fields.timestamp("createdAt")?.unwrap_or_else(now),
        })
    }
}

deserialize_via_decoder!(Chat);
