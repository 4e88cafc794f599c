//! Records exchanged by a chat that turns prompts into HTML/CSS/JS pages:
//! messages, code snippets, generation responses, chats and prompts, plus
//! the validating JSON decoder they share.

pub mod config;
pub mod models;
pub mod openapi;
pub mod types;
pub mod validation;

pub use config::{AppConfig, UnknownFields};
pub use models::{Chat, CodeSnippet, Message, MessageType, Response, SnippetFields};
pub use openapi::ApiDoc;
pub use types::Prompt;
pub use validation::{Decoder, Record, ValidationError, ValidationErrorKind};
