pub mod chat;
pub mod code;
pub mod message;

pub use chat::Chat;
pub use code::{CodeSnippet, Response, SnippetFields};
pub use message::{Message, MessageType};
