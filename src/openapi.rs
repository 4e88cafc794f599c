use utoipa::OpenApi;

use crate::models::{Chat, CodeSnippet, Message, MessageType, Response};
use crate::types::Prompt;

/// Schema components for whichever HTTP layer serves these records.
#[derive(OpenApi)]
#[openapi(components(schemas(Chat, Message, MessageType, CodeSnippet, Response, Prompt)))]
pub struct ApiDoc;
