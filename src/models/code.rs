use serde::Serialize;
use utoipa::ToSchema;

use crate::validation::{deserialize_via_decoder, Fields, Record, ValidationError};

/// Read access to the html/css/js triple, shared by snippets and responses.
pub trait SnippetFields {
    fn html(&self) -> &str;
    fn css(&self) -> &str;
    fn js(&self) -> &str;

    fn to_snippet(&self) -> CodeSnippet {
        CodeSnippet::new(self.html(), self.css(), self.js())
    }
}

/// Generated page source. The strings are opaque: nothing here parses,
/// sanitizes or bounds them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CodeSnippet {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl CodeSnippet {
    pub fn new(html: &str, css: &str, js: &str) -> Self {
        CodeSnippet {
            html: html.to_string(),
            css: css.to_string(),
            js: js.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }

    fn take_from(fields: &mut Fields) -> Result<Self, ValidationError> {
        Ok(CodeSnippet {
            html: fields.text("html")?.unwrap_or_default(),
            css: fields.text("css")?.unwrap_or_default(),
            js: fields.text("js")?.unwrap_or_default(),
        })
    }
}

impl SnippetFields for CodeSnippet {
    fn html(&self) -> &str {
        &self.html
    }

    fn css(&self) -> &str {
        &self.css
    }

    fn js(&self) -> &str {
        &self.js
    }
}

impl Record for CodeSnippet {
    const ENTITY: &'static str = "CodeSnippet";

    fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError> {
        CodeSnippet::take_from(fields)
    }
}

/// Output of a generation run: code plus a prose explanation. Serialized
/// flat, so the code fields sit next to `explanation`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Response {
    #[serde(flatten)]
    pub code: CodeSnippet,
    pub explanation: String,
}

impl Response {
    pub fn new(code: CodeSnippet, explanation: &str) -> Self {
        Response {
            code,
            explanation: explanation.to_string(),
        }
    }

    pub fn into_parts(self) -> (CodeSnippet, String) {
        (self.code, self.explanation)
    }
}

impl SnippetFields for Response {
    fn html(&self) -> &str {
        &self.code.html
    }

    fn css(&self) -> &str {
        &self.code.css
    }

    fn js(&self) -> &str {
        &self.code.js
    }
}

impl From<Response> for CodeSnippet {
    fn from(response: Response) -> Self {
        response.code
    }
}

impl Record for Response {
    const ENTITY: &'static str = "Response";

    fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError> {
        Ok(Response {
            code: CodeSnippet::take_from(fields)?,
            explanation: fields.text("explanation")?.unwrap_or_default(),
        })
    }
}

deserialize_via_decoder!(CodeSnippet, Response);
