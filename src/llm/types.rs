use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DocumentPayload;
use crate::schema::{ConversationTurn, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn document(document: &DocumentPayload) -> Self {
        Part::InlineData {
            inline_data: Blob {
                mime_type: document.mime_type.clone(),
                data: document.data.clone(),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::InlineData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user_with_document(text: impl Into<String>, document: &DocumentPayload) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text), Part::document(document)],
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

impl From<&ConversationTurn> for Content {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role,
            parts: vec![Part::text(turn.content.clone())],
        }
    }
}

/// One call to the model: role-tagged contents plus an optional output schema.
///
/// `response_schema: None` means free-text output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub flow: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    pub fn new(flow: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            system_instruction: None,
            contents: Vec::new(),
            response_schema: None,
        }
    }

    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}
