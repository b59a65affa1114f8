//! Conversation turns.

use serde::Serialize;
use serde_json::Value;

use crate::research::Resource;

/// Turn identifier. Strictly increasing in append order, starting at 1.
pub type TurnId = u64;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    id: TurnId,
    role: Role,
    content: TurnContent,
}

impl Turn {
    pub(crate) fn user(id: TurnId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub(crate) fn assistant(id: TurnId, content: AssistantContent) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: TurnContent::Response(content),
        }
    }

    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &TurnContent {
        &self.content
    }

    /// Resources cached on an assistant turn; empty for user turns.
    pub fn resources(&self) -> &[Resource] {
        match &self.content {
            TurnContent::Response(response) => &response.resources,
            TurnContent::Text { .. } => &[],
        }
    }
}

/// Payload of a turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnContent {
    /// The user's trimmed prompt.
    Text { text: String },
    /// An assistant answer or a synthesized failure.
    Response(AssistantContent),
}

/// What the assistant produced for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantContent {
    raw: Value,
    resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AssistantContent {
    /// A successful response with resources derived from it.
    pub fn answered(raw: Value, resources: Vec<Resource>) -> Self {
        Self {
            raw,
            resources,
            error: None,
        }
    }

    /// A synthesized error document; never carries resources.
    pub fn failed(raw: Value, message: impl Into<String>) -> Self {
        Self {
            raw,
            resources: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// The parsed response body (or the synthesized error document).
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Failure text, when this turn stands in for a failed request.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
