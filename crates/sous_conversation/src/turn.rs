//! See [`Turn`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    /// A message typed by the user.
    User { text: String },

    /// A response from the assistant, optionally declaring tool calls.
    Assistant {
        text: String,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_uses: Vec<ToolUse>,
    },

    /// The result of a tool call declared by a preceding [`Turn::Assistant`].
    ToolResult {
        tool_call_id: String,
        name: String,
        payload: String,

        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_uses: vec![],
        }
    }

    #[must_use]
    pub fn assistant_with_tool_use(text: impl Into<String>, tool_use: ToolUse) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_uses: vec![tool_use],
        }
    }

    #[must_use]
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        payload: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            payload: payload.into(),
            is_error,
        }
    }

    /// The text of a user or assistant turn, or the payload of a tool result.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::User { text } | Self::Assistant { text, .. } => text,
            Self::ToolResult { payload, .. } => payload,
        }
    }

    /// The tool calls declared by this turn.
    #[must_use]
    pub fn tool_uses(&self) -> &[ToolUse] {
        match self {
            Self::Assistant { tool_uses, .. } => tool_uses,
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    #[must_use]
    pub const fn is_tool_result(&self) -> bool {
        matches!(self, Self::ToolResult { .. })
    }

    /// The id of the tool call answered by this turn, if it is a tool result.
    #[must_use]
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::ToolResult { tool_call_id, .. } => Some(tool_call_id),
            _ => None,
        }
    }
}

/// A tool call declared by the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub arguments: Map<String, Value>,
}
