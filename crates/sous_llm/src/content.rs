//! The content model shared by providers and parsers.
//!
//! A model response is either a plain string or an ordered list of
//! [`ContentStep`]s. The same shape is used for a complete response
//! ([`ModelResponse`]) and for a single piece of a streamed response
//! ([`ResponseChunk`]). In the streamed case, a tool-use step usually carries
//! only a fragment of the arguments (`partial_json`), and the stream `index`
//! ties fragments of the same tool call together.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single step of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentStep {
    Text {
        text: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    ToolUse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,

        /// A fragment of the JSON-encoded arguments.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partial_json: Option<String>,

        /// The complete arguments, as sent in non-streamed responses.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<Map<String, Value>>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// The end of the streamed content block at `index`.
    BlockStop { index: usize },

    /// Any step type this crate does not act on (e.g. `thinking`).
    #[serde(other)]
    Other,
}

impl ContentStep {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            index: None,
        }
    }

    /// A complete tool-use step, as found in non-streamed responses.
    #[must_use]
    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: Map<String, Value>,
    ) -> Self {
        Self::ToolUse {
            id: Some(id.into()),
            name: Some(name.into()),
            partial_json: None,
            input: Some(input),
            index: None,
        }
    }

    /// The opening step of a streamed tool call.
    #[must_use]
    pub fn tool_use_start(index: usize, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ToolUse {
            id: Some(id.into()),
            name: Some(name.into()),
            partial_json: Some(String::new()),
            input: None,
            index: Some(index),
        }
    }

    /// An argument fragment of a streamed tool call.
    #[must_use]
    pub fn tool_use_delta(index: usize, partial_json: impl Into<String>) -> Self {
        Self::ToolUse {
            id: None,
            name: None,
            partial_json: Some(partial_json.into()),
            input: None,
            index: Some(index),
        }
    }

    #[must_use]
    pub const fn block_stop(index: usize) -> Self {
        Self::BlockStop { index }
    }
}

/// The content of a response or response chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Steps(Vec<ContentStep>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl MessageContent {
    /// Returns `true` if there is nothing to parse.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Steps(steps) => steps.is_empty(),
        }
    }

    /// The content as a list of steps. Plain text becomes a single text step.
    #[must_use]
    pub fn into_steps(self) -> Vec<ContentStep> {
        match self {
            Self::Text(text) if text.is_empty() => vec![],
            Self::Text(text) => vec![ContentStep::text(text)],
            Self::Steps(steps) => steps,
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<ContentStep>> for MessageContent {
    fn from(steps: Vec<ContentStep>) -> Self {
        Self::Steps(steps)
    }
}

/// A complete, non-streamed model response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: MessageContent,
}

impl ModelResponse {
    #[must_use]
    pub fn new(content: impl Into<MessageContent>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// One piece of a streamed model response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseChunk {
    pub content: MessageContent,
}

impl ResponseChunk {
    #[must_use]
    pub fn new(content: impl Into<MessageContent>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// A chunk without content, emitted for stream events that carry no
    /// output.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}
