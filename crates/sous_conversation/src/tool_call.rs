//! See [`ToolCall`] and [`ToolCallResponse`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    turn::ToolUse,
};

/// A request from the model to run a tool.
///
/// Parsers create tool calls in the *pending* state, without a response. Tool
/// execution records the response exactly once, after which the call is
/// *executed* and can no longer change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier of this call within one model response.
    pub id: String,

    /// Name of the tool to run.
    pub name: String,

    /// Arguments to pass to the tool.
    pub arguments: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<ToolCallResponse>,
}

impl ToolCall {
    /// Creates a new pending tool call.
    #[must_use]
    pub fn pending(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            response: None,
        }
    }

    /// Returns `true` once a response has been recorded.
    #[must_use]
    pub const fn is_executed(&self) -> bool {
        self.response.is_some()
    }

    /// The recorded response, if the call was executed.
    #[must_use]
    pub const fn response(&self) -> Option<&ToolCallResponse> {
        self.response.as_ref()
    }

    /// Record the outcome of running the tool.
    ///
    /// `Ok` holds the tool output, `Err` the error message shown to the model.
    pub fn record_response(&mut self, result: std::result::Result<String, String>) -> Result<()> {
        if self.response.is_some() {
            return Err(Error::AlreadyExecuted(self.id.clone()));
        }

        self.response = Some(ToolCallResponse {
            id: self.id.clone(),
            result,
        });

        Ok(())
    }

    /// The tool-use declaration the assistant made for this call.
    #[must_use]
    pub fn to_tool_use(&self) -> ToolUse {
        ToolUse {
            id: self.id.clone(),
            name: self.name.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

/// The result of executing a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallResponse {
    /// ID matching the corresponding [`ToolCall`].
    pub id: String,

    /// `Ok(content)` on success, `Err(error)` on failure.
    pub result: std::result::Result<String, String>,
}

impl ToolCallResponse {
    /// Get the content of the response, either the result or the error.
    #[must_use]
    pub fn content(&self) -> &str {
        match &self.result {
            Ok(content) | Err(content) => content,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.result.is_err()
    }
}

// Flattened so errors are easy to recognize in serialized form.
impl Serialize for ToolCallResponse {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Helper<'a> {
            id: &'a str,
            content: &'a str,
            is_error: bool,
        }

        Helper {
            id: &self.id,
            content: self.content(),
            is_error: self.is_error(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToolCallResponse {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            id: String,
            content: String,
            #[serde(default)]
            is_error: bool,
        }

        let helper = Helper::deserialize(deserializer)?;

        Ok(Self {
            id: helper.id,
            result: if helper.is_error {
                Err(helper.content)
            } else {
                Ok(helper.content)
            },
        })
    }
}

#[cfg(test)]
#[path = "tool_call_tests.rs"]
mod tests;
