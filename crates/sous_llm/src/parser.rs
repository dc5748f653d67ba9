//! Parsing of complete, non-streamed model responses.

use serde_json::{Map, Value};
use sous_conversation::ToolCall;
use tracing::{debug, warn};

use crate::content::{ContentStep, ModelResponse};

/// The text and tool calls extracted from a model response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedResponse {
    pub text: String,

    /// Tool calls in the order the model requested them, all pending.
    pub tool_calls: Vec<ToolCall>,
}

/// Parse a complete model response.
///
/// If the response contains multiple text steps, the last one wins. Faulty
/// tool-use steps are logged and skipped; parsing itself never fails.
#[must_use]
pub fn parse_response(response: ModelResponse) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();

    for step in response.content.into_steps() {
        match step {
            ContentStep::Text { text, .. } => parsed.text = text,
            ContentStep::ToolUse {
                id,
                name,
                partial_json,
                input,
                ..
            } => match tool_call(id, name, partial_json, input) {
                Ok(call) => {
                    debug!(id = %call.id, name = %call.name, "Parsed tool call.");
                    parsed.tool_calls.push(call);
                }
                Err(reason) => warn!(%reason, "Skipping faulty tool-use step."),
            },
            ContentStep::BlockStop { .. } | ContentStep::Other => {}
        }
    }

    debug!(
        text_len = parsed.text.len(),
        tool_calls = parsed.tool_calls.len(),
        "Response parsed."
    );

    parsed
}

fn tool_call(
    id: Option<String>,
    name: Option<String>,
    partial_json: Option<String>,
    input: Option<Map<String, Value>>,
) -> Result<ToolCall, String> {
    let id = id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "missing id".to_owned())?;
    let name = name
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("tool call {id} is missing a name"))?;

    let arguments = match (partial_json.as_deref().map(str::trim), input) {
        (Some(json), _) if !json.is_empty() => serde_json::from_str(json)
            .map_err(|error| format!("tool call {id} has invalid arguments: {error}"))?,
        (_, Some(input)) => input,
        _ => Map::new(),
    };

    Ok(ToolCall::pending(id, name, arguments))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
