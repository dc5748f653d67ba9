//! Tool execution and the follow-up model call.
//!
//! A model response may request tool calls. Each call naming a registered tool
//! is run and its result recorded in the conversation history, after which the
//! model is asked again so it can answer with the tool output in hand. Only a
//! single level of tool calls is supported: tool calls requested by the
//! follow-up response are not run.

use futures::StreamExt as _;
use sous_conversation::{ConversationHistory, ToolCall};
use tracing::{debug, error, info, warn};

use crate::{
    error::Result,
    parser::parse_response,
    prompt::Prompt,
    provider::Provider,
    stream::{ParsedStream, parse_stream},
    tool::ToolRegistry,
};

/// Runs tool calls and follow-up requests against a provider.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator<'a> {
    provider: &'a dyn Provider,
    tools: &'a ToolRegistry,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn Provider, tools: &'a ToolRegistry) -> Self {
        Self { provider, tools }
    }

    /// The prompt for the current state of the conversation, with the
    /// registered tools attached.
    #[must_use]
    pub fn prompt(&self, history: &ConversationHistory) -> Prompt {
        Prompt::from_history(history).with_tools(self.tools.definitions())
    }

    /// Run the given tool calls.
    ///
    /// Calls naming an unknown tool are logged and skipped. A failing tool is
    /// recorded as an error result, so the model can see what went wrong. The
    /// returned calls are all executed.
    pub async fn execute(&self, calls: Vec<ToolCall>) -> Vec<ToolCall> {
        let mut executed = Vec::with_capacity(calls.len());

        for mut call in calls {
            let Some(tool) = self.tools.get(&call.name) else {
                error!(id = %call.id, name = %call.name, "Tool not found, skipping call.");
                continue;
            };

            info!(id = %call.id, name = %call.name, arguments = ?call.arguments, "Calling tool.");
            let result = match tool.call(&call.arguments).await {
                Ok(output) => {
                    debug!(id = %call.id, output_len = output.len(), "Tool call succeeded.");
                    Ok(output)
                }
                Err(error) => {
                    warn!(id = %call.id, name = %call.name, %error, "Tool call failed.");
                    Err(error.to_string())
                }
            };

            // Calls come straight from a parser, so none is executed yet.
            if let Err(error) = call.record_response(result) {
                warn!(%error, "Ignoring duplicate tool response.");
                continue;
            }

            executed.push(call);
        }

        executed
    }

    /// Append an assistant turn declaring each executed call, followed by
    /// its result.
    pub fn record(
        history: &mut ConversationHistory,
        text: &str,
        executed: &[ToolCall],
    ) -> Result<()> {
        for call in executed {
            history.push_tool_exchange(text, call)?;
        }

        Ok(())
    }

    /// Run the tool calls of a response and record them in `history`.
    ///
    /// Returns `true` if a follow-up request should be made, i.e. at least one
    /// tool was run. Every recorded call is answered by then.
    pub async fn resolve(
        &self,
        history: &mut ConversationHistory,
        text: &str,
        calls: Vec<ToolCall>,
    ) -> Result<bool> {
        if calls.is_empty() {
            return Ok(false);
        }

        let executed = self.execute(calls).await;
        Self::record(history, text, &executed)?;

        debug_assert!(history.is_resolved(), "recorded tool calls left unanswered");

        let follow_up = !executed.is_empty();
        debug!(executed = executed.len(), follow_up, "Tool calls resolved.");

        Ok(follow_up)
    }

    /// Request the follow-up answer after tool results were recorded.
    pub async fn follow_up(&self, history: &ConversationHistory) -> Result<String> {
        let response = self
            .provider
            .chat_completion(&self.prompt(history))
            .await?;

        let parsed = parse_response(response);
        drop_chained_calls(&parsed.tool_calls);

        Ok(parsed.text)
    }

    /// Stream the follow-up answer after tool results were recorded.
    ///
    /// Tool calls completed by the follow-up are dropped.
    pub async fn follow_up_stream(
        &self,
        history: &ConversationHistory,
    ) -> Result<ParsedStream> {
        let chunks = self
            .provider
            .chat_completion_stream(&self.prompt(history))
            .await?;

        Ok(Box::pin(parse_stream(chunks).map(|chunk| {
            chunk.map(|mut chunk| {
                drop_chained_calls(&chunk.completed_tools);
                chunk.completed_tools.clear();
                chunk
            })
        })))
    }

    /// Complete a non-streamed turn: parse the response, run its tool calls
    /// and, if any ran, return the follow-up answer. Otherwise the response
    /// text is returned.
    ///
    /// The caller is expected to have appended the user turn to `history`, and
    /// to append the returned text as the assistant turn.
    pub async fn complete_turn(&self, history: &mut ConversationHistory) -> Result<String> {
        let response = self
            .provider
            .chat_completion(&self.prompt(history))
            .await?;
        let parsed = parse_response(response);

        if self.resolve(history, &parsed.text, parsed.tool_calls).await? {
            return self.follow_up(history).await;
        }

        Ok(parsed.text)
    }
}

fn drop_chained_calls(calls: &[ToolCall]) {
    for call in calls {
        warn!(
            id = %call.id,
            name = %call.name,
            "Follow-up response requested another tool call, ignoring."
        );
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
