//! The chat session behind the widget.

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt as _};
use sous_conversation::{ConversationHistory, DisplayHistory, DisplayTurn, ToolCall};
use sous_llm::{Orchestrator, Provider, ToolRegistry, parse_response, parse_stream};
use tracing::{error, info, trace};

/// Reply shown in place of the answer when a turn fails.
const ERROR_REPLY: &str = "Sorry, I ran into a problem while answering. Please try again.";

/// Owns the conversation history of the single chat session.
///
/// The display history is owned by the widget and handed in with every
/// request. The manager only appends to it.
#[derive(Debug)]
pub(crate) struct ChatManager {
    history: ConversationHistory,
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
}

impl ChatManager {
    pub(crate) fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            history: ConversationHistory::new(),
            provider,
            tools,
        }
    }

    /// Append the user message to the history, and a pending exchange to the
    /// display.
    pub(crate) fn add_user_message(
        &mut self,
        text: &str,
        mut display: DisplayHistory,
    ) -> DisplayHistory {
        self.history.push_user(text);
        display.push(DisplayTurn::pending(text));
        display
    }

    /// Run a full turn for `text`, yielding the display after every change.
    ///
    /// Blank messages yield the display unchanged. Failures end the turn with
    /// an apology, which is recorded as the assistant reply.
    pub(crate) fn submit<'a>(
        &'a mut self,
        text: String,
        display: DisplayHistory,
        streaming: bool,
    ) -> impl Stream<Item = DisplayHistory> + Send + 'a {
        stream! {
            if text.trim().is_empty() {
                yield display;
                return;
            }

            info!(input = %text, streaming, "Processing message.");
            let mut display = self.add_user_message(&text, display);

            let Self { history, provider, tools } = self;
            let orchestrator = Orchestrator::new(&**provider, &**tools);

            let mut reply = String::new();
            let mut calls: Vec<ToolCall> = vec![];
            let mut failed = false;

            if streaming {
                match provider.chat_completion_stream(&orchestrator.prompt(history)).await {
                    Ok(chunks) => {
                        let mut parsed = Box::pin(parse_stream(chunks));
                        while let Some(chunk) = parsed.next().await {
                            match chunk {
                                Ok(chunk) => {
                                    trace!(delta = %chunk.text_delta, "Received chunk.");
                                    reply = chunk.accumulated_text;
                                    calls.extend(chunk.completed_tools);
                                    set_reply(&mut display, &reply);
                                    yield display.clone();
                                }
                                Err(error) => {
                                    error!(%error, "Model stream failed.");
                                    failed = true;
                                    break;
                                }
                            }
                        }
                    }
                    Err(error) => {
                        error!(%error, "Model request failed.");
                        failed = true;
                    }
                }
            } else {
                match provider.chat_completion(&orchestrator.prompt(history)).await {
                    Ok(response) => {
                        let parsed = parse_response(response);
                        reply = parsed.text;
                        calls = parsed.tool_calls;
                        set_reply(&mut display, &reply);
                        yield display.clone();
                    }
                    Err(error) => {
                        error!(%error, "Model request failed.");
                        failed = true;
                    }
                }
            }

            if !failed && !calls.is_empty() {
                match orchestrator.resolve(history, &reply, calls).await {
                    Ok(true) if streaming => match orchestrator.follow_up_stream(history).await {
                        Ok(mut follow_up) => {
                            while let Some(chunk) = follow_up.next().await {
                                match chunk {
                                    Ok(chunk) => {
                                        reply = chunk.accumulated_text;
                                        set_reply(&mut display, &reply);
                                        yield display.clone();
                                    }
                                    Err(error) => {
                                        error!(%error, "Follow-up stream failed.");
                                        failed = true;
                                        break;
                                    }
                                }
                            }
                        }
                        Err(error) => {
                            error!(%error, "Follow-up request failed.");
                            failed = true;
                        }
                    },
                    Ok(true) => match orchestrator.follow_up(history).await {
                        Ok(text) => reply = text,
                        Err(error) => {
                            error!(%error, "Follow-up request failed.");
                            failed = true;
                        }
                    },
                    Ok(false) => {}
                    Err(error) => {
                        error!(%error, "Failed to record tool calls.");
                        failed = true;
                    }
                }
            }

            if failed {
                reply = ERROR_REPLY.to_owned();
            }

            history.push_assistant(reply.clone());
            set_reply(&mut display, &reply);
            info!(reply_len = reply.len(), failed, "Message response completed.");

            yield display;
        }
    }

    /// Reset the session.
    pub(crate) fn clear(&mut self) -> DisplayHistory {
        info!("Clearing chat history.");
        self.history.clear();
        vec![]
    }
}

fn set_reply(display: &mut DisplayHistory, reply: &str) {
    if let Some(turn) = display.last_mut() {
        turn.assistant = Some(reply.to_owned());
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
