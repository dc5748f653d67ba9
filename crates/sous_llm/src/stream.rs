//! Incremental parsing of streamed model responses.

pub mod accumulator;

use std::pin::Pin;

use async_stream::stream;
use futures::{Stream, StreamExt as _};
use sous_conversation::ToolCall;
use tracing::{debug, error, warn};

use self::accumulator::{AccumulatorKey, PartialToolCall, ToolCallAccumulator};
use crate::{
    content::{ContentStep, MessageContent, ResponseChunk},
    error::Result,
    provider::ChunkStream,
};

pub type ParsedStream = Pin<Box<dyn Stream<Item = Result<ParsedChunk>> + Send>>;

/// The result of parsing a single streamed chunk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedChunk {
    /// Text added by this chunk.
    pub text_delta: String,

    /// All text received so far.
    pub accumulated_text: String,

    /// Tool calls completed by this chunk, all pending.
    pub completed_tools: Vec<ToolCall>,
}

/// Parses a streamed response one chunk at a time.
///
/// Text is concatenated across chunks. Tool-use fragments are accumulated per
/// tool call until their arguments form a complete JSON object, at which point
/// the tool call is emitted exactly once. A tool call whose block stops before
/// any arguments arrived completes with empty arguments.
#[derive(Debug, Default)]
pub struct StreamParser {
    accumulated_text: String,
    tools: ToolCallAccumulator,
}

impl StreamParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the next chunk. Every chunk yields a [`ParsedChunk`], including
    /// chunks without content.
    pub fn ingest(&mut self, chunk: ResponseChunk) -> ParsedChunk {
        let mut text_delta = String::new();
        let mut completed_tools = vec![];

        match chunk.content {
            MessageContent::Text(text) => text_delta = text,
            MessageContent::Steps(steps) => {
                for step in steps {
                    match step {
                        ContentStep::Text { text, .. } => text_delta.push_str(&text),
                        ContentStep::ToolUse {
                            id,
                            name,
                            partial_json,
                            index,
                            ..
                        } => {
                            let Some(key) = AccumulatorKey::resolve(index, id.as_deref()) else {
                                warn!(?name, "Ignoring tool-use step without index or id.");
                                continue;
                            };

                            let fragment = partial_json.unwrap_or_default();
                            if let Some(call) = self.tools.add_fragment(key.clone(), id, name, &fragment)
                            {
                                debug!(%key, id = %call.id, name = %call.name, "Tool call completed.");
                                completed_tools.push(call);
                            }
                        }
                        ContentStep::BlockStop { index } => {
                            let key = AccumulatorKey::Index(index);
                            if let Some(call) = self.tools.close(&key) {
                                debug!(
                                    %key,
                                    id = %call.id,
                                    name = %call.name,
                                    "Tool call completed without arguments."
                                );
                                completed_tools.push(call);
                            }
                        }
                        ContentStep::Other => {}
                    }
                }
            }
        }

        self.accumulated_text.push_str(&text_delta);

        ParsedChunk {
            text_delta,
            accumulated_text: self.accumulated_text.clone(),
            completed_tools,
        }
    }

    /// All text received so far.
    #[must_use]
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    /// Number of tool calls still being accumulated.
    #[must_use]
    pub fn pending_tool_calls(&self) -> usize {
        self.tools.len()
    }

    /// A snapshot without new content, reflecting the current state.
    #[must_use]
    pub fn snapshot(&self) -> ParsedChunk {
        ParsedChunk {
            text_delta: String::new(),
            accumulated_text: self.accumulated_text.clone(),
            completed_tools: vec![],
        }
    }

    /// End the stream, returning the tool calls that never completed.
    ///
    /// These are never executed; each one is logged.
    pub fn finish(&mut self) -> Vec<PartialToolCall> {
        let dropped = self
            .tools
            .drain()
            .into_iter()
            .map(|(key, partial)| {
                warn!(
                    %key,
                    id = ?partial.id,
                    name = ?partial.name,
                    arguments = %partial.arguments,
                    "Dropping incomplete tool call at end of stream."
                );
                partial
            })
            .collect::<Vec<_>>();

        debug!(
            text_len = self.accumulated_text.len(),
            dropped = dropped.len(),
            "Stream parsing complete."
        );

        dropped
    }
}

/// Parse a stream of response chunks.
///
/// If the underlying stream fails, one final snapshot with an empty delta is
/// yielded, followed by the error. Dropping the returned stream drops the
/// underlying model stream.
pub fn parse_stream(mut chunks: ChunkStream) -> impl Stream<Item = Result<ParsedChunk>> + Send {
    stream! {
        let mut parser = StreamParser::new();

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => yield Ok(parser.ingest(chunk)),
                Err(error) => {
                    error!(%error, "Model stream failed.");
                    yield Ok(parser.snapshot());
                    yield Err(error);
                    return;
                }
            }
        }

        parser.finish();
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
