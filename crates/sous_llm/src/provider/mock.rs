//! Mock provider for testing model interactions without real API calls.
//!
//! Each call to the provider consumes the next scripted response, so a
//! conversation turn that needs a follow-up call (e.g. after a tool call) can
//! script both calls:
//!
//! ```ignore
//! let provider = MockProvider::new()
//!     .then_tool_call("toolu_1", "get_recipe", arguments)
//!     .then_message("Here is your recipe!");
//! ```

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use futures::stream;
use serde_json::{Map, Value};

use super::{ChunkStream, Provider};
use crate::{
    content::{ContentStep, ModelResponse, ResponseChunk},
    error::{Error, Result},
    prompt::Prompt,
};

#[derive(Debug, Clone)]
enum Script {
    /// A successful response, with its complete and streamed forms.
    Response {
        response: ModelResponse,
        chunks: Vec<ResponseChunk>,
    },

    /// The request fails before any output is produced.
    Failure { status: u16, body: String },

    /// The stream yields the given chunks, then fails.
    Interrupted {
        chunks: Vec<ResponseChunk>,
        message: String,
    },
}

/// A mock model provider.
///
/// Every prompt it receives is recorded, see [`MockProvider::prompts`].
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockProvider {
    /// Create a provider without any scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that responds with a single message.
    #[must_use]
    pub fn with_message(content: &str) -> Self {
        Self::new().then_message(content)
    }

    /// Create a provider that streams a message in multiple chunks.
    #[must_use]
    pub fn with_chunked_message(chunks: &[&str]) -> Self {
        Self::new().then_chunked_message(chunks)
    }

    /// Create a provider that requests a tool call.
    #[must_use]
    pub fn with_tool_call(
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self::new().then_tool_call(tool_id, tool_name, arguments)
    }

    #[must_use]
    pub fn then_message(self, content: &str) -> Self {
        self.then_chunked_message(&[content])
    }

    #[must_use]
    pub fn then_chunked_message(self, chunks: &[&str]) -> Self {
        self.then_response(
            ModelResponse::new(vec![ContentStep::text(chunks.concat())]),
            chunks.iter().map(|&c| ResponseChunk::new(c)).collect(),
        )
    }

    /// Respond with a tool call, preceded by no text.
    ///
    /// The streamed form splits the arguments in two fragments.
    #[must_use]
    pub fn then_tool_call(
        self,
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        self.then_text_and_tool_call("", tool_id, tool_name, arguments)
    }

    #[must_use]
    pub fn then_text_and_tool_call(
        self,
        text: &str,
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        let (id, name) = (tool_id.into(), tool_name.into());
        let json = Value::Object(arguments.clone()).to_string();
        let mid = json
            .char_indices()
            .nth(json.chars().count() / 2)
            .map_or(json.len(), |(i, _)| i);
        let (head, tail) = json.split_at(mid);

        let mut steps = vec![];
        let mut chunks = vec![];
        if !text.is_empty() {
            steps.push(ContentStep::text(text));
            chunks.push(ResponseChunk::new(text));
        }

        steps.push(ContentStep::tool_use(&id, &name, arguments));
        chunks.extend([
            ResponseChunk::new(vec![ContentStep::tool_use_start(1, id, name)]),
            ResponseChunk::new(vec![ContentStep::tool_use_delta(1, head)]),
            ResponseChunk::new(vec![ContentStep::tool_use_delta(1, tail)]),
        ]);

        self.then_response(ModelResponse::new(steps), chunks)
    }

    /// Respond with an explicit complete response and its streamed form.
    #[must_use]
    pub fn then_response(self, response: ModelResponse, chunks: Vec<ResponseChunk>) -> Self {
        self.push(Script::Response { response, chunks })
    }

    /// Fail the request with an API error.
    #[must_use]
    pub fn then_failure(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Script::Failure {
            status,
            body: body.into(),
        })
    }

    /// Stream the given chunks, then fail with a stream error.
    ///
    /// A non-streamed request fails immediately.
    #[must_use]
    pub fn then_interrupted(self, chunks: &[&str], message: impl Into<String>) -> Self {
        self.push(Script::Interrupted {
            chunks: chunks.iter().map(|&c| ResponseChunk::new(c)).collect(),
            message: message.into(),
        })
    }

    /// The prompts received so far, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The number of scripted responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(self, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(script);
        self
    }

    fn next(&self, prompt: &Prompt) -> Result<Script> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.clone());

        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::Stream("no scripted response left".to_owned()))
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn chat_completion(&self, prompt: &Prompt) -> Result<ModelResponse> {
        match self.next(prompt)? {
            Script::Response { response, .. } => Ok(response),
            Script::Failure { status, body } => Err(Error::Api { status, body }),
            Script::Interrupted { message, .. } => Err(Error::Stream(message)),
        }
    }

    async fn chat_completion_stream(&self, prompt: &Prompt) -> Result<ChunkStream> {
        match self.next(prompt)? {
            Script::Response { chunks, .. } => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok::<_, Error>)))),
            Script::Failure { status, body } => Err(Error::Api { status, body }),
            Script::Interrupted { chunks, message } => Ok(Box::pin(stream::iter(
                chunks
                    .into_iter()
                    .map(Ok::<_, Error>)
                    .chain([Err(Error::Stream(message))]),
            ))),
        }
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
