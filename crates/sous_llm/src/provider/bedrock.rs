//! AWS Bedrock Runtime, using the Anthropic messages format.

use std::{collections::HashMap, io};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use futures::{StreamExt as _, TryStreamExt as _};
use reqwest::{
    StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sous_config::LlmConfig;
use sous_conversation::Turn;
use tokio_util::{codec::FramedRead, io::StreamReader};
use tracing::{debug, error, trace, warn};
use url::Url;

use super::{
    ChunkStream, Provider,
    eventstream::{EventStreamCodec, Message},
};
use crate::{
    content::{ContentStep, ModelResponse, ResponseChunk},
    error::{Error, Result},
    prompt::Prompt,
    retry::{DEFAULT_BASE_BACKOFF_MS, DEFAULT_MAX_BACKOFF_SECS, exponential_backoff},
    tool::ToolDefinition,
};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Clone)]
pub struct Bedrock {
    http_client: reqwest::Client,
    base_url: Url,
    model_id: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    max_attempts: u32,
    base_backoff_ms: u64,
}

impl Bedrock {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;

        let base_url = format!("https://bedrock-runtime.{}.amazonaws.com/", config.region)
            .parse()
            .map_err(|e| Error::Config(format!("invalid region {:?}: {e}", config.region)))?;

        debug!(
            model = %config.model_id,
            region = %config.region,
            max_attempts = config.max_attempts,
            "Bedrock client created."
        );

        Ok(Self {
            http_client,
            base_url,
            model_id: config.model_id.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_attempts: config.max_attempts.max(1),
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the delay before the first retry. Later retries double it.
    #[must_use]
    pub fn with_base_backoff_ms(mut self, base_backoff_ms: u64) -> Self {
        self.base_backoff_ms = base_backoff_ms;
        self
    }

    fn endpoint(&self, action: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["model", &self.model_id, action]);

        Ok(url)
    }

    fn build_headers(&self, accept: &'static str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", self.api_key)
                .parse()
                .map_err(|e| Error::Config(format!("Invalid API key header format: {e}")))?,
        );

        Ok(headers)
    }

    /// Send a request, retrying transient failures up to the configured number
    /// of attempts.
    async fn send(
        &self,
        action: &str,
        accept: &'static str,
        prompt: &Prompt,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(action)?;
        let headers = self.build_headers(accept)?;
        let request = InvokeRequest::new(prompt, self.max_tokens, self.temperature);

        let redacted_headers = headers
            .iter()
            .map(|(k, v)| {
                if *k == AUTHORIZATION {
                    return (k.to_string(), "[REDACTED]".to_owned());
                }

                (k.to_string(), v.to_str().unwrap_or_default().to_owned())
            })
            .collect::<HashMap<_, _>>();

        let mut attempt = 0;
        loop {
            attempt += 1;
            trace!(%url, headers = ?redacted_headers, attempt, "Triggering request.");

            let result = self
                .http_client
                .post(url.clone())
                .headers(headers.clone())
                .json(&request)
                .send()
                .await;

            let retryable = match &result {
                Ok(response) => is_transient_status(response.status()),
                Err(error) => error.is_connect() || error.is_timeout(),
            };

            if retryable && attempt < self.max_attempts {
                let delay =
                    exponential_backoff(attempt, self.base_backoff_ms, DEFAULT_MAX_BACKOFF_SECS);

                warn!(
                    attempt,
                    max = self.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Request failed. Retrying."
                );

                tokio::time::sleep(delay).await;
                continue;
            }

            let response = result?;
            let status = response.status();
            trace!(
                status = status.as_u16(),
                content_length = response.content_length().unwrap_or_default(),
                "Received response."
            );

            if status.is_success() {
                return Ok(response);
            }

            let status = status.as_u16();
            let body = response.text().await?;
            error!(status, body, "Unexpected response.");

            return Err(Error::Api { status, body });
        }
    }
}

#[async_trait]
impl Provider for Bedrock {
    async fn chat_completion(&self, prompt: &Prompt) -> Result<ModelResponse> {
        let response: InvokeResponse = self
            .send("invoke", "application/json", prompt)
            .await?
            .json()
            .await?;

        trace!(stop_reason = ?response.stop_reason, "Completion received.");

        Ok(ModelResponse::new(response.content))
    }

    async fn chat_completion_stream(&self, prompt: &Prompt) -> Result<ChunkStream> {
        let response = self
            .send(
                "invoke-with-response-stream",
                "application/vnd.amazon.eventstream",
                prompt,
            )
            .await?;

        let byte_stream = response.bytes_stream().map_err(io::Error::other);
        let messages = FramedRead::new(StreamReader::new(byte_stream), EventStreamCodec);

        Ok(Box::pin(messages.map(|message| message.and_then(map_message))))
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Map an event-stream frame to a response chunk.
fn map_message(message: Message) -> Result<ResponseChunk> {
    match message.header(":message-type") {
        Some("event") => {}
        Some("exception") => {
            let kind = message
                .header(":exception-type")
                .unwrap_or("exception")
                .to_owned();
            let description = serde_json::from_slice::<ExceptionPayload>(&message.payload)
                .map(|v| v.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&message.payload).into_owned());

            error!(kind, %description, "Model stream raised an exception.");
            return Err(Error::Exception {
                kind,
                message: description,
            });
        }
        Some("error") => {
            let kind = message.header(":error-code").unwrap_or("error").to_owned();
            let description = message
                .header(":error-message")
                .unwrap_or_default()
                .to_owned();

            error!(kind, %description, "Model stream reported an error.");
            return Err(Error::Exception {
                kind,
                message: description,
            });
        }
        other => {
            return Err(Error::Stream(format!("unexpected message type {other:?}")));
        }
    }

    if message.header(":event-type") != Some("chunk") {
        return Ok(ResponseChunk::empty());
    }

    let payload: ChunkPayload = serde_json::from_slice(&message.payload)?;
    let bytes = STANDARD
        .decode(payload.bytes)
        .map_err(|e| Error::Stream(format!("invalid chunk encoding: {e}")))?;

    let event: StreamEvent = serde_json::from_slice(&bytes)?;
    trace!(?event, "Received stream event.");

    Ok(map_event(event))
}

fn map_event(event: StreamEvent) -> ResponseChunk {
    let step = match event {
        StreamEvent::ContentBlockStart {
            index,
            content_block: StartBlock::Text { text },
        } => ContentStep::Text {
            text,
            index: Some(index),
        },
        StreamEvent::ContentBlockStart {
            index,
            content_block: StartBlock::ToolUse { id, name },
        } => ContentStep::tool_use_start(index, id, name),
        StreamEvent::ContentBlockDelta {
            index,
            delta: Delta::TextDelta { text },
        } => ContentStep::Text {
            text,
            index: Some(index),
        },
        StreamEvent::ContentBlockDelta {
            index,
            delta: Delta::InputJsonDelta { partial_json },
        } => ContentStep::tool_use_delta(index, partial_json),
        StreamEvent::ContentBlockStop { index } => ContentStep::block_stop(index),
        _ => return ResponseChunk::empty(),
    };

    ResponseChunk::new(vec![step])
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<RequestMessage>,

    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolDefinition],
}

impl<'a> InvokeRequest<'a> {
    fn new(prompt: &'a Prompt, max_tokens: u32, temperature: f32) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens,
            temperature,
            system: &prompt.system,
            messages: convert_turns(&prompt.turns),
            tools: &prompt.tools,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Role {
    User,
    Assistant,
}

#[derive(Debug, PartialEq, Serialize)]
struct RequestMessage {
    role: Role,
    content: Vec<RequestBlock>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Map<String, Value>,
    },
    ToolResult {
        tool_use_id: String,
        content: String,

        #[serde(skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

/// Convert conversation turns to Anthropic messages.
///
/// Consecutive turns with the same role are merged into a single message, and
/// empty text is omitted, as the API rejects both.
fn convert_turns(turns: &[Turn]) -> Vec<RequestMessage> {
    let mut messages: Vec<RequestMessage> = vec![];

    for turn in turns {
        let (role, blocks) = match turn {
            Turn::User { text } => (Role::User, vec![RequestBlock::Text { text: text.clone() }]),
            Turn::Assistant { text, tool_uses } => {
                let text = RequestBlock::Text { text: text.clone() };
                let uses = tool_uses.iter().map(|tool_use| RequestBlock::ToolUse {
                    id: tool_use.id.clone(),
                    name: tool_use.name.clone(),
                    input: tool_use.arguments.clone(),
                });

                (Role::Assistant, std::iter::once(text).chain(uses).collect())
            }
            Turn::ToolResult {
                tool_call_id,
                payload,
                is_error,
                ..
            } => (Role::User, vec![RequestBlock::ToolResult {
                tool_use_id: tool_call_id.clone(),
                content: payload.clone(),
                is_error: *is_error,
            }]),
        };

        let blocks = blocks
            .into_iter()
            .filter(|block| !matches!(block, RequestBlock::Text { text } if text.trim().is_empty()))
            .collect::<Vec<_>>();

        if blocks.is_empty() {
            continue;
        }

        match messages.last_mut() {
            Some(last) if last.role == role => last.content.extend(blocks),
            _ => messages.push(RequestMessage {
                role,
                content: blocks,
            }),
        }
    }

    messages
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    content: Vec<ContentStep>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    bytes: String,
}

#[derive(Debug, Deserialize)]
struct ExceptionPayload {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockStart {
        index: usize,
        content_block: StartBlock,
    },
    ContentBlockDelta {
        index: usize,
        delta: Delta,
    },
    ContentBlockStop {
        index: usize,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StartBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta {
        text: String,
    },
    InputJsonDelta {
        partial_json: String,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
#[path = "bedrock_tests.rs"]
mod tests;
