//! Model access for the recipe assistant.
//!
//! This crate holds the content model exchanged with a hosted model, the
//! parsers that turn (streamed) model output into text and tool calls, the
//! [`Provider`] implementations, and the tool execution loop.

pub mod content;
mod error;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod stream;
pub mod tool;


pub use content::{ContentStep, MessageContent, ModelResponse, ResponseChunk};
pub use error::{Error, ToolError};
pub use orchestrator::Orchestrator;
pub use parser::{ParsedResponse, parse_response};
pub use prompt::Prompt;
pub use provider::{ChunkStream, Provider, bedrock::Bedrock, mock::MockProvider};
pub use stream::{ParsedChunk, ParsedStream, StreamParser, parse_stream};
pub use tool::{Tool, ToolDefinition, ToolRegistry};
