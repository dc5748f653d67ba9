pub mod bedrock;
mod eventstream;
pub mod mock;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::{
    content::{ModelResponse, ResponseChunk},
    error::Result,
    prompt::Prompt,
};

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ResponseChunk>> + Send>>;

/// A hosted model that can complete a [`Prompt`].
#[async_trait]
pub trait Provider: std::fmt::Debug + Send + Sync {
    /// Request a complete response.
    async fn chat_completion(&self, prompt: &Prompt) -> Result<ModelResponse>;

    /// Request a streamed response.
    ///
    /// Errors establishing the stream are returned directly, errors during
    /// streaming are yielded by the stream.
    async fn chat_completion_stream(&self, prompt: &Prompt) -> Result<ChunkStream>;
}
