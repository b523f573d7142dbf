use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::path::Path;
use std::pin::Pin;

use crate::errors::ProviderResult;

/// Lazy, finite sequence of chat-completion chunks. Dropping it tears down
/// the upstream connection.
pub type ChunkStream = Pin<Box<dyn Stream<Item = ProviderResult<Value>> + Send>>;

/// Outcome of a chat completion
pub enum ChatResult {
    /// The full response object, as the provider sent it
    Complete(Value),
    /// Chunks in the order the provider produces them
    Stream(ChunkStream),
}

impl std::fmt::Debug for ChatResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatResult::Complete(value) => f.debug_tuple("Complete").field(value).finish(),
            ChatResult::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Base trait for hosted inference providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Transcribe the audio file at `audio` into text.
    async fn transcribe(&self, audio: &Path, model: &str, language: &str)
        -> ProviderResult<String>;

    /// Run a chat completion over caller-supplied messages and tool schemas.
    ///
    /// Both `messages` and `tools` are passed through untouched. When `stream`
    /// is set the result is a [`ChatResult::Stream`], otherwise a
    /// [`ChatResult::Complete`].
    async fn chat_complete(
        &self,
        model: &str,
        messages: &[Value],
        tools: &[Value],
        stream: bool,
    ) -> ProviderResult<ChatResult>;
}
