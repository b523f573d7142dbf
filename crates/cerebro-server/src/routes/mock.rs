use crate::configuration::{AudioSettings, CommandSettings, ModelSettings};
use crate::state::AppState;
use async_trait::async_trait;
use cerebro::errors::{ProviderError, ProviderResult};
use cerebro::providers::base::{ChatResult, Provider};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const TEST_CHAT_MODEL: &str = "test-chat-model";
pub const TEST_TRANSCRIPTION_MODEL: &str = "test-whisper";

#[derive(Debug, Clone)]
pub struct ChatCall {
    pub model: String,
    pub messages: Vec<Value>,
    pub tools: Vec<Value>,
    pub stream: bool,
}

#[derive(Debug, Clone)]
pub struct TranscribeCall {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub model: String,
    pub language: String,
}

/// A mock provider that hands out one pre-configured result per operation
#[derive(Default)]
pub struct MockProvider {
    chat: Mutex<Option<ProviderResult<ChatResult>>>,
    transcription: Mutex<Option<ProviderResult<String>>>,
    pub chat_calls: Mutex<Vec<ChatCall>>,
    pub transcribe_calls: Mutex<Vec<TranscribeCall>>,
}

impl MockProvider {
    pub fn with_chat(result: ProviderResult<ChatResult>) -> Self {
        Self {
            chat: Mutex::new(Some(result)),
            ..Default::default()
        }
    }

    pub fn with_transcription(result: ProviderResult<String>) -> Self {
        Self {
            transcription: Mutex::new(Some(result)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn transcribe(
        &self,
        audio: &Path,
        model: &str,
        language: &str,
    ) -> ProviderResult<String> {
        self.transcribe_calls.lock().unwrap().push(TranscribeCall {
            path: audio.to_path_buf(),
            contents: std::fs::read(audio)?,
            model: model.to_string(),
            language: language.to_string(),
        });
        self.transcription
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ProviderError::Api("no mock transcription".to_string())))
    }

    async fn chat_complete(
        &self,
        model: &str,
        messages: &[Value],
        tools: &[Value],
        stream: bool,
    ) -> ProviderResult<ChatResult> {
        self.chat_calls.lock().unwrap().push(ChatCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.to_vec(),
            stream,
        });
        self.chat
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ProviderError::Api("no mock chat result".to_string())))
    }
}

pub fn test_state(provider: Arc<MockProvider>, staging_dir: Option<PathBuf>) -> AppState {
    let models = ModelSettings {
        chat: TEST_CHAT_MODEL.to_string(),
        transcription: TEST_TRANSCRIPTION_MODEL.to_string(),
        language: "es".to_string(),
    };
    let audio = AudioSettings {
        staging_dir,
        ..Default::default()
    };
    AppState::new(provider, models, CommandSettings::default(), audio)
}
