use async_stream::stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

use super::base::{ChatResult, ChunkStream, Provider};
use super::configs::OpenAiProviderConfig;
use super::utils::{check_error_payload, check_status, decode_stream_event};
use crate::errors::{ProviderError, ProviderResult};

/// Client for OpenAI-compatible APIs (OpenAI, OpenRouter, ...)
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(referer) = &config.referer {
            headers.insert(HeaderName::from_static("http-referer"), header_value(referer)?);
        }
        if let Some(title) = &config.title {
            headers.insert(HeaderName::from_static("x-title"), header_value(title)?);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn post_json(&self, endpoint: &str, payload: &Value) -> ProviderResult<Response> {
        let url = self.config.url(endpoint);
        let response = self
            .authorize(self.client.post(&url))
            .json(payload)
            .send()
            .await?;
        check_status(response).await
    }
}

fn header_value(value: &str) -> ProviderResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ProviderError::Config(e.to_string()))
}

fn chunk_stream(response: Response) -> ChunkStream {
    let mut events = Box::pin(response.bytes_stream().eventsource());
    Box::pin(stream! {
        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    yield Err(ProviderError::Stream(e.to_string()));
                    break;
                }
            };
            match decode_stream_event(&event.data) {
                Ok(Some(chunk)) => yield Ok(chunk),
                Ok(None) => break,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    })
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn transcribe(
        &self,
        audio: &Path,
        model: &str,
        language: &str,
    ) -> ProviderResult<String> {
        let bytes = tokio::fs::read(audio).await?;
        let file_name = audio
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav")
            .to_string();
        debug!(model, language, bytes = bytes.len(), "sending transcription");

        let form = Form::new()
            .text("model", model.to_string())
            .text("language", language.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .authorize(self.client.post(self.config.url("audio/transcriptions")))
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: Value = serde_json::from_str(&response.text().await?)?;
        check_error_payload(&body)?;
        body.get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ProviderError::MissingField("text"))
    }

    async fn chat_complete(
        &self,
        model: &str,
        messages: &[Value],
        tools: &[Value],
        stream: bool,
    ) -> ProviderResult<ChatResult> {
        let mut payload = json!({
            "model": model,
            "messages": messages,
        });
        // Deliberately not a pure pass-through: an empty tool list is left out
        // of the payload since providers reject `tools: []`
        if !tools.is_empty() {
            payload["tools"] = json!(tools);
        }
        if stream {
            payload["stream"] = json!(true);
        }
        debug!(
            model,
            messages = messages.len(),
            tools = tools.len(),
            stream,
            "sending chat completion"
        );

        let response = self.post_json("chat/completions", &payload).await?;

        if stream {
            return Ok(ChatResult::Stream(chunk_stream(response)));
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        check_error_payload(&body)?;
        Ok(ChatResult::Complete(body))
    }
}
