use reqwest::Response;
use serde_json::Value;

use crate::errors::{ProviderError, ProviderResult};

/// Sentinel some OpenAI-compatible providers send as the last stream event
pub const STREAM_DONE: &str = "[DONE]";

/// Turn a non-2xx response into a [`ProviderError::Status`] carrying the body.
pub async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Providers may answer 200 with an `error` object instead of a result.
pub fn check_error_payload(value: &Value) -> ProviderResult<()> {
    match value.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(error) => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            Err(ProviderError::Api(message))
        }
    }
}

/// Decode the `data` field of one stream event into a chunk.
/// Returns `None` once the provider signals the end of the stream.
pub fn decode_stream_event(data: &str) -> ProviderResult<Option<Value>> {
    if data.trim() == STREAM_DONE {
        return Ok(None);
    }
    let chunk: Value = serde_json::from_str(data)?;
    check_error_payload(&chunk)?;
    Ok(Some(chunk))
}
