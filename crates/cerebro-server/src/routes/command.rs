use crate::error::{ApiError, GENERIC_COMMAND_ERROR};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use cerebro::providers::base::{ChatResult, ChunkStream};
use futures::{stream::StreamExt, Stream};
use http::header;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

/// Events buffered between the upstream reader and the client
const STREAM_BUFFER: usize = 16;

#[derive(Debug, Deserialize)]
struct CommandRequest {
    history: Option<Vec<Value>>,
    tools: Option<Vec<Value>>,
    stream: Option<bool>,
}

// Server-sent event body fed from a channel
pub struct SseResponse {
    rx: ReceiverStream<String>,
}

impl SseResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self);
        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    }
}

struct EventFormatter;

impl EventFormatter {
    fn format_chunk(chunk: &Value) -> String {
        format!("data: {}\n\n", chunk)
    }

    fn format_error(message: &str) -> String {
        format!("event: error\ndata: {}\n\n", json!({ "error": message }))
    }
}

/// Pump upstream chunks into the response channel until the upstream ends,
/// fails, or the client goes away. The upstream stream is dropped as soon as
/// the client disconnects.
fn relay_stream(mut chunks: ChunkStream) -> SseResponse {
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("Client disconnected, dropping upstream stream");
                    break;
                }
                next = chunks.next() => match next {
                    Some(Ok(chunk)) => {
                        if tx.send(EventFormatter::format_chunk(&chunk)).await.is_err() {
                            debug!("Client disconnected, dropping upstream stream");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        error!("Chat completion stream failed: {:?}: {}", e, e);
                        let _ = tx.send(EventFormatter::format_error(GENERIC_COMMAND_ERROR)).await;
                        break;
                    }
                    None => break,
                }
            }
        }
    });

    SseResponse::new(ReceiverStream::new(rx))
}

async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected command body: {}", rejection.body_text());
        ApiError::InvalidRequest(format!("Invalid request: {}", rejection.body_text()))
    })?;

    let history = request
        .history
        .ok_or_else(|| ApiError::missing_field("history"))?;
    let tools = request
        .tools
        .ok_or_else(|| ApiError::missing_field("tools"))?;
    let stream = request.stream.unwrap_or(false);

    let model = &state.models.chat;
    info!("Processing command with model: {} (stream: {})", model, stream);

    let result = state
        .provider
        .chat_complete(model, &history, &tools, stream)
        .await
        .map_err(|e| {
            error!("Chat completion failed: {:?}: {}", e, e);
            ApiError::Upstream(GENERIC_COMMAND_ERROR.to_string())
        })?;

    Ok(match result {
        ChatResult::Complete(body) => Json(body).into_response(),
        ChatResult::Stream(chunks) => relay_stream(chunks).into_response(),
    })
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/process-command", post(handler))
        .layer(DefaultBodyLimit::max(state.max_command_bytes))
        .with_state(state)
}
