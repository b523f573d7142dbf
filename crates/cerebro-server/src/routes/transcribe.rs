use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

const AUDIO_FIELD: &str = "audio";
const STAGED_PREFIX: &str = "cerebro-audio-";
const DEFAULT_AUDIO_SUFFIX: &str = ".wav";

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

struct AudioUpload {
    file_name: Option<String>,
    bytes: Bytes,
}

fn invalid_multipart(detail: String) -> ApiError {
    warn!("Rejected audio upload: {}", detail);
    ApiError::InvalidRequest(format!("Invalid request: {}", detail))
}

async fn read_audio_field(mut multipart: Multipart) -> Result<AudioUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid_multipart(e.body_text()))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| invalid_multipart(e.body_text()))?;
        return Ok(AudioUpload { file_name, bytes });
    }
    Err(ApiError::missing_field(AUDIO_FIELD))
}

/// Keep the uploaded extension so the provider can sniff the format, as long
/// as it is a plain one; otherwise fall back to `.wav`.
fn staged_suffix(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_AUDIO_SUFFIX.to_string())
}

/// Write the upload to a uniquely named temp file. The file is deleted when
/// the returned handle is closed or dropped.
async fn stage_audio(
    staging_dir: Option<PathBuf>,
    upload: AudioUpload,
) -> io::Result<NamedTempFile> {
    let suffix = staged_suffix(upload.file_name.as_deref());
    tokio::task::spawn_blocking(move || -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGED_PREFIX).suffix(&suffix);
        let mut staged = match &staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        staged.write_all(&upload.bytes)?;
        staged.flush()?;
        Ok(staged)
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

async fn handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let multipart = multipart.map_err(|rejection| invalid_multipart(rejection.body_text()))?;
    let upload = read_audio_field(multipart).await?;
    info!(
        "Transcribing {} bytes of audio with model: {}",
        upload.bytes.len(),
        state.models.transcription
    );

    // Unlike /process-command, failures here are returned to the caller
    // verbatim. The two endpoints have always differed on this; keep it until
    // one policy is chosen for both.
    let staged = stage_audio(state.staging_dir.clone(), upload)
        .await
        .map_err(|e| {
            error!("Failed to stage audio: {:?}: {}", e, e);
            ApiError::Upstream(e.to_string())
        })?;

    let result = state
        .provider
        .transcribe(
            staged.path(),
            &state.models.transcription,
            &state.models.language,
        )
        .await;

    if let Err(e) = staged.close() {
        warn!("Failed to remove staged audio: {}", e);
    }

    let text = result.map_err(|e| {
        error!("Transcription failed: {:?}: {}", e, e);
        ApiError::Upstream(e.to_string())
    })?;

    Ok(Json(TranscriptionResponse { text }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/transcribe-audio", post(handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}
