use crate::configuration::{AudioSettings, CommandSettings, ModelSettings};
use cerebro::providers::base::Provider;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state, built once at startup and read-only afterwards
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn Provider>,
    pub models: ModelSettings,
    pub max_command_bytes: usize,
    pub staging_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn Provider>,
        models: ModelSettings,
        commands: CommandSettings,
        audio: AudioSettings,
    ) -> Self {
        Self {
            provider,
            models,
            max_command_bytes: commands.max_body_bytes,
            staging_dir: audio.staging_dir,
            max_upload_bytes: audio.max_upload_bytes,
        }
    }
}
