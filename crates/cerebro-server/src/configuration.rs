use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use cerebro::providers::configs::{OpenAiProviderConfig, OPENROUTER_HOST};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable the API key has historically been read from
pub const LEGACY_API_KEY_VAR: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub host: String,
    pub api_key: Option<String>,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            host: OPENROUTER_HOST.to_string(),
            api_key: None,
            referer: Some(default_referer()),
            title: Some(default_title()),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    // Convert to the cerebro provider config
    pub fn into_config(self) -> OpenAiProviderConfig {
        let has_api_key = self.has_api_key();
        OpenAiProviderConfig {
            host: self.host,
            api_key: self.api_key.filter(|_| has_api_key),
            referer: self.referer.filter(|value| !value.trim().is_empty()),
            title: self.title.filter(|value| !value.trim().is_empty()),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Model identifiers sent upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub chat: String,
    pub transcription: String,
    /// Language hint for transcription (ISO-639-1)
    pub language: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            chat: default_chat_model(),
            transcription: default_transcription_model(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    /// Largest accepted `/process-command` body
    pub max_body_bytes: usize,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_command_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Where uploads are staged; the OS temp dir when unset
    pub staging_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            staging_dir: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub models: ModelSettings,
    pub commands: CommandSettings,
    pub audio: AudioSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", OPENROUTER_HOST)?
            .set_default("provider.timeout_secs", default_timeout_secs())?
            // Model defaults
            .set_default("models.chat", default_chat_model())?
            .set_default("models.transcription", default_transcription_model())?
            .set_default("models.language", default_language())?
            .set_default("provider.referer", default_referer())?
            .set_default("provider.title", default_title())?
            .set_default("commands.max_body_bytes", default_max_command_bytes() as u64)?
            .set_default("audio.max_upload_bytes", default_max_upload_bytes() as u64)?;

        if let Ok(api_key) = std::env::var(LEGACY_API_KEY_VAR) {
            builder = builder.set_default("provider.api_key", api_key)?;
        }

        let config = builder
            // Optional cerebro.toml in the working directory
            .add_source(File::with_name("cerebro").required(false))
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_chat_model() -> String {
    "mistralai/mistral-small-3.1-24b-instruct:free".to_string()
}

fn default_transcription_model() -> String {
    "openai/whisper-1".to_string()
}

fn default_language() -> String {
    "es".to_string()
}

fn default_referer() -> String {
    "https://cerebro-asistente-backend.onrender.com".to_string()
}

fn default_title() -> String {
    "Dolphin Assistant".to_string()
}

fn default_max_command_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}
