use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "CEREBRO";

/// Returned in place of the real error when a command fails upstream
pub const GENERIC_COMMAND_ERROR: &str =
    "An internal problem occurred while processing the command.";

pub const GENERIC_INTERNAL_ERROR: &str = "An internal problem occurred.";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a config key such as `provider.api_key` to the environment variable
/// that sets it, `CEREBRO_PROVIDER__API_KEY`.
pub fn to_env_var(field_path: &str) -> String {
    let parts: Vec<String> = field_path.split('.').map(str::to_uppercase).collect();
    format!("{}_{}", ENV_PREFIX, parts.join("__"))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors returned to HTTP callers
#[derive(Error, Debug)]
pub enum ApiError {
    /// The caller left out a required field
    #[error("{0}")]
    InvalidRequest(String),

    /// Anything that went wrong on the way to or from the provider
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn missing_field(field: &str) -> Self {
        ApiError::InvalidRequest(format!("Invalid request: missing field `{}`", field))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
