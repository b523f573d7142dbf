use thiserror::Error;

/// Failures while talking to the upstream provider.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to upstream failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream error: {0}")]
    Api(String),

    #[error("Malformed upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Upstream response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Upstream event stream failed: {0}")]
    Stream(String),

    #[error("Failed to read audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid provider configuration: {0}")]
    Config(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
