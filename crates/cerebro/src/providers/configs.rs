use std::time::Duration;

pub const OPENROUTER_HOST: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// Base URL including the API version segment, e.g. `https://openrouter.ai/api/v1`
    pub host: String,
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer` for provider-side attribution
    pub referer: Option<String>,
    /// Sent as `X-Title` for provider-side attribution
    pub title: Option<String>,
    pub timeout: Duration,
}

impl Default for OpenAiProviderConfig {
    fn default() -> Self {
        Self {
            host: OPENROUTER_HOST.to_string(),
            api_key: None,
            referer: None,
            title: None,
            timeout: Duration::from_secs(600),
        }
    }
}

impl OpenAiProviderConfig {
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = OpenAiProviderConfig {
            host: "http://localhost:1234/api/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.url("chat/completions"),
            "http://localhost:1234/api/v1/chat/completions"
        );
    }
}
