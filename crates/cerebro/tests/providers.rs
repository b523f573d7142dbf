use cerebro::providers::{
    base::{ChatResult, Provider},
    configs::OpenAiProviderConfig,
    openai::OpenAiProvider,
};
use dotenv::dotenv;
use futures::StreamExt;
use serde_json::{json, Value};

const DEFAULT_TEST_MODEL: &str = "mistralai/mistral-small-3.1-24b-instruct:free";

/// Generic test harness for any Provider implementation
struct ProviderTester {
    provider: Box<dyn Provider>,
    model: String,
}

impl ProviderTester {
    fn new(provider: Box<dyn Provider>, model: String) -> Self {
        Self { provider, model }
    }

    fn weather_tool() -> Value {
        json!({
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Get the weather for a location",
                "parameters": {
                    "type": "object",
                    "required": ["location"],
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "The city and state, e.g. San Francisco, CA"
                        }
                    }
                }
            }
        })
    }

    async fn test_basic_response(&self) -> anyhow::Result<()> {
        let messages = vec![json!({"role": "user", "content": "Just say hello!"})];

        let result = self
            .provider
            .chat_complete(&self.model, &messages, &[], false)
            .await?;

        let ChatResult::Complete(body) = result else {
            panic!("Expected a complete response");
        };
        assert!(
            body["choices"][0]["message"].is_object(),
            "Expected a message in the first choice"
        );

        Ok(())
    }

    async fn test_tool_usage(&self) -> anyhow::Result<()> {
        let messages = vec![json!({
            "role": "user",
            "content": "What's the weather like in San Francisco?"
        })];

        let result = self
            .provider
            .chat_complete(&self.model, &messages, &[Self::weather_tool()], false)
            .await?;

        let ChatResult::Complete(body) = result else {
            panic!("Expected a complete response");
        };
        assert!(
            body["choices"][0]["message"]["tool_calls"].is_array(),
            "Expected tool calls in response"
        );

        Ok(())
    }

    async fn test_streaming(&self) -> anyhow::Result<()> {
        let messages = vec![json!({"role": "user", "content": "Count from 1 to 5."})];

        let result = self
            .provider
            .chat_complete(&self.model, &messages, &[], true)
            .await?;

        let ChatResult::Stream(mut stream) = result else {
            panic!("Expected a streamed response");
        };
        let mut chunks = 0;
        while let Some(chunk) = stream.next().await {
            chunk?;
            chunks += 1;
        }
        assert!(chunks > 0, "Expected at least one chunk");

        Ok(())
    }

    /// Run all provider tests
    async fn run_test_suite(&self) -> anyhow::Result<()> {
        println!("Running basic response test...");
        self.test_basic_response().await?;
        println!("Running tool usage test...");
        self.test_tool_usage().await?;
        println!("Running streaming test...");
        self.test_streaming().await?;
        Ok(())
    }
}

fn load_env() {
    if let Ok(path) = dotenv() {
        println!("Loaded environment from {:?}", path);
    }
}

#[tokio::test]
async fn test_openrouter_provider() -> anyhow::Result<()> {
    load_env();

    // Skip if credentials aren't available
    let Ok(api_key) = std::env::var("OPENROUTER_API_KEY") else {
        println!("Skipping OpenRouter tests - credentials not configured");
        return Ok(());
    };

    let config = OpenAiProviderConfig {
        api_key: Some(api_key),
        ..Default::default()
    };
    let model =
        std::env::var("OPENROUTER_MODEL").unwrap_or_else(|_| DEFAULT_TEST_MODEL.to_string());

    let tester = ProviderTester::new(Box::new(OpenAiProvider::new(config)?), model);
    tester.run_test_suite().await?;

    Ok(())
}
