use crate::config::ProviderConfig;
use crate::error::AnalyzerError;
use crate::model::Analysis;
use crate::providers::{
    build_analysis_prompt, parse_analysis, SentimentProvider, SENTIMENT_SYSTEM_PROMPT,
};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, AnalyzerError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                AnalyzerError::NotConfigured(
                    "ANTHROPIC_API_KEY not found in config or environment".to_string(),
                )
            })?;

        Ok(AnthropicProvider {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.3,
            max_tokens: 300,
        }
    }
}

#[async_trait]
impl SentimentProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn classify(&self, text: &str, author: Option<&str>) -> Result<Analysis, AnalyzerError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": SENTIMENT_SYSTEM_PROMPT,
                "messages": [
                    {
                        "role": "user",
                        "content": build_analysis_prompt(text, author)
                    }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        if !status.is_success() {
            return Err(AnalyzerError::ClassificationError(format!(
                "Anthropic API error ({}): {}",
                status, response_body["error"]
            )));
        }

        let content = response_body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                AnalyzerError::ClassificationError(
                    "Failed to extract content from Anthropic response".to_string(),
                )
            })?;

        parse_analysis(content)
    }
}
