use std::time::Duration;

use crate::config::{AppConfig, ProviderConfig};
use crate::error::AnalyzerError;
use crate::providers::{AnthropicProvider, OpenAIProvider, SentimentProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    ///
    /// `timeout` bounds every request the provider makes.
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn SentimentProvider>, AnalyzerError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(AnalyzerError::NotConfigured(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config, timeout)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config, timeout)?)),
            _ => Err(AnalyzerError::NotConfigured(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Get the default provider from configuration.
    ///
    /// When the default provider has no entry in the config, it is created
    /// with its stock model and credentials from the environment.
    pub fn get_default_provider(
        config: &AppConfig,
    ) -> Result<Box<dyn SentimentProvider>, AnalyzerError> {
        Self::get_provider(config, &config.default_provider)
    }

    /// Get a named provider, falling back to its stock settings
    pub fn get_provider(
        config: &AppConfig,
        provider_name: &str,
    ) -> Result<Box<dyn SentimentProvider>, AnalyzerError> {
        let timeout = Duration::from_secs(config.timeout);
        match config.providers.get(provider_name) {
            Some(provider_config) => Self::create(provider_name, provider_config, timeout),
            None => {
                let model = Self::default_model(provider_name).ok_or_else(|| {
                    AnalyzerError::NotConfigured(format!(
                        "Provider '{}' not found in configuration",
                        provider_name
                    ))
                })?;
                Self::create(provider_name, &Self::stock_config(model), timeout)
            }
        }
    }

    /// Model used when a provider has no configuration entry
    pub fn default_model(provider_name: &str) -> Option<&'static str> {
        match provider_name {
            "openai" => Some("gpt-4o-mini"),
            "anthropic" => Some("claude-3-5-haiku-latest"),
            _ => None,
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic"]
    }

    pub(crate) fn stock_config(model: &str) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: model.to_string(),
            temperature: 0.3,
            max_tokens: 300,
            api_key: None,
            base_url: None,
        }
    }
}
