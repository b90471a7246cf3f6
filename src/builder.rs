use std::time::Duration;

use crate::config::AppConfig;
use crate::pipelines::{AnalysisOutcome, PostFetcher, PostPipeline};
use crate::providers::{ProviderFactory, SentimentProvider};
use crate::sheets::{AnalysisLog, SheetsClient};
use crate::{AnalyzerError, PostData};

/// Result of a post analysis run
#[derive(Debug, Clone)]
pub enum AnalyzeResult {
    /// Post data with media text, no classification
    Post(PostData),
    /// Post data plus summary and sentiment
    Analysis(AnalysisOutcome),
}

/// LLM provider used for classification
#[derive(Debug, Clone, Copy)]
pub enum LlmProvider {
    OpenAI,
    Anthropic,
}

impl LlmProvider {
    /// Convert to provider name string used by the factory
    fn as_str(&self) -> &str {
        match self {
            LlmProvider::OpenAI => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }
}

/// Builder for configuring and executing post analysis
#[derive(Debug, Default)]
pub struct PostAnalyzerBuilder {
    url: Option<String>,
    provider: Option<LlmProvider>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    save_to_sheet: bool,
    fetch_only: bool,
}

impl PostAnalyzerBuilder {
    /// Set the status URL of the post to analyze
    ///
    /// # Example
    /// ```
    /// use tweet_lens::PostAnalyzer;
    ///
    /// let builder = PostAnalyzer::builder()
    ///     .url("https://x.com/jack/status/20");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the LLM provider used for classification
    ///
    /// # Example
    /// ```
    /// use tweet_lens::{LlmProvider, PostAnalyzer};
    ///
    /// let builder = PostAnalyzer::builder()
    ///     .url("https://x.com/jack/status/20")
    ///     .provider(LlmProvider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: LlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set a timeout for HTTP requests
    ///
    /// Applies to every outbound call except the oEmbed fetch, which keeps
    /// its own 10 second limit. The timeout has one-second resolution, so
    /// sub-second durations are rounded up to the next whole second.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the API key for the LLM provider
    ///
    /// Takes precedence over config files and environment variables.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the LLM provider
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Append the result to the configured spreadsheet
    pub fn save_to_sheet(mut self) -> Self {
        self.save_to_sheet = true;
        self
    }

    /// Stop after fetching the post and its media text
    ///
    /// # Example
    /// ```
    /// use tweet_lens::PostAnalyzer;
    ///
    /// let builder = PostAnalyzer::builder()
    ///     .url("https://x.com/jack/status/20")
    ///     .fetch_only();
    /// ```
    pub fn fetch_only(mut self) -> Self {
        self.fetch_only = true;
        self
    }

    /// Build and execute the analysis
    ///
    /// # Errors
    /// Returns `AnalyzerError` if:
    /// - No URL was specified
    /// - `fetch_only()` was combined with `save_to_sheet()`
    /// - The post cannot be fetched or classified
    /// - A required service is not configured
    ///
    /// # Example
    /// ```no_run
    /// # use tweet_lens::PostAnalyzer;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let result = PostAnalyzer::builder()
    ///     .url("https://x.com/jack/status/20")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<AnalyzeResult, AnalyzerError> {
        let url = self.url.clone().ok_or_else(|| {
            AnalyzerError::BuilderError("No post URL specified. Use .url()".to_string())
        })?;
        if self.fetch_only && self.save_to_sheet {
            return Err(AnalyzerError::BuilderError(
                "Cannot use save_to_sheet() with fetch_only(). Only analyses are saved."
                    .to_string(),
            ));
        }

        let config = self.configure(AppConfig::load()?);

        let fetcher = PostFetcher::from_config(&config)?;
        if self.fetch_only {
            return Ok(AnalyzeResult::Post(fetcher.fetch_post(&url).await?));
        }

        let provider = self.create_provider(config.clone())?;
        let log: Option<Box<dyn AnalysisLog>> = if self.save_to_sheet {
            Some(Box::new(SheetsClient::new(
                &config.sheets,
                Duration::from_secs(config.timeout),
            )?))
        } else {
            None
        };

        let outcome = PostPipeline::new(fetcher, provider, log)
            .analyze(&url, self.save_to_sheet)
            .await?;
        Ok(AnalyzeResult::Analysis(outcome))
    }

    /// Applies builder overrides to the loaded configuration
    fn configure(&self, mut config: AppConfig) -> AppConfig {
        if let Some(timeout) = self.timeout {
            let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
            config.timeout = secs.max(1);
        }
        config
    }

    fn create_provider(
        &self,
        mut config: AppConfig,
    ) -> Result<Box<dyn SentimentProvider>, AnalyzerError> {
        let name = match self.provider {
            Some(provider) => provider.as_str().to_string(),
            None => config.default_provider.clone(),
        };

        if self.api_key.is_none() && self.model.is_none() {
            return ProviderFactory::get_provider(&config, &name);
        }

        let provider_config = match config.providers.remove(&name) {
            Some(provider_config) => provider_config,
            None => {
                let model = ProviderFactory::default_model(&name).ok_or_else(|| {
                    AnalyzerError::NotConfigured(format!("Unknown provider: {}", name))
                })?;
                ProviderFactory::stock_config(model)
            }
        };
        let provider_config = crate::config::ProviderConfig {
            api_key: self.api_key.clone().or(provider_config.api_key),
            model: self.model.clone().unwrap_or(provider_config.model),
            ..provider_config
        };

        ProviderFactory::create(
            &name,
            &provider_config,
            Duration::from_secs(config.timeout),
        )
    }
}

/// Main entry point for the builder API
pub struct PostAnalyzer;

impl PostAnalyzer {
    /// Creates a new builder for analyzing posts
    ///
    /// # Example
    /// ```
    /// use tweet_lens::PostAnalyzer;
    ///
    /// let builder = PostAnalyzer::builder();
    /// ```
    pub fn builder() -> PostAnalyzerBuilder {
        PostAnalyzerBuilder::default()
    }
}
