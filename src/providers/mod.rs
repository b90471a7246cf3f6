mod anthropic;
mod factory;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_analysis_prompt, parse_analysis, SENTIMENT_SYSTEM_PROMPT};

use async_trait::async_trait;

use crate::error::AnalyzerError;
use crate::model::Analysis;

/// Unified trait for all LLM providers
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Summarize the post text and label its sentiment
    async fn classify(&self, text: &str, author: Option<&str>) -> Result<Analysis, AnalyzerError>;
}
