pub mod builder;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod images_to_text;
pub mod media;
pub mod model;
pub mod pipelines;
pub mod post;
pub mod providers;
pub mod sheets;

pub use builder::{AnalyzeResult, LlmProvider, PostAnalyzer, PostAnalyzerBuilder};
pub use config::AppConfig;
pub use error::{AnalyzerError, MediaError};
pub use media::{MediaAnalyzer, MediaAnalyzerBuilder};
pub use model::{
    Analysis, AnalysisRecord, MediaAnalysisResult, MediaKind, MediaReference, PostData,
    PostEnvelope, Sentiment,
};
pub use pipelines::{AnalysisOutcome, PostFetcher, PostPipeline};
pub use sheets::{AnalysisLog, SheetsClient};

use std::time::Duration;

use log::debug;

use crate::providers::ProviderFactory;

/// Fetch a post and the text found in its media, using the loaded configuration
pub async fn fetch_post(url: &str) -> Result<PostData, AnalyzerError> {
    let config = AppConfig::load()?;
    PostFetcher::from_config(&config)?.fetch_post(url).await
}

/// Media analysis over embed markup, using the loaded configuration
pub async fn analyze_media(html: &str) -> Result<MediaAnalysisResult, AnalyzerError> {
    let config = AppConfig::load()?;
    Ok(MediaAnalyzer::from_config(&config)?.analyze(html).await)
}

/// Fetch, classify and, when `save` is set, log a post
pub async fn analyze_post(url: &str, save: bool) -> Result<AnalysisOutcome, AnalyzerError> {
    let config = AppConfig::load()?;
    debug!("Analyzing {} with provider {}", url, config.default_provider);

    let provider = ProviderFactory::get_default_provider(&config)?;
    let log: Option<Box<dyn AnalysisLog>> = if save {
        Some(Box::new(SheetsClient::new(
            &config.sheets,
            Duration::from_secs(config.timeout),
        )?))
    } else {
        None
    };

    PostPipeline::new(PostFetcher::from_config(&config)?, provider, log)
        .analyze(url, save)
        .await
}
