use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use super::discover::MediaDiscoverer;
use super::extract::MediaTextExtractor;
use super::platform::Platform;
use super::{LinkExpander, MediaFetcher};
use crate::config::AppConfig;
use crate::error::AnalyzerError;
use crate::fetchers::RequestFetcher;
use crate::images_to_text::{GoogleVisionRecognizer, TextRecognizer};
use crate::model::MediaAnalysisResult;

/// Drives discovery and text extraction over every media item of a post.
///
/// Holds no per-request state; one analyzer can serve any number of calls.
pub struct MediaAnalyzer {
    discoverer: MediaDiscoverer,
    extractor: MediaTextExtractor,
}

impl MediaAnalyzer {
    pub fn builder() -> MediaAnalyzerBuilder {
        MediaAnalyzerBuilder::default()
    }

    /// Analyzer wired to the HTTP fetcher and Google Vision, as configured
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalyzerError> {
        let timeout = Duration::from_secs(config.timeout);
        let recognizer = GoogleVisionRecognizer::new(&config.ocr, timeout)?;

        Self::builder()
            .platform(config.platform.clone())
            .timeout(timeout)
            .recognizer(Arc::new(recognizer))
            .build()
    }

    /// Finds the media in `html` and extracts text from each item in turn.
    ///
    /// Items are processed one after another to keep outbound traffic to the
    /// scraped hosts low. Never fails: items without text stay in the list
    /// with `extracted_text` unset.
    pub async fn analyze(&self, html: &str) -> MediaAnalysisResult {
        let mut items = self.discoverer.discover(html);
        info!("Analyzing {} media item(s)", items.len());

        for item in items.iter_mut() {
            debug!("Processing {}: {}", item.kind, item.url);
            let text = self.extractor.extract_text(item).await;
            if text.is_empty() {
                debug!("No text found in {} {}", item.kind, item.url);
            } else {
                item.extracted_text = Some(text);
            }
        }

        let result = MediaAnalysisResult::from_items(items);
        info!(
            "Media analysis complete, combined text length: {}",
            result.combined_text.len()
        );
        result
    }
}

/// Builder for [`MediaAnalyzer`]
///
/// Any collaborator left unset defaults to [`RequestFetcher`]; the recognizer
/// has no default and must be provided.
#[derive(Default)]
pub struct MediaAnalyzerBuilder {
    platform: Option<Platform>,
    timeout: Option<Duration>,
    expander: Option<Arc<dyn LinkExpander>>,
    fetcher: Option<Arc<dyn MediaFetcher>>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl MediaAnalyzerBuilder {
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Timeout for each request made by the default HTTP fetcher
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn link_expander(mut self, expander: Arc<dyn LinkExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn MediaFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn build(self) -> Result<MediaAnalyzer, AnalyzerError> {
        let recognizer = self.recognizer.ok_or_else(|| {
            AnalyzerError::BuilderError("No text recognizer specified".to_string())
        })?;
        let platform = self.platform.unwrap_or_default();

        let (expander, fetcher) = match (self.expander, self.fetcher) {
            (Some(expander), Some(fetcher)) => (expander, fetcher),
            (expander, fetcher) => {
                let http = Arc::new(RequestFetcher::new(self.timeout)?);
                let expander = match expander {
                    Some(expander) => expander,
                    None => http.clone() as Arc<dyn LinkExpander>,
                };
                let fetcher = match fetcher {
                    Some(fetcher) => fetcher,
                    None => http as Arc<dyn MediaFetcher>,
                };
                (expander, fetcher)
            }
        };

        let invalid = |e: regex::Error| {
            AnalyzerError::BuilderError(format!("Invalid platform pattern: {}", e))
        };

        Ok(MediaAnalyzer {
            discoverer: MediaDiscoverer::new(platform.clone()).map_err(invalid)?,
            extractor: MediaTextExtractor::new(platform, expander, fetcher, recognizer)
                .map_err(invalid)?,
        })
    }
}
