use log::{debug, info};
use std::sync::Arc;

use super::platform::{is_direct_image_url, still_frame_url, Platform};
use super::resolver::DirectImageResolver;
use super::{LinkExpander, MediaFetcher};
use crate::error::MediaError;
use crate::images_to_text::TextRecognizer;
use crate::model::{MediaKind, MediaReference};

/// Runs one media reference through expansion, resolution, download and
/// text recognition.
pub struct MediaTextExtractor {
    platform: Platform,
    resolver: DirectImageResolver,
    expander: Arc<dyn LinkExpander>,
    fetcher: Arc<dyn MediaFetcher>,
    recognizer: Arc<dyn TextRecognizer>,
}

impl MediaTextExtractor {
    pub fn new(
        platform: Platform,
        expander: Arc<dyn LinkExpander>,
        fetcher: Arc<dyn MediaFetcher>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            resolver: DirectImageResolver::new(platform.clone())?,
            platform,
            expander,
            fetcher,
            recognizer,
        })
    }

    /// Recognized text for the reference, trimmed. Every failure yields an
    /// empty string so one bad item never stops a batch.
    pub async fn extract_text(&self, reference: &MediaReference) -> String {
        match self.try_extract_text(reference).await {
            Ok(text) => text,
            Err(e) => {
                debug!("No text from {} {}: {}", reference.kind, reference.url, e);
                String::new()
            }
        }
    }

    pub async fn try_extract_text(&self, reference: &MediaReference) -> Result<String, MediaError> {
        let mut url = match reference.kind {
            MediaKind::Image => reference.url.clone(),
            MediaKind::Video => still_frame_url(&reference.url),
        };

        if self.platform.is_short_link(&url) {
            url = self.expander.expand(&url).await?;
        }

        let direct = self.resolver.resolve(&url, self.fetcher.as_ref()).await?;

        // The resolver can be fooled by scraped pages; check again before downloading
        if !is_direct_image_url(&direct) {
            return Err(MediaError::NotAnImageUrl(direct));
        }

        let image = self.fetcher.fetch_image(&direct).await?;
        if image.is_empty() {
            return Err(MediaError::EmptyImage(direct));
        }

        let text = self.recognizer.recognize(&image).await?;
        let text = text.trim().to_string();
        info!(
            "Recognized {} characters in {} {}",
            text.len(),
            reference.kind,
            direct
        );
        Ok(text)
    }
}
