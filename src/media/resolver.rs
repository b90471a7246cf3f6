use log::{debug, warn};
use regex::Regex;

use super::platform::{canonicalize_cdn_url, is_direct_image_url, Platform};
use super::MediaFetcher;
use crate::error::MediaError;

/// Page patterns tried in order against a scraped photo page; the first one
/// that matches wins. Group 1 holds the URL when present, otherwise the whole
/// match does.
fn page_patterns(platform: &Platform) -> Vec<String> {
    let base = regex::escape(platform.cdn_base.trim_end_matches('/'));
    vec![
        format!(r#"(?i){base}/media/[^"'\s<>]+"#),
        format!(r#"(?i)"({base}/media/[^"]+)""#),
        format!(r#"(?i)'({base}/media/[^']+)'"#),
        format!(r#"(?i)content="({base}/media/[^"]+)""#),
        format!(r#"(?i)data-[^=]*="({base}/media/[^"]+)""#),
        format!(r#"(?i){base}/[^"'\s<>]+"#),
    ]
}

/// Turns a photo page, or an already direct URL, into a downloadable image URL.
pub struct DirectImageResolver {
    platform: Platform,
    page_patterns: Vec<Regex>,
}

impl DirectImageResolver {
    pub fn new(platform: Platform) -> Result<Self, regex::Error> {
        let page_patterns = page_patterns(&platform)
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            platform,
            page_patterns,
        })
    }

    pub async fn resolve(
        &self,
        url: &str,
        fetcher: &dyn MediaFetcher,
    ) -> Result<String, MediaError> {
        if is_direct_image_url(url) {
            return Ok(url.to_string());
        }

        if !self.platform.is_photo_page(url) {
            return Err(MediaError::NotAnImageUrl(url.to_string()));
        }

        match fetcher.fetch_page(url).await {
            Ok(html) => self.find_in_page(url, &html),
            Err(e) => {
                warn!("Photo page {} refused ({}), guessing CDN url", url, e);
                self.guess_from_page_url(url, fetcher).await
            }
        }
    }

    fn find_in_page(&self, url: &str, html: &str) -> Result<String, MediaError> {
        for (index, pattern) in self.page_patterns.iter().enumerate() {
            let Some(caps) = pattern.captures(html) else {
                continue;
            };
            let found = caps.get(1).or_else(|| caps.get(0));
            if let Some(found) = found {
                let decoded = html_escape::decode_html_entities(found.as_str());
                let candidate = canonicalize_cdn_url(&decoded);
                debug!("Page pattern {} matched {}", index + 1, candidate);
                if is_direct_image_url(&candidate) {
                    return Ok(candidate);
                }
                return Err(MediaError::NotAnImageUrl(candidate));
            }
        }

        Err(MediaError::NoImageInPage(url.to_string()))
    }

    /// Best effort guess: builds a CDN URL from the numeric id in the page
    /// path and only accepts it when the CDN answers a HEAD request.
    async fn guess_from_page_url(
        &self,
        url: &str,
        fetcher: &dyn MediaFetcher,
    ) -> Result<String, MediaError> {
        let id = numeric_id_after_status(url)
            .ok_or_else(|| MediaError::GuessRejected(url.to_string()))?;
        let candidate = self.platform.plain_media_url(id);
        debug!("Trying constructed image url {}", candidate);

        match fetcher.probe(&candidate).await {
            Ok(()) => Ok(candidate),
            Err(e) => {
                debug!("Constructed url {} rejected: {}", candidate, e);
                Err(MediaError::GuessRejected(candidate))
            }
        }
    }
}

fn numeric_id_after_status(url: &str) -> Option<&str> {
    let mut segments = url.split('/');
    segments.find(|segment| *segment == "status")?;
    segments
        .next()
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
}
