//! Media text extraction: finds attachments in embed markup, resolves them to
//! downloadable images and runs text recognition over each one.

mod analyzer;
mod discover;
mod extract;
mod platform;
mod resolver;

pub use analyzer::{MediaAnalyzer, MediaAnalyzerBuilder};
pub use discover::{discover, MediaDiscoverer, Strategy};
pub use extract::MediaTextExtractor;
pub use platform::{
    canonicalize_cdn_url, is_direct_image_url, normalize_size, still_frame_url, Platform,
};
pub use resolver::DirectImageResolver;

use async_trait::async_trait;

use crate::error::MediaError;

/// Expands redirecting links to their final destination
#[async_trait]
pub trait LinkExpander: Send + Sync {
    async fn expand(&self, url: &str) -> Result<String, MediaError>;
}

/// Network access the media pipeline needs besides link expansion
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetches an HTML page with a browser-like request signature
    async fn fetch_page(&self, url: &str) -> Result<String, MediaError>;

    /// Metadata-only request; succeeds when the URL answers with a 2xx status
    async fn probe(&self, url: &str) -> Result<(), MediaError>;

    /// Downloads raw image bytes
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MediaError>;
}
