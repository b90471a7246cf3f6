use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::AnalyzerError;
use crate::fetchers::{AvatarLookup, OEmbedClient, RequestFetcher};
use crate::media::MediaAnalyzer;
use crate::model::{Analysis, AnalysisRecord, PostData};
use crate::post::{
    clean_post_url, extract_post_text, extract_username, normalize_post_url, validate_post_url,
};
use crate::providers::SentimentProvider;
use crate::sheets::AnalysisLog;

/// Fetches a post's embed and enriches it with text found in its media
pub struct PostFetcher {
    oembed: OEmbedClient,
    media: MediaAnalyzer,
    avatars: Option<AvatarLookup>,
}

impl PostFetcher {
    /// A fetcher that leaves `profile_picture` unset
    pub fn new(oembed: OEmbedClient, media: MediaAnalyzer) -> Self {
        Self {
            oembed,
            media,
            avatars: None,
        }
    }

    /// Look up the author's profile picture for every fetched post
    pub fn with_avatars(mut self, avatars: AvatarLookup) -> Self {
        self.avatars = Some(avatars);
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AnalyzerError> {
        let http = RequestFetcher::new(Some(Duration::from_secs(config.timeout)))?;
        Ok(Self::new(
            OEmbedClient::new(config.oembed_endpoint.clone())?,
            MediaAnalyzer::from_config(config)?,
        )
        .with_avatars(AvatarLookup::new(config.avatar.clone(), Arc::new(http))))
    }

    /// Fetch a post by its status URL
    ///
    /// # Errors
    /// * `MissingField` when the URL is blank
    /// * `InvalidPostUrl` when it is not a twitter.com or x.com status URL
    /// * `PostNotFound` when the embed is unavailable and nothing can be
    ///   recovered from the URL
    pub async fn fetch_post(&self, raw_url: &str) -> Result<PostData, AnalyzerError> {
        let raw_url = raw_url.trim();
        if raw_url.is_empty() {
            return Err(AnalyzerError::MissingField("url"));
        }

        let cleaned = clean_post_url(raw_url);
        if !validate_post_url(&cleaned) {
            return Err(AnalyzerError::InvalidPostUrl(cleaned));
        }
        let post_url = normalize_post_url(&cleaned);

        let embed = self.oembed.fetch_or_fallback(&post_url).await?;

        let mut username = extract_username(&embed.author_url);
        if username.is_empty() {
            username = extract_username(&post_url);
        }
        let text = extract_post_text(&embed.html);
        let profile_picture = match &self.avatars {
            Some(avatars) => avatars.find(&username).await,
            None => None,
        };

        let media = self.media.analyze(&embed.html).await;
        info!(
            "Fetched post by @{} with {} media item(s)",
            username,
            media.media_items.len()
        );

        Ok(PostData {
            url: if embed.url.is_empty() {
                post_url
            } else {
                embed.url
            },
            author_name: embed.author_name,
            author_url: embed.author_url,
            width: embed.width.unwrap_or(500),
            height: embed.height.unwrap_or(200),
            html: embed.html,
            username,
            text,
            media_content: media.media_items,
            media_text: media.combined_text,
            profile_picture,
        })
    }
}

/// Result of a full fetch and classify run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub post: PostData,
    pub analysis: Analysis,
    /// Whether a row was appended to the analysis log
    pub saved: bool,
}

/// Fetch, classify and optionally log a post
pub struct PostPipeline {
    fetcher: PostFetcher,
    provider: Box<dyn SentimentProvider>,
    log: Option<Box<dyn AnalysisLog>>,
}

impl PostPipeline {
    pub fn new(
        fetcher: PostFetcher,
        provider: Box<dyn SentimentProvider>,
        log: Option<Box<dyn AnalysisLog>>,
    ) -> Self {
        Self {
            fetcher,
            provider,
            log,
        }
    }

    pub async fn analyze(&self, url: &str, save: bool) -> Result<AnalysisOutcome, AnalyzerError> {
        let post = self.fetcher.fetch_post(url).await?;

        let author = (!post.author_name.is_empty()).then_some(post.author_name.as_str());
        let analysis = self
            .provider
            .classify(&post.classification_text(), author)
            .await?;
        info!(
            "Classified {} as {} using {}",
            post.url,
            analysis.sentiment.as_str(),
            self.provider.provider_name()
        );

        let saved = if save {
            let log = self.log.as_ref().ok_or_else(|| {
                AnalyzerError::NotConfigured("No analysis log configured".to_string())
            })?;
            let record = AnalysisRecord::stamped(
                post.username.clone(),
                post.text.clone(),
                analysis.sentiment.as_str(),
                analysis.summary.clone(),
                post.url.clone(),
            );
            match log.append_row(&record).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to save analysis of {}: {}", post.url, e);
                    false
                }
            }
        } else {
            false
        };

        Ok(AnalysisOutcome {
            post,
            analysis,
            saved,
        })
    }
}
