use log::{debug, warn};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AnalyzerError;
use crate::post::{extract_post_id, extract_username};

const FALLBACK_TEXT: &str = "Tweet content could not be retrieved due to API limitations";

/// Embeddable representation of a post, as returned by the oEmbed endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_url: String,
    #[serde(default)]
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

pub struct OEmbedClient {
    client: Client,
    endpoint: String,
}

impl OEmbedClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AnalyzerError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn fetch(&self, post_url: &str) -> Result<Embed, AnalyzerError> {
        debug!("Attempting oEmbed fetch for {}", post_url);

        let embed = self
            .client
            .get(&self.endpoint)
            .query(&[("url", post_url), ("omit_script", "true"), ("theme", "dark")])
            .header(USER_AGENT, "Mozilla/5.0 (compatible; TweetLens/1.0)")
            .send()
            .await?
            .error_for_status()?
            .json::<Embed>()
            .await?;

        debug!(
            "oEmbed returned author {:?}, html length {}",
            embed.author_name,
            embed.html.len()
        );
        Ok(embed)
    }

    /// Fetches the embed, synthesizing minimal data from the URL itself when
    /// the endpoint is unavailable. Fails with `PostNotFound` when the URL
    /// carries no status id or username to fall back on.
    pub async fn fetch_or_fallback(&self, post_url: &str) -> Result<Embed, AnalyzerError> {
        match self.fetch(post_url).await {
            Ok(embed) => Ok(embed),
            Err(e) => {
                warn!("oEmbed failed for {}, using fallback data: {}", post_url, e);
                fallback_embed(post_url).ok_or(AnalyzerError::PostNotFound)
            }
        }
    }
}

/// Placeholder embed built from the URL parts alone
pub fn fallback_embed(post_url: &str) -> Option<Embed> {
    extract_post_id(post_url)?;
    let username = extract_username(post_url);
    if username.is_empty() {
        return None;
    }

    let mut chars = username.chars();
    let author_name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };

    Some(Embed {
        html: format!(
            "<blockquote><p>{}</p>&mdash; {} (@{})</blockquote>",
            FALLBACK_TEXT,
            html_escape::encode_text(&author_name),
            html_escape::encode_text(&username)
        ),
        author_url: format!("https://x.com/{}", username),
        author_name,
        url: post_url.to_string(),
        width: Some(500),
        height: Some(200),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::extract_post_text;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_fetch_embed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/oembed")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "url".into(),
                    "https://twitter.com/jack/status/20".into(),
                ),
                Matcher::UrlEncoded("omit_script".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "url": "https://twitter.com/jack/status/20",
                    "author_name": "jack",
                    "author_url": "https://twitter.com/jack",
                    "html": "<blockquote><p>just setting up my twttr</p></blockquote>",
                    "width": 550,
                    "height": null
                }"#,
            )
            .create_async()
            .await;

        let client = OEmbedClient::new(format!("{}/oembed", server.url())).unwrap();
        let embed = client
            .fetch("https://twitter.com/jack/status/20")
            .await
            .unwrap();

        assert_eq!(embed.author_name, "jack");
        assert_eq!(embed.width, Some(550));
        assert_eq!(embed.height, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fallback_when_endpoint_fails() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/oembed")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = OEmbedClient::new(format!("{}/oembed", server.url())).unwrap();
        let embed = client
            .fetch_or_fallback("https://twitter.com/jack/status/20")
            .await
            .unwrap();

        assert_eq!(embed.author_name, "Jack");
        assert_eq!(embed.author_url, "https://x.com/jack");
        assert_eq!(extract_post_text(&embed.html), FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_no_fallback_without_status_id() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/oembed")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = OEmbedClient::new(format!("{}/oembed", server.url())).unwrap();
        let result = client.fetch_or_fallback("https://twitter.com/jack").await;
        assert!(matches!(result, Err(AnalyzerError::PostNotFound)));
    }
}
