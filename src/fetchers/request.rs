use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Response};
use std::time::Duration;

use crate::error::MediaError;
use crate::media::{LinkExpander, MediaFetcher};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// reqwest-backed fetcher used for link expansion, page scraping and image
/// downloads. Every call is bounded by the client timeout.
#[derive(Clone)]
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; TweetLens/1.0)")
            .build()?;

        Ok(Self { client })
    }

    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        headers
    }
}

fn ensure_success(response: Response) -> Result<Response, MediaError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(MediaError::Status(status.as_u16()))
    }
}

#[async_trait]
impl LinkExpander for RequestFetcher {
    async fn expand(&self, url: &str) -> Result<String, MediaError> {
        let response = ensure_success(self.client.head(url).send().await?)?;
        let final_url = response.url().to_string();
        debug!("Expanded {} to {}", url, final_url);
        Ok(final_url)
    }
}

#[async_trait]
impl MediaFetcher for RequestFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, MediaError> {
        let response = self
            .client
            .get(url)
            .headers(Self::browser_headers())
            .send()
            .await?;
        debug!("Photo page {} answered {}", url, response.status());
        let html = ensure_success(response)?.text().await?;
        Ok(html)
    }

    async fn probe(&self, url: &str) -> Result<(), MediaError> {
        ensure_success(self.client.head(url).send().await?)?;
        Ok(())
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let response = ensure_success(self.client.get(url).send().await?)?;
        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> RequestFetcher {
        RequestFetcher::new(Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_expand_follows_redirects() {
        let mut server = Server::new_async().await;
        let target = format!("{}/media/final.jpg", server.url());
        let redirect = server
            .mock("HEAD", "/abc")
            .with_status(301)
            .with_header("location", &target)
            .create_async()
            .await;
        let landing = server
            .mock("HEAD", "/media/final.jpg")
            .with_status(200)
            .create_async()
            .await;

        let expanded = fetcher()
            .expand(&format!("{}/abc", server.url()))
            .await
            .unwrap();
        assert_eq!(expanded, target);
        redirect.assert_async().await;
        landing.assert_async().await;
    }

    #[tokio::test]
    async fn test_expand_fails_on_error_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("HEAD", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let result = fetcher().expand(&format!("{}/gone", server.url())).await;
        assert!(matches!(result, Err(MediaError::Status(404))));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_browser_signature() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/jack/status/1/photo/1")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .with_status(200)
            .with_body("<html>page</html>")
            .create_async()
            .await;

        let html = fetcher()
            .fetch_page(&format!("{}/jack/status/1/photo/1", server.url()))
            .await
            .unwrap();
        assert_eq!(html, "<html>page</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_image_and_probe() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", "/media/a.jpg")
            .with_status(200)
            .with_body(vec![0xFF, 0xD8, 0xFF])
            .create_async()
            .await;
        let _head = server
            .mock("HEAD", "/media/missing.jpg")
            .with_status(404)
            .create_async()
            .await;

        let bytes = fetcher()
            .fetch_image(&format!("{}/media/a.jpg", server.url()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);

        let probe = fetcher()
            .probe(&format!("{}/media/missing.jpg", server.url()))
            .await;
        assert!(probe.is_err());
    }
}
