use log::debug;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::AvatarConfig;
use crate::media::MediaFetcher;

/// Finds a profile picture for a username by asking a few public services
/// in turn. A source counts only when a HEAD request to it succeeds.
#[derive(Clone)]
pub struct AvatarLookup {
    sources: AvatarConfig,
    fetcher: Arc<dyn MediaFetcher>,
}

impl AvatarLookup {
    pub fn new(sources: AvatarConfig, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { sources, fetcher }
    }

    /// Candidate URLs in the order they are tried, excluding the default
    fn candidates(&self, username: &str) -> Vec<String> {
        let email_hash = hex::encode(Sha256::digest(format!(
            "{}@twitter.com",
            username.to_lowercase()
        )));
        vec![
            format!(
                "{}/twitter/{}",
                self.sources.unavatar_base.trim_end_matches('/'),
                username
            ),
            format!(
                "{}/{}.png",
                self.sources.github_base.trim_end_matches('/'),
                username
            ),
            format!(
                "{}/avatar/{}?d=404&s=200",
                self.sources.gravatar_base.trim_end_matches('/'),
                email_hash
            ),
        ]
    }

    /// Returns the first reachable picture, or the default avatar when none
    /// answers. A blank username has no picture.
    pub async fn find(&self, username: &str) -> Option<String> {
        let username = username.trim();
        if username.is_empty() {
            return None;
        }

        for url in self.candidates(username) {
            match self.fetcher.probe(&url).await {
                Ok(()) => return Some(url),
                Err(e) => debug!("No avatar at {}: {}", url, e),
            }
        }
        Some(self.sources.default_avatar.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::RequestFetcher;
    use mockito::{Matcher, Server};

    fn lookup(base: &str) -> AvatarLookup {
        let sources = AvatarConfig {
            unavatar_base: base.to_string(),
            github_base: base.to_string(),
            gravatar_base: base.to_string(),
            default_avatar: format!("{}/default.png", base),
        };
        AvatarLookup::new(sources, Arc::new(RequestFetcher::new(None).unwrap()))
    }

    #[tokio::test]
    async fn test_first_reachable_source_wins() {
        let mut server = Server::new_async().await;
        let unavatar = server
            .mock("HEAD", "/twitter/jack")
            .with_status(404)
            .create_async()
            .await;
        let github = server
            .mock("HEAD", "/jack.png")
            .with_status(200)
            .create_async()
            .await;

        let found = lookup(&server.url()).find("jack").await;

        assert_eq!(found, Some(format!("{}/jack.png", server.url())));
        unavatar.assert_async().await;
        github.assert_async().await;
    }

    #[tokio::test]
    async fn test_unavatar_is_tried_first() {
        let mut server = Server::new_async().await;
        let _unavatar = server
            .mock("HEAD", "/twitter/jack")
            .with_status(200)
            .create_async()
            .await;
        let github = server
            .mock("HEAD", "/jack.png")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let found = lookup(&server.url()).find("jack").await;

        assert_eq!(found, Some(format!("{}/twitter/jack", server.url())));
        github.assert_async().await;
    }

    #[tokio::test]
    async fn test_hashed_address_is_tried_before_default() {
        let mut server = Server::new_async().await;
        let gravatar = server
            .mock("HEAD", Matcher::Regex(r"^/avatar/[0-9a-f]{64}$".to_string()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("d".into(), "404".into()),
                Matcher::UrlEncoded("s".into(), "200".into()),
            ]))
            .with_status(404)
            .create_async()
            .await;

        let found = lookup(&server.url()).find("nobody_here").await;

        assert_eq!(found, Some(format!("{}/default.png", server.url())));
        gravatar.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_username_has_no_picture() {
        let lookup = lookup("http://127.0.0.1:9");
        assert_eq!(lookup.find("").await, None);
        assert_eq!(lookup.find("   ").await, None);
    }

    #[test]
    fn test_candidates_are_stable_per_username() {
        let lookup = lookup("https://avatars.example.com/");
        let first = lookup.candidates("Jack");
        assert_eq!(first[0], "https://avatars.example.com/twitter/Jack");
        assert_eq!(first[1], "https://avatars.example.com/Jack.png");
        assert_eq!(first, lookup.candidates("Jack"));
        assert_eq!(first[2], lookup.candidates("jack")[2]);
    }
}
