use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tweet_lens::images_to_text::TextRecognizer;
use tweet_lens::media::{LinkExpander, MediaFetcher, Platform};
use tweet_lens::{MediaAnalyzer, MediaError, MediaKind};

/// In-memory network: every response is scripted, everything else fails
#[derive(Default)]
struct FakeWeb {
    redirects: HashMap<String, String>,
    pages: HashMap<String, String>,
    live: HashSet<String>,
    images: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeWeb {
    fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn live(mut self, url: &str) -> Self {
        self.live.insert(url.to_string());
        self
    }

    /// Serves an "image" whose bytes are the text the echo recognizer reports
    fn image(mut self, url: &str, text: &str) -> Self {
        self.images.insert(url.to_string(), text.as_bytes().to_vec());
        self
    }

    fn log(&self, call: String) {
        self.requests.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LinkExpander for FakeWeb {
    async fn expand(&self, url: &str) -> Result<String, MediaError> {
        self.log(format!("HEAD {}", url));
        self.redirects
            .get(url)
            .cloned()
            .ok_or(MediaError::Status(404))
    }
}

#[async_trait]
impl MediaFetcher for FakeWeb {
    async fn fetch_page(&self, url: &str) -> Result<String, MediaError> {
        self.log(format!("GET {}", url));
        self.pages.get(url).cloned().ok_or(MediaError::Status(403))
    }

    async fn probe(&self, url: &str) -> Result<(), MediaError> {
        self.log(format!("HEAD {}", url));
        if self.live.contains(url) {
            Ok(())
        } else {
            Err(MediaError::Status(404))
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        self.log(format!("GET {}", url));
        self.images.get(url).cloned().ok_or(MediaError::Status(404))
    }
}

struct EchoRecognizer;

#[async_trait]
impl TextRecognizer for EchoRecognizer {
    async fn recognize(&self, image: &[u8]) -> Result<String, MediaError> {
        Ok(String::from_utf8_lossy(image).to_string())
    }
}

fn example_platform() -> Platform {
    Platform {
        cdn_base: "https://pbs.example.com".to_string(),
        cdn_domain: "example.com".to_string(),
        ..Platform::default()
    }
}

fn analyzer(web: FakeWeb) -> (MediaAnalyzer, Arc<FakeWeb>) {
    let web = Arc::new(web);
    let analyzer = MediaAnalyzer::builder()
        .platform(example_platform())
        .link_expander(web.clone())
        .fetcher(web.clone())
        .recognizer(Arc::new(EchoRecognizer))
        .build()
        .unwrap();
    (analyzer, web)
}

#[tokio::test]
async fn test_inline_image_text_is_extracted() {
    let (analyzer, _) = analyzer(
        FakeWeb::default().image("https://pbs.example.com/media/XYZ.jpg", "HELLO"),
    );

    let result = analyzer
        .analyze(r#"<img src="https://pbs.example.com/media/XYZ.jpg">"#)
        .await;

    assert_eq!(result.media_items.len(), 1);
    assert_eq!(result.media_items[0].kind, MediaKind::Image);
    assert_eq!(result.media_items[0].extracted_text.as_deref(), Some("HELLO"));
    assert_eq!(result.combined_text, "[image]: HELLO");
}

#[tokio::test]
async fn test_unexpandable_short_link_keeps_item_without_text() {
    let html = r#"<blockquote><p>Big news <a href="https://t.co/abc">pic.twitter.com/abc123</a></p></blockquote>"#;
    let (analyzer, web) = analyzer(
        FakeWeb::default().image("https://pbs.example.com/media/abc123.jpg?name=large", "SALE"),
    );

    let result = analyzer.analyze(html).await;

    let urls: Vec<&str> = result.media_items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://pbs.example.com/media/abc123.jpg?name=large",
            "https://t.co/abc",
        ]
    );
    assert_eq!(result.media_items[1].extracted_text, None);
    assert_eq!(result.combined_text, "[image]: SALE");
    assert!(web
        .requests
        .lock()
        .unwrap()
        .contains(&"HEAD https://t.co/abc".to_string()));
}

#[tokio::test]
async fn test_empty_markup_yields_empty_result() {
    let (analyzer, web) = analyzer(FakeWeb::default());

    let result = analyzer.analyze("").await;

    assert!(result.media_items.is_empty());
    assert_eq!(result.combined_text, "");
    assert!(web.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_markup_without_media() {
    let (analyzer, _) = analyzer(FakeWeb::default());

    let result = analyzer
        .analyze("<blockquote><p>Just words, no pictures.</p></blockquote>")
        .await;

    assert!(result.media_items.is_empty());
    assert_eq!(result.combined_text, "");
}

#[tokio::test]
async fn test_same_image_from_several_strategies_is_reported_once() {
    let html = r#"
        <img src="https://pbs.example.com/media/abc123.jpg">
        <div data-image="https://pbs.example.com/media/abc123.jpg"></div>
        <script>var u = "https://pbs.example.com/media/abc123.jpg";</script>
    "#;
    let (analyzer, _) = analyzer(
        FakeWeb::default().image("https://pbs.example.com/media/abc123.jpg", "ONCE"),
    );

    let result = analyzer.analyze(html).await;

    assert_eq!(result.media_items.len(), 1);
    assert_eq!(result.combined_text, "[image]: ONCE");
}

#[tokio::test]
async fn test_analysis_is_repeatable() {
    let html = r#"
        <img src="https://pbs.example.com/media/one.png">
        <video poster="https://pbs.example.com/tweet_video_thumb/two.jpg"></video>
    "#;
    let (analyzer, _) = analyzer(
        FakeWeb::default()
            .image("https://pbs.example.com/media/one.png", "FIRST")
            .image("https://pbs.example.com/tweet_video_thumb/two.jpg", "SECOND"),
    );

    let first = analyzer.analyze(html).await;
    let second = analyzer.analyze(html).await;

    assert_eq!(first, second);
    assert_eq!(first.combined_text, "[image]: FIRST\n\n[video]: SECOND");
}

#[tokio::test]
async fn test_size_token_is_normalized_before_download() {
    let (analyzer, _) = analyzer(
        FakeWeb::default().image("https://pbs.example.com/media/big.jpg?name=large", "LARGE"),
    );

    let result = analyzer
        .analyze(r#"<img src="https://pbs.example.com/media/big.jpg?name=small">"#)
        .await;

    assert_eq!(
        result.media_items[0].url,
        "https://pbs.example.com/media/big.jpg?name=large"
    );
    assert_eq!(result.combined_text, "[image]: LARGE");
}

#[tokio::test]
async fn test_short_link_to_photo_page_is_scraped() {
    let html = r#"<a href="https://t.co/xyz">pic.twitter.com/xyz</a>"#;
    let photo_page = "https://twitter.com/someone/status/1/photo/1";
    let (analyzer, _) = analyzer(
        FakeWeb::default()
            .redirect("https://t.co/xyz", photo_page)
            .page(
                photo_page,
                r#"<meta property="og:image" content="https://pbs.example.com/media/P1.jpg?name=large">"#,
            )
            .image("https://pbs.example.com/media/P1.jpg?name=large", "PHOTO"),
    );

    let result = analyzer.analyze(html).await;

    assert_eq!(result.media_items.len(), 2);
    assert_eq!(result.media_items[0].extracted_text, None);
    assert_eq!(result.media_items[1].extracted_text.as_deref(), Some("PHOTO"));
    assert_eq!(result.combined_text, "[image]: PHOTO");
}

#[tokio::test]
async fn test_blocked_photo_page_falls_back_to_verified_guess() {
    let html = r#"<a href="https://t.co/xyz">pic.twitter.com/xyz</a>"#;
    let (analyzer, web) = analyzer(
        FakeWeb::default()
            .redirect("https://t.co/xyz", "https://twitter.com/someone/status/777/photo/1")
            .live("https://pbs.example.com/media/777.jpg")
            .image("https://pbs.example.com/media/777.jpg", "GUESSED"),
    );

    let result = analyzer.analyze(html).await;

    assert_eq!(result.combined_text, "[image]: GUESSED");
    let requests = web.requests.lock().unwrap();
    assert!(requests.contains(&"HEAD https://pbs.example.com/media/777.jpg".to_string()));
}

#[tokio::test]
async fn test_unverified_guess_is_not_downloaded() {
    let html = r#"<a href="https://t.co/xyz">pic.twitter.com/xyz</a>"#;
    let (analyzer, web) = analyzer(
        FakeWeb::default()
            .redirect("https://t.co/xyz", "https://twitter.com/someone/status/777/photo/1")
            .image("https://pbs.example.com/media/777.jpg", "NEVER"),
    );

    let result = analyzer.analyze(html).await;

    assert_eq!(result.combined_text, "");
    let requests = web.requests.lock().unwrap();
    assert!(!requests.contains(&"GET https://pbs.example.com/media/777.jpg".to_string()));
}

#[tokio::test]
async fn test_post_id_guesses_when_nothing_else_matches() {
    let html = r#"<a href="https://twitter.com/someone/status/12345">March 1, 2024</a>"#;
    let (analyzer, _) = analyzer(
        FakeWeb::default().image("https://pbs.example.com/tweet_video_thumb/12345.jpg", "THUMB"),
    );

    let result = analyzer.analyze(html).await;

    let urls: Vec<&str> = result.media_items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://pbs.example.com/media/12345.jpg?name=large",
            "https://pbs.example.com/media/12345.jpg",
            "https://pbs.example.com/tweet_video_thumb/12345.jpg",
        ]
    );
    assert_eq!(result.combined_text, "[image]: THUMB");
}

#[tokio::test]
async fn test_recognized_text_is_trimmed_and_blank_text_dropped() {
    let html = r#"
        <img src="https://pbs.example.com/media/a.jpg">
        <img src="https://pbs.example.com/media/b.jpg">
    "#;
    let (analyzer, _) = analyzer(
        FakeWeb::default()
            .image("https://pbs.example.com/media/a.jpg", "  padded \n")
            .image("https://pbs.example.com/media/b.jpg", "   "),
    );

    let result = analyzer.analyze(html).await;

    assert_eq!(result.media_items.len(), 2);
    assert_eq!(result.media_items[0].extracted_text.as_deref(), Some("padded"));
    assert_eq!(result.media_items[1].extracted_text, None);
    assert_eq!(result.combined_text, "[image]: padded");
}

#[tokio::test]
async fn test_result_serializes_for_the_envelope() {
    let (analyzer, _) = analyzer(
        FakeWeb::default().image("https://pbs.example.com/media/XYZ.jpg", "HELLO"),
    );

    let result = analyzer
        .analyze(r#"<img src="https://pbs.example.com/media/XYZ.jpg">"#)
        .await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["combinedText"], "[image]: HELLO");
    assert_eq!(json["mediaItems"][0]["type"], "image");
    assert_eq!(json["mediaItems"][0]["url"], "https://pbs.example.com/media/XYZ.jpg");
    assert_eq!(json["mediaItems"][0]["extractedText"], "HELLO");
}
