use log::debug;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::platform::{normalize_size, Platform};
use crate::model::{MediaKind, MediaReference};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

static TWITTER: LazyLock<MediaDiscoverer> = LazyLock::new(|| {
    MediaDiscoverer::new(Platform::default()).expect("built-in platform patterns compile")
});

/// One way of spotting media in embed markup. Strategies run in the order of
/// [`Strategy::ORDERED`] and their results accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `<img src="…cdn….jpg">`
    InlineImage,
    /// `<video poster="…cdn….jpg">`
    VideoPoster,
    /// `data-*="…cdn….jpg"`
    DataAttribute,
    /// Bare `https://cdn/media/HASH` occurrences, extension optional
    CdnPath,
    /// `pic.twitter.com/HASH` share links
    ShareLink,
    /// `media_id: 123` style fields in markup or inline scripts
    MediaId,
    /// Anchors pointing at the link shortener whose text is a share link
    ShortLink,
}

impl Strategy {
    pub const ORDERED: [Strategy; 7] = [
        Strategy::InlineImage,
        Strategy::VideoPoster,
        Strategy::DataAttribute,
        Strategy::CdnPath,
        Strategy::ShareLink,
        Strategy::MediaId,
        Strategy::ShortLink,
    ];

    fn pattern(&self, platform: &Platform) -> String {
        let domain = regex::escape(&platform.cdn_domain);
        let base = regex::escape(platform.cdn_base.trim_end_matches('/'));
        let share = regex::escape(&platform.share_host);
        let short = regex::escape(&platform.short_link_host);

        match self {
            Strategy::InlineImage => format!(
                r#"(?i)<img[^>]+src=["']([^"']*{domain}[^"']*?\.(?:jpg|jpeg|png|gif|webp)(?:\?[^"']*)?)[^"']*["'][^>]*>"#
            ),
            Strategy::VideoPoster => format!(
                r#"(?i)<video[^>]*poster=["']([^"']*{domain}[^"']*?\.(?:jpg|jpeg|png)(?:\?[^"']*)?)[^"']*["'][^>]*>"#
            ),
            Strategy::DataAttribute => format!(
                r#"(?i)data-[^=\s>]*=["']([^"']*{domain}[^"']*?\.(?:jpg|jpeg|png|gif|webp)(?:\?[^"']*)?)[^"']*["']"#
            ),
            Strategy::CdnPath => format!(r#"(?i){base}/media/([^"'\s<>?&]+)"#),
            Strategy::ShareLink => format!(r"(?i){share}/([a-zA-Z0-9]+)"),
            Strategy::MediaId => r#"(?i)media[_-]?ids?["']?[:\s=]+["']?([0-9]+)"#.to_string(),
            Strategy::ShortLink => format!(
                r#"(?i)<a[^>]+href=["'](https?://{short}/[^"']*)["'][^>]*>([^<]*{share}[^<]*)</a>"#
            ),
        }
    }
}

struct Matcher {
    strategy: Strategy,
    regex: Regex,
}

/// Scans embed markup for media references. Pure and infallible: markup that
/// matches nothing yields an empty list.
pub struct MediaDiscoverer {
    platform: Platform,
    matchers: Vec<Matcher>,
    post_id: Regex,
}

impl MediaDiscoverer {
    pub fn new(platform: Platform) -> Result<Self, regex::Error> {
        let matchers = Strategy::ORDERED
            .iter()
            .map(|strategy| {
                Ok(Matcher {
                    strategy: *strategy,
                    regex: Regex::new(&strategy.pattern(&platform))?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            platform,
            matchers,
            post_id: Regex::new(r"status/(\d+)")?,
        })
    }

    /// Discoverer for the default Twitter/X profile
    pub fn twitter() -> &'static MediaDiscoverer {
        &TWITTER
    }

    pub fn discover(&self, html: &str) -> Vec<MediaReference> {
        let mut found = Discovered::default();

        for matcher in &self.matchers {
            let before = found.items.len();
            for caps in matcher.regex.captures_iter(html) {
                self.collect(matcher.strategy, &caps, &mut found);
            }
            let added = found.items.len() - before;
            if added > 0 {
                debug!("{:?} found {} media reference(s)", matcher.strategy, added);
            }
        }

        if found.items.is_empty() {
            if let Some(post_id) = self.post_id.captures(html).map(|c| c[1].to_string()) {
                // Best effort guess: unverified, the resolver and OCR weed out misses
                debug!("No media found, guessing CDN urls from post id {}", post_id);
                for url in [
                    self.platform.media_url(&post_id, "jpg"),
                    self.platform.plain_media_url(&post_id),
                    self.platform.video_thumb_url(&post_id),
                ] {
                    found.push_unique(MediaKind::Image, url);
                }
            }
        }

        debug!("Discovered {} media reference(s)", found.items.len());
        found.items
    }

    fn collect(&self, strategy: Strategy, caps: &Captures<'_>, found: &mut Discovered) {
        let value = &caps[1];
        match strategy {
            Strategy::InlineImage | Strategy::DataAttribute => {
                found.push_unique(MediaKind::Image, normalize_size(value));
            }
            Strategy::VideoPoster => {
                found.push_unique(MediaKind::Video, value.to_string());
            }
            Strategy::CdnPath => {
                let (stem, extension) = split_media_hash(value);
                let url = self.platform.media_url(stem, &extension);
                found.push_unless_known(MediaKind::Image, url, stem);
            }
            Strategy::ShareLink | Strategy::MediaId => {
                let url = self.platform.media_url(value, "jpg");
                found.push_unless_known(MediaKind::Image, url, value);
            }
            Strategy::ShortLink => {
                found.push_unique(MediaKind::Image, value.to_string());
            }
        }
    }
}

/// Discovers media using the default Twitter/X profile.
pub fn discover(html: &str) -> Vec<MediaReference> {
    MediaDiscoverer::twitter().discover(html)
}

#[derive(Default)]
struct Discovered {
    items: Vec<MediaReference>,
}

impl Discovered {
    fn push_unique(&mut self, kind: MediaKind, url: String) {
        if url.is_empty() || self.items.iter().any(|item| item.url == url) {
            return;
        }
        self.items.push(MediaReference::new(kind, url));
    }

    /// Skips the URL when it or its hash is already part of a known reference
    fn push_unless_known(&mut self, kind: MediaKind, url: String, key: &str) {
        if key.is_empty()
            || self
                .items
                .iter()
                .any(|item| item.url == url || item.url.contains(key))
        {
            return;
        }
        self.push_unique(kind, url);
    }
}

/// Splits `HASH.ext` (or `HASH.ext:size`) into the hash and a lowercase
/// image extension, defaulting to `jpg`.
fn split_media_hash(hash: &str) -> (&str, String) {
    let hash = hash.split(':').next().unwrap_or(hash);
    match hash.rsplit_once('.') {
        Some((stem, ext)) if IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => {
            (stem, ext.to_lowercase())
        }
        _ => (hash, "jpg".to_string()),
    }
}
