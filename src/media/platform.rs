use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)(\?|$)").unwrap());
static VIDEO_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(mp4|mov)$").unwrap());
static FORMAT_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<path>[^?#]*/media/[^/?#.]+)\?(?P<query>[^#]*)").unwrap()
});
static FORMAT_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|&)format=(jpg|jpeg|png|gif|webp)(?:&|$)").unwrap());
static SIZE_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([?&])name=\w+").unwrap());

/// Hosts and path conventions of the platform whose embeds are scanned.
///
/// The default is the Twitter/X profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Platform {
    /// Scheme and host of the image CDN, e.g. `https://pbs.twimg.com`
    pub cdn_base: String,
    /// Domain any CDN asset lives under, e.g. `twimg.com`
    pub cdn_domain: String,
    /// Host of share links shown in post text, e.g. `pic.twitter.com`
    pub share_host: String,
    /// Host of the redirecting link shortener, e.g. `t.co`
    pub short_link_host: String,
    /// Path segment that marks a photo page
    pub photo_marker: String,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            cdn_base: "https://pbs.twimg.com".to_string(),
            cdn_domain: "twimg.com".to_string(),
            share_host: "pic.twitter.com".to_string(),
            short_link_host: "t.co".to_string(),
            photo_marker: "/photo/".to_string(),
        }
    }
}

impl Platform {
    /// CDN URL for a media id, e.g. `https://pbs.twimg.com/media/ID.jpg?name=large`
    pub fn media_url(&self, id: &str, extension: &str) -> String {
        format!(
            "{}/media/{}.{}?name=large",
            self.cdn_base.trim_end_matches('/'),
            id,
            extension
        )
    }

    /// Same as [`Platform::media_url`] without the size parameter
    pub fn plain_media_url(&self, id: &str) -> String {
        format!("{}/media/{}.jpg", self.cdn_base.trim_end_matches('/'), id)
    }

    pub fn video_thumb_url(&self, id: &str) -> String {
        format!(
            "{}/tweet_video_thumb/{}.jpg",
            self.cdn_base.trim_end_matches('/'),
            id
        )
    }

    pub fn is_short_link(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|h| h.eq_ignore_ascii_case(&self.short_link_host)))
            .unwrap_or(false)
    }

    pub fn is_photo_page(&self, url: &str) -> bool {
        url.contains(&self.photo_marker)
    }
}

/// True when the URL path ends in a known image extension, optionally
/// followed by a query string.
pub fn is_direct_image_url(url: &str) -> bool {
    IMAGE_EXTENSION.is_match(url)
}

/// Rewrites a video URL to the still frame the CDN serves next to it.
pub fn still_frame_url(url: &str) -> String {
    VIDEO_EXTENSION.replace(url, ".jpg").into_owned()
}

/// Rewrites any `name=` size parameter to `name=large`.
pub fn normalize_size(url: &str) -> String {
    SIZE_PARAM.replace(url, "${1}name=large").into_owned()
}

/// Moves a `format=` query parameter into the path as a file extension:
/// `…/media/ID?format=jpg&name=small` becomes `…/media/ID.jpg?name=small`.
/// URLs without that shape are returned unchanged.
pub fn canonicalize_cdn_url(url: &str) -> String {
    let Some(caps) = FORMAT_QUERY.captures(url) else {
        return url.to_string();
    };
    let query = &caps["query"];
    let Some(format) = FORMAT_PARAM.captures(query) else {
        return url.to_string();
    };

    let rest: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.to_ascii_lowercase().starts_with("format="))
        .filter(|pair| !pair.is_empty())
        .collect();

    let mut canonical = format!("{}.{}", &caps["path"], format[1].to_lowercase());
    if !rest.is_empty() {
        canonical.push('?');
        canonical.push_str(&rest.join("&"));
    }
    canonical
}
