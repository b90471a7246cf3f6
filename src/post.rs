//! Post URL handling and text extraction from embed markup.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static STATUS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(twitter\.com|x\.com)/\w+/status/\d+/?$").unwrap()
});
static X_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://x\.com").unwrap());
static STATUS_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"status/(\d+)").unwrap());
static PROFILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:twitter|x)\.com/([^/?#]+)").unwrap());
static BLOCKQUOTE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("blockquote").unwrap());

/// Drops query string and fragment. Unparseable input is returned as is.
pub fn clean_post_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

pub fn validate_post_url(url: &str) -> bool {
    STATUS_URL.is_match(url)
}

/// The oEmbed endpoint only knows twitter.com URLs
pub fn normalize_post_url(url: &str) -> String {
    X_HOST.replace(url, "https://twitter.com").into_owned()
}

pub fn extract_post_id(url: &str) -> Option<String> {
    STATUS_ID.captures(url).map(|caps| caps[1].to_string())
}

/// Username from a profile or status URL, empty when none is present
pub fn extract_username(url: &str) -> String {
    PROFILE
        .captures(url)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Readable text of a post embed.
///
/// Uses the blockquote body with links and the trailing
/// `\u{2014} Author (@user) Date` attribution removed; without a blockquote, all
/// text outside scripts and styles.
pub fn extract_post_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);

    let text = match fragment.select(&BLOCKQUOTE).next() {
        Some(blockquote) => {
            let text = collect_text(blockquote, &["a", "script", "style"]);
            match text.rfind('\u{2014}') {
                Some(attribution) => text[..attribution].to_string(),
                None => text,
            }
        }
        None => collect_text(fragment.root_element(), &["script", "style"]),
    };

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(root: ElementRef<'_>, skipped: &[&str]) -> String {
    let mut text = String::new();
    for node in root.descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let inside_skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| skipped.contains(&element.name()))
                .unwrap_or(false)
        });
        if !inside_skipped {
            text.push_str(chunk);
            text.push(' ');
        }
    }
    text
}
