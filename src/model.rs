use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a discovered media attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate media attachment found in embed markup.
///
/// `url` is whatever the markup contained: a shortened link, a photo page or a
/// direct CDN URL. `extracted_text` is only set when recognition produced text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

impl MediaReference {
    pub fn new(kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            extracted_text: None,
        }
    }

    /// `"[kind]: text"` block for this item, if it carries text
    pub fn text_block(&self) -> Option<String> {
        self.extracted_text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| format!("[{}]: {}", self.kind, text))
    }
}

/// Output of the media pipeline for one post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAnalysisResult {
    pub media_items: Vec<MediaReference>,
    pub combined_text: String,
}

impl MediaAnalysisResult {
    /// Builds the result, deriving `combined_text` from the items
    pub fn from_items(media_items: Vec<MediaReference>) -> Self {
        let combined_text = media_items
            .iter()
            .filter_map(MediaReference::text_block)
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            media_items,
            combined_text,
        }
    }
}

/// Post data returned by the fetch step, enriched with media text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub html: String,
    pub author_name: String,
    pub author_url: String,
    pub username: String,
    pub url: String,
    pub text: String,
    pub width: u32,
    pub height: u32,
    pub media_content: Vec<MediaReference>,
    pub media_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl PostData {
    /// Text sent to the classifier: the post body plus any text found in media
    pub fn classification_text(&self) -> String {
        if self.media_text.is_empty() {
            self.text.clone()
        } else {
            format!(
                "{}\n\nText found in attached media:\n{}",
                self.text, self.media_text
            )
        }
    }
}

/// JSON envelope returned to callers of the fetch step
#[derive(Debug, Serialize)]
pub struct PostEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet: Option<PostData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PostEnvelope {
    pub fn ok(post: PostData) -> Self {
        Self {
            success: true,
            tweet: Some(post),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            tweet: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parses a label, treating anything unrecognized as neutral
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Summary and sentiment produced by a language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub sentiment: Sentiment,
    /// Sentiment confidence in 0..=1
    pub confidence: f64,
}

/// One row of the spreadsheet log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub username: String,
    pub tweet_content: String,
    pub sentiment: String,
    pub summary: String,
    pub date_time: String,
    pub tweet_url: String,
}

impl AnalysisRecord {
    /// Column order used by the spreadsheet: A..F
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.tweet_content.clone(),
            self.sentiment.clone(),
            self.summary.clone(),
            self.date_time.clone(),
            self.tweet_url.clone(),
        ]
    }

    /// Reads a spreadsheet row; missing trailing cells become empty strings
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        Self {
            username: cell(0),
            tweet_content: cell(1),
            sentiment: cell(2),
            summary: cell(3),
            date_time: cell(4),
            tweet_url: cell(5),
        }
    }
}
