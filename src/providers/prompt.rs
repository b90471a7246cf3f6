use serde::Deserialize;

use crate::error::AnalyzerError;
use crate::model::{Analysis, Sentiment};

/// The system prompt used for summarizing posts and labelling sentiment.
///
/// Loaded from `prompt.txt` at compile time so it can be edited without
/// dealing with Rust string syntax.
pub const SENTIMENT_SYSTEM_PROMPT: &str = include_str!("prompt.txt");

/// Build the user prompt for one post
pub fn build_analysis_prompt(text: &str, author: Option<&str>) -> String {
    let author = author
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown");

    format!(
        r#"Analyze this tweet and provide:
1. A brief summary (1-2 sentences)
2. Overall sentiment (positive, negative, or neutral)
3. Confidence level for the sentiment (0-1 scale)

Tweet by {author}:
"{text}"

Please respond in this exact JSON format:
{{
  "summary": "your summary here",
  "sentiment": "positive|negative|neutral",
  "confidence": 0.85
}}"#
    )
}

#[derive(Deserialize)]
struct RawAnalysis {
    summary: String,
    #[serde(default)]
    sentiment: String,
    #[serde(default)]
    confidence: f64,
}

/// Parse a model reply into an [`Analysis`].
///
/// Accepts the JSON bare or inside a Markdown code fence. Unknown sentiment
/// labels become neutral and confidence is clamped to 0..=1.
pub fn parse_analysis(content: &str) -> Result<Analysis, AnalyzerError> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    let raw: RawAnalysis = serde_json::from_str(json.trim()).map_err(|e| {
        AnalyzerError::ClassificationError(format!("Invalid response format from AI: {}", e))
    })?;

    let confidence = if raw.confidence.is_nan() {
        0.0
    } else {
        raw.confidence.clamp(0.0, 1.0)
    };

    Ok(Analysis {
        summary: raw.summary,
        sentiment: Sentiment::from_label(&raw.sentiment),
        confidence,
    })
}
