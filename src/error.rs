use thiserror::Error;

/// Errors that can occur while fetching, analyzing or logging a post
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Failed to reach an upstream service
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The post URL is not a recognizable status URL
    #[error("Invalid tweet url format. Use twitter.com or x.com urls: {0}")]
    InvalidPostUrl(String),

    /// The post is deleted, private, or the embed endpoint refused it
    #[error("Tweet not found, deleted, private, or API temporarily unavailable")]
    PostNotFound,

    /// A required input field was empty or absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The language model call failed or returned an unusable payload
    #[error("Classification failed: {0}")]
    ClassificationError(String),

    /// The spreadsheet service rejected a request
    #[error("Spreadsheet error: {0}")]
    SheetsError(String),

    /// A collaborator is missing its credentials or identifiers
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Error parsing HTTP headers
    #[error("Header parse error: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Failed to read a local file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    /// HTTP status class for this failure: bad input, not found, or upstream
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyzerError::InvalidPostUrl(_)
            | AnalyzerError::MissingField(_)
            | AnalyzerError::NotConfigured(_)
            | AnalyzerError::BuilderError(_) => 400,
            AnalyzerError::PostNotFound => 404,
            _ => 500,
        }
    }
}

/// Failures inside the media pipeline. These never reach callers of
/// `MediaAnalyzer::analyze`; each one only drops the text of a single item.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("not an image url: {0}")]
    NotAnImageUrl(String),

    #[error("no image url found in page {0}")]
    NoImageInPage(String),

    #[error("guessed image url did not verify: {0}")]
    GuessRejected(String),

    #[error("image at {0} has no content")]
    EmptyImage(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),
}
