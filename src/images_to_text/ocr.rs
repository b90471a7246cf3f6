use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::{AnalyzerError, MediaError};

/// Recognizes text in raw image bytes
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Returns the recognized text, or an empty string when the image has none
    async fn recognize(&self, image: &[u8]) -> Result<String, MediaError>;
}

/// Text recognition through the Google Cloud Vision `TEXT_DETECTION` feature.
///
/// Each call is a self-contained request; nothing is kept between images.
pub struct GoogleVisionRecognizer {
    client: Client,
    api_key: String,
    endpoint: String,
    language: String,
}

impl GoogleVisionRecognizer {
    /// Create a recognizer from configuration
    ///
    /// The API key is taken from the config first, then from the
    /// GOOGLE_API_KEY environment variable.
    pub fn new(config: &OcrConfig, timeout: Duration) -> Result<Self, AnalyzerError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                AnalyzerError::NotConfigured(
                    "GOOGLE_API_KEY not found in config or environment".to_string(),
                )
            })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_endpoint(api_key: String, endpoint: String, language: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint,
            language,
        }
    }
}

#[async_trait]
impl TextRecognizer for GoogleVisionRecognizer {
    async fn recognize(&self, image: &[u8]) -> Result<String, MediaError> {
        let request_body = json!({
            "requests": [{
                "image": {
                    "content": STANDARD.encode(image)
                },
                "features": [{
                    "type": "TEXT_DETECTION"
                }],
                "imageContext": {
                    "languageHints": [self.language]
                }
            }]
        });

        debug!("Sending OCR request to Google Vision API");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", &self.api_key)])
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(MediaError::Recognition(format!(
                "Google Vision API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;

        if let Some(message) = response_body["responses"][0]["error"]["message"].as_str() {
            return Err(MediaError::Recognition(message.to_string()));
        }

        // The API returns all detected text in the full annotation; images
        // without text simply have no annotation
        let text = response_body["responses"][0]["fullTextAnnotation"]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        debug!("Extracted text from image: {} characters", text.len());

        Ok(text)
    }
}
