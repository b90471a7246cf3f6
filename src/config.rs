use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

use crate::media::Platform;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Default provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Text recognition settings
    #[serde(default)]
    pub ocr: OcrConfig,
    /// Hosts and markers the media scanner looks for
    #[serde(default)]
    pub platform: Platform,
    /// Spreadsheet log settings
    #[serde(default)]
    pub sheets: SheetsConfig,
    /// Sources tried when looking up the author's profile picture
    #[serde(default)]
    pub avatar: AvatarConfig,
    /// oEmbed endpoint used to fetch post markup
    #[serde(default = "default_oembed_endpoint")]
    pub oembed_endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            ocr: OcrConfig::default(),
            platform: Platform::default(),
            sheets: SheetsConfig::default(),
            avatar: AvatarConfig::default(),
            oembed_endpoint: default_oembed_endpoint(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for a specific LLM provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4o-mini", "claude-3-5-haiku-latest")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Configuration for optical character recognition
#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    /// Google Cloud Vision API key (falls back to GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Annotate endpoint
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,
    /// Language hint passed to the recognizer
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_ocr_endpoint(),
            language: default_ocr_language(),
        }
    }
}

/// Configuration for the spreadsheet-backed analysis log
#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    /// Target spreadsheet (falls back to SPREADSHEET_ID)
    pub spreadsheet_id: Option<String>,
    /// OAuth bearer token (falls back to GOOGLE_SHEETS_TOKEN)
    pub access_token: Option<String>,
    /// Sheets REST base URL
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            access_token: None,
            base_url: default_sheets_base_url(),
        }
    }
}

/// Services consulted for a profile picture, in order
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AvatarConfig {
    /// unavatar.io style service, queried at `{base}/twitter/{username}`
    pub unavatar_base: String,
    /// GitHub, queried at `{base}/{username}.png`
    pub github_base: String,
    /// Gravatar, queried by hashed address
    pub gravatar_base: String,
    /// Returned when no service has a picture
    pub default_avatar: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            unavatar_base: "https://unavatar.io".to_string(),
            github_base: "https://github.com".to_string(),
            gravatar_base: "https://www.gravatar.com".to_string(),
            default_avatar:
                "https://abs.twimg.com/sticky/default_profile_images/default_profile_normal.png"
                    .to_string(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "openai".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    300
}

fn default_ocr_endpoint() -> String {
    "https://vision.googleapis.com/v1/images:annotate".to_string()
}

fn default_ocr_language() -> String {
    "en".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_oembed_endpoint() -> String {
    "https://publish.twitter.com/oembed".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with TWEETLENS__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: TWEETLENS__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: TWEETLENS__SHEETS__SPREADSHEET_ID
        .add_source(
            Environment::with_prefix("TWEETLENS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
