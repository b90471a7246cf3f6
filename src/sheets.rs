//! Append-only analysis log kept in a Google Sheets spreadsheet.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use log::{debug, info};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::SheetsConfig;
use crate::error::AnalyzerError;
use crate::model::AnalysisRecord;

pub const HEADER_ROW: [&str; 6] = [
    "Username",
    "Tweet Content",
    "Sentiment",
    "Summary",
    "Date/Time",
    "Tweet URL",
];

const DATA_RANGE: &str = "A:F";
const SHEET_TITLE: &str = "Analysis Results";

/// Persistence for analysis results
#[async_trait]
pub trait AnalysisLog: Send + Sync {
    async fn append_row(&self, record: &AnalysisRecord) -> Result<(), AnalyzerError>;

    /// All logged rows, oldest first, without the header row
    async fn list_rows(&self) -> Result<Vec<AnalysisRecord>, AnalyzerError>;
}

impl AnalysisRecord {
    /// New record stamped with the current UTC time
    pub fn stamped(
        username: impl Into<String>,
        tweet_content: impl Into<String>,
        sentiment: impl Into<String>,
        summary: impl Into<String>,
        tweet_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            tweet_content: tweet_content.into(),
            sentiment: sentiment.into(),
            summary: summary.into(),
            date_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            tweet_url: tweet_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: Option<String>,
}

/// Google Sheets v4 REST client authenticated with an OAuth bearer token
pub struct SheetsClient {
    client: Client,
    base_url: String,
    access_token: String,
    spreadsheet_id: Option<String>,
}

impl SheetsClient {
    /// Create a client from configuration
    ///
    /// Credentials are taken from the config first, then from the
    /// GOOGLE_SHEETS_TOKEN and SPREADSHEET_ID environment variables.
    pub fn new(config: &SheetsConfig, timeout: Duration) -> Result<Self, AnalyzerError> {
        let access_token = config
            .access_token
            .clone()
            .or_else(|| std::env::var("GOOGLE_SHEETS_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                AnalyzerError::NotConfigured(
                    "Google Sheets credentials not configured, set GOOGLE_SHEETS_TOKEN".to_string(),
                )
            })?;

        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .or_else(|| std::env::var("SPREADSHEET_ID").ok())
            .filter(|id| !id.trim().is_empty());

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token,
            spreadsheet_id,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, access_token: String, spreadsheet_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            access_token,
            spreadsheet_id,
        }
    }

    fn spreadsheet_id(&self) -> Result<&str, AnalyzerError> {
        self.spreadsheet_id.as_deref().ok_or_else(|| {
            AnalyzerError::NotConfigured(
                "Spreadsheet not configured, set SPREADSHEET_ID".to_string(),
            )
        })
    }

    /// Creates a spreadsheet with the header row and returns its id
    pub async fn create_spreadsheet(&self, title: &str) -> Result<String, AnalyzerError> {
        let response = self
            .client
            .post(format!("{}/v4/spreadsheets", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&json!({
                "properties": { "title": title },
                "sheets": [{ "properties": { "title": SHEET_TITLE } }]
            }))
            .send()
            .await?;

        let created: CreatedSpreadsheet = ensure_success(response).await?.json().await?;
        let spreadsheet_id = created.spreadsheet_id.ok_or_else(|| {
            AnalyzerError::SheetsError("Failed to get spreadsheet id from response".to_string())
        })?;

        let response = self
            .client
            .put(format!(
                "{}/v4/spreadsheets/{}/values/A1:F1",
                self.base_url, spreadsheet_id
            ))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": [HEADER_ROW] }))
            .send()
            .await?;
        ensure_success(response).await?;

        info!("Created spreadsheet {} ({})", title, spreadsheet_id);
        Ok(spreadsheet_id)
    }
}

async fn ensure_success(response: Response) -> Result<Response, AnalyzerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AnalyzerError::SheetsError(format!(
        "Google Sheets API error ({}): {}",
        status, body
    )))
}

#[async_trait]
impl AnalysisLog for SheetsClient {
    async fn append_row(&self, record: &AnalysisRecord) -> Result<(), AnalyzerError> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let response = self
            .client
            .post(format!(
                "{}/v4/spreadsheets/{}/values/{}:append",
                self.base_url, spreadsheet_id, DATA_RANGE
            ))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": [record.to_row()] }))
            .send()
            .await?;
        ensure_success(response).await?;

        debug!("Appended analysis of {} to {}", record.tweet_url, spreadsheet_id);
        Ok(())
    }

    async fn list_rows(&self) -> Result<Vec<AnalysisRecord>, AnalyzerError> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let response = self
            .client
            .get(format!(
                "{}/v4/spreadsheets/{}/values/{}",
                self.base_url, spreadsheet_id, DATA_RANGE
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let range: ValueRange = ensure_success(response).await?.json().await?;

        Ok(range
            .values
            .iter()
            .skip(1)
            .map(|row| AnalysisRecord::from_row(row))
            .collect())
    }
}
