use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use tweet_lens::{
    AnalysisLog, AnalyzerError, AppConfig, MediaAnalyzer, PostEnvelope, PostFetcher,
    SheetsClient,
};

/// Fetch posts, read the text in their images and classify them
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a post and the text found in its media
    Fetch {
        /// Status URL on twitter.com or x.com
        url: String,
    },
    /// Fetch, summarize and label the sentiment of a post
    Analyze {
        url: String,
        /// Append the result to the configured spreadsheet
        #[arg(long)]
        save: bool,
    },
    /// Run media analysis over embed markup read from a file
    Media { html_file: PathBuf },
    /// List logged analyses
    History,
    /// Create a spreadsheet with the log header row
    SetupSheet {
        #[arg(long, default_value = "Tweet Analysis Results")]
        title: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            print_json(&PostEnvelope::err(e.to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), AnalyzerError> {
    let config = AppConfig::load()?;
    let timeout = Duration::from_secs(config.timeout);

    match command {
        Command::Fetch { url } => {
            let post = PostFetcher::from_config(&config)?.fetch_post(&url).await?;
            print_json(&PostEnvelope::ok(post));
        }
        Command::Analyze { url, save } => {
            let outcome = tweet_lens::analyze_post(&url, save).await?;
            print_json(&json!({
                "success": true,
                "tweet": outcome.post,
                "analysis": outcome.analysis,
                "saved": outcome.saved,
            }));
        }
        Command::Media { html_file } => {
            let html = tokio::fs::read_to_string(&html_file).await?;
            let result = MediaAnalyzer::from_config(&config)?.analyze(&html).await;
            print_json(&result);
        }
        Command::History => {
            let rows = SheetsClient::new(&config.sheets, timeout)?.list_rows().await?;
            print_json(&json!({ "success": true, "rows": rows }));
        }
        Command::SetupSheet { title } => {
            let id = SheetsClient::new(&config.sheets, timeout)?
                .create_spreadsheet(&title)
                .await?;
            print_json(&json!({ "success": true, "spreadsheetId": id }));
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_with_save() {
        let cli = Cli::parse_from(["tweet-lens", "analyze", "https://x.com/jack/status/20", "--save"]);
        match cli.command {
            Command::Analyze { url, save } => {
                assert_eq!(url, "https://x.com/jack/status/20");
                assert!(save);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_setup_sheet_default_title() {
        let cli = Cli::parse_from(["tweet-lens", "setup-sheet"]);
        match cli.command {
            Command::SetupSheet { title } => assert_eq!(title, "Tweet Analysis Results"),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
