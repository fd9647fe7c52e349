//! `fetch` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use fetch::{DocumentReader, ReqwestClient, Url};
use serde_json::Value;
use tracing::info;

use crate::cli::FetchArgs;
use crate::error::{self, CliError};

/// Execute the `fetch` command
pub async fn run_fetch(args: &FetchArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let base_url = Url::parse(&config.documents.base_url)
        .with_context(|| format!("Invalid documents.base_url '{}'", config.documents.base_url))?;

    info!(base_url = %base_url, path = %args.path, "Fetching document");

    let client = ReqwestClient::new(Duration::from_millis(config.documents.timeout_ms))
        .map_err(CliError::from)?;
    let reader = DocumentReader::with_base_url(client, base_url);

    match fetch_document(&reader, &args.path).await? {
        Some(document) => {
            let json = serde_json::to_string_pretty(&document)
                .context("Failed to render document")?;
            println!("{}", json);
        }
        None => println!("No document at '{}'", args.path),
    }

    Ok(())
}

async fn fetch_document(
    reader: &DocumentReader<ReqwestClient>,
    path: &str,
) -> error::Result<Option<Value>> {
    Ok(reader.read::<Value>(path).await?)
}
