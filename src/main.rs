//! # focus_extract
//!
//! Command-line front end for the article extractor. Each URL is fetched,
//! reduced to readable text and printed as one JSON line on stdout; logs go
//! to stderr.
//!
//! ## Usage
//!
//! ```sh
//! focus_extract https://example.com/post
//! focus_extract -c focus_extract.yaml -o ./saved --user-id alice --sanitize url1 url2
//! ```
//!
//! ## Flow
//!
//! 1. **Setup**: tracing, CLI, YAML config with flag overrides
//! 2. **Extraction**: de-duplicated URLs, a few at a time, Ctrl-C cancels
//!    whatever is still running
//! 3. **Output**: JSON lines, plus one saved record per article with `-o`

use clap::Parser;
use focus_extract::outputs::ContentStore;
use focus_extract::outputs::json::JsonDirStore;
use focus_extract::utils::truncate_for_log;
use focus_extract::{Extractor, ExtractorConfig, NewContent, ScrapeResult, sanitize_content};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde::Serialize;
use std::error::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

/// One line of stdout.
#[derive(Serialize)]
struct OutputLine<'a> {
    url: &'a str,
    #[serde(flatten)]
    article: &'a ScrapeResult,
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(urls = args.urls.len(), ?args.config, ?args.output_dir, "Parsed CLI arguments");

    // ---- Config ----
    let config = match &args.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    let config = args.apply(config);
    config.validate()?;
    let extractor = Extractor::new(config)?;

    let store = match &args.output_dir {
        Some(dir) => {
            let store = JsonDirStore::new(dir);
            store.prepare().await?;
            Some(store)
        }
        None => None,
    };

    // ---- Cancellation ----
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Ctrl-C received; cancelling outstanding extractions");
                let _ = cancel_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Could not listen for Ctrl-C");
                // Keep the sender alive so receivers never see a closed channel.
                std::future::pending::<()>().await;
            }
        }
    });

    // ---- Extract ----
    let urls = args
        .urls
        .iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unique()
        .collect::<Vec<_>>();
    let total = urls.len();
    info!(total, concurrency = args.concurrency, "Starting extraction");

    let mut results = stream::iter(urls)
        .map(|url| {
            let extractor = &extractor;
            let mut cancel = cancel_rx.clone();
            async move {
                let signal = async move {
                    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                };
                let result = extractor.extract_with_cancel(&url, signal).await;
                (url, result)
            }
        })
        .buffer_unordered(args.concurrency.max(1));

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    while let Some((url, result)) = results.next().await {
        let article = match result {
            Ok(article) => article,
            Err(e) => {
                error!(%url, error = %e, message = e.user_message(), "Extraction failed");
                failed += 1;
                continue;
            }
        };
        succeeded += 1;
        debug!(%url, preview = %truncate_for_log(&article.content, 160), "Extracted");

        match serde_json::to_string(&OutputLine { url: &url, article: &article }) {
            Ok(line) => println!("{line}"),
            Err(e) => error!(%url, error = %e, "Failed to serialize result"),
        }

        if let Some(store) = &store {
            let mut record = NewContent::from_result(&article, &url, &args.user_id);
            if args.sanitize {
                record.content = sanitize_content(&record.content);
            }
            if let Err(e) = store.save(record).await {
                error!(%url, error = %e, "Failed to save result");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        succeeded,
        failed,
        "Execution complete"
    );

    if failed > 0 {
        return Err(format!("{failed} of {total} extractions failed").into());
    }
    Ok(())
}
