pub mod api;
pub mod artists;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod range;
mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

pub use config::AppConfig;
pub use extract::{extract, extract_detailed, DegradeReason, Extracted};
pub use fetch::{FetchError, FetchService, ScriptFetcher};
pub use models::{ArtistProfile, DateRange, EventRecord, ScrapeOptions};
pub use range::{resolve, RangeError};

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("could not prepare {path:?}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves the date range, has `fetcher` write the listing CSV and parses it.
///
/// Without an explicit `output_path` the file lands in `data_dir` as
/// `berlin_events.csv`. Lines that could only be parsed through a fallback are
/// logged and still returned.
pub async fn scrape_events(
    fetcher: &dyn FetchService,
    data_dir: &Path,
    options: ScrapeOptions,
) -> Result<Vec<EventRecord>, ScrapeError> {
    let range = range::resolve(options.start_date.as_deref(), options.end_date.as_deref());
    let output = options
        .output_path
        .unwrap_or_else(|| utils::default_output_path(data_dir));
    run_pipeline(fetcher, &range, &output).await
}

/// Default window, written to a file named after the range.
pub async fn scrape_latest(
    fetcher: &dyn FetchService,
    data_dir: &Path,
) -> Result<Vec<EventRecord>, ScrapeError> {
    let range = range::resolve(None, None);
    let output = utils::dated_output_path(data_dir, &range.start, &range.end);
    run_pipeline(fetcher, &range, &output).await
}

async fn run_pipeline(
    fetcher: &dyn FetchService,
    range: &DateRange,
    output: &Path,
) -> Result<Vec<EventRecord>, ScrapeError> {
    utils::ensure_parent(output)
        .await
        .map_err(|source| ScrapeError::Prepare {
            path: output.to_path_buf(),
            source,
        })?;

    tracing::info!(start = %range.start, end = %range.end, "scraping Berlin events");
    fetcher.fetch(range, output).await?;

    let bytes = tokio::fs::read(output)
        .await
        .map_err(|source| ScrapeError::Read {
            path: output.to_path_buf(),
            source,
        })?;
    let text = String::from_utf8_lossy(&bytes);

    let extracted = extract::extract_detailed(&text);
    let degraded = extracted.iter().filter(|item| item.is_degraded()).count();

    let mut events = Vec::with_capacity(extracted.len());
    for item in extracted {
        if let Extracted::Degraded { line, reason, .. } = &item {
            tracing::warn!(line, reason = ?reason, path = ?output, "degraded event line");
        }
        events.push(item.into_record());
    }

    tracing::info!(
        count = events.len(),
        degraded,
        "scraped events from Resident Advisor"
    );
    Ok(events)
}

/// Loads configuration and serves the HTTP API until the process exits.
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load();
    let fetcher = ScriptFetcher::from_config(&config);
    let state = api::AppState {
        fetcher: Arc::new(fetcher),
        data_dir: Arc::new(config.data_dir.clone()),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        addr = %config.bind,
        script = ?config.script_path(),
        data_dir = ?config.data_dir,
        "listening"
    );

    axum::serve(listener, api::create_router(state))
        .await
        .context("http server stopped")
}
