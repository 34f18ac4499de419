// Dataset sources: fetching bundled/sample datasets over HTTP or from the
// local filesystem.
//
// Loads are fire-and-forget: a failed fetch surfaces as a single terminal
// error for that load with no retry or backoff, and whatever dataset was
// active before the attempt stays active.

use reqwest::Client;
use tracing::info;

use crate::config::DataSources;
use crate::ingest::{
    self, IngestError, InternationalPlayerRecord, PlayerRecord, PopulationRecord,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

// ---------------------------------------------------------------------------
// Text fetching
// ---------------------------------------------------------------------------

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetch the raw text of a dataset from a URL or a filesystem path.
pub async fn fetch_text(client: &Client, location: &str) -> Result<String, SourceError> {
    if is_remote(location) {
        let response = client
            .get(location)
            .send()
            .await
            .map_err(|e| SourceError::Http {
                url: location.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: location.to_string(),
                status,
            });
        }
        response.text().await.map_err(|e| SourceError::Http {
            url: location.to_string(),
            source: e,
        })
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|e| SourceError::Io {
                path: location.to_string(),
                source: e,
            })
    }
}

// ---------------------------------------------------------------------------
// Bundled datasets
// ---------------------------------------------------------------------------

/// The three bundled datasets, parsed and ready for the store.
#[derive(Debug, Clone)]
pub struct BundledData {
    pub players: Vec<PlayerRecord>,
    pub international: Vec<InternationalPlayerRecord>,
    pub populations: Vec<PopulationRecord>,
}

/// Load all three bundled JSON datasets. The fetches run concurrently;
/// the first failure wins and aborts the load as a whole.
pub async fn load_bundled(client: &Client, sources: &DataSources) -> Result<BundledData, SourceError> {
    let (players_text, international_text, populations_text) = tokio::try_join!(
        fetch_text(client, &sources.players_json),
        fetch_text(client, &sources.international_json),
        fetch_text(client, &sources.populations_json),
    )?;

    let players = ingest::players::parse_players_json(&players_text, &sources.players_json)?;
    let international = ingest::international::parse_international_json(
        &international_text,
        &sources.international_json,
    )?;
    let populations = ingest::population::parse_population_json(
        &populations_text,
        &sources.populations_json,
    )?;

    info!(
        players = players.len(),
        international = international.len(),
        populations = populations.len(),
        "bundled datasets loaded"
    );

    Ok(BundledData {
        players,
        international,
        populations,
    })
}

/// Fetch the sample players and population CSVs (raw text, for the store to
/// parse and cache).
pub async fn fetch_sample_data(
    client: &Client,
    sources: &DataSources,
) -> Result<(String, String), SourceError> {
    tokio::try_join!(
        fetch_text(client, &sources.sample_players_csv),
        fetch_text(client, &sources.sample_population_csv),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
