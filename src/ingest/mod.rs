// Dataset ingestion: CSV and bundled-JSON loaders for player and population
// records.
//
// Row-level failures are never errors. A bad row is dropped, counted in the
// validation summary, and logged at warn; the batch always continues. Only
// I/O and top-level JSON failures surface as `IngestError`.

pub mod international;
pub mod players;
pub mod population;

use std::collections::HashMap;

use serde::Serialize;

pub use international::{parse_international_csv, InternationalPlayerRecord};
pub use players::{parse_players_csv, PlayerRecord};
pub use population::{parse_population_csv, PopulationRecord};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Validation summaries
// ---------------------------------------------------------------------------

/// Per-batch outcome counts for a generic row source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowSummary {
    pub row_count: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Outcome counts for a domestic player batch. `missing_state` counts rows
/// whose geography failed to resolve -- distinct from `rejected` so reporting
/// can tell "unparseable" apart from "unrecognized geography".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub row_count: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub missing_state: usize,
}

/// Combined validation report handed back to the caller after a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub players: PlayerSummary,
    pub populations: RowSummary,
}

// ---------------------------------------------------------------------------
// Field-name synonym resolution
// ---------------------------------------------------------------------------

/// Column index lookup over a CSV header row. Each logical field names an
/// ordered list of accepted header synonyms, tried in priority order.
pub(crate) struct HeaderMap {
    indexes: HashMap<String, usize>,
}

impl HeaderMap {
    pub(crate) fn new(headers: &csv::StringRecord) -> Self {
        let indexes = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        Self { indexes }
    }

    /// Return the trimmed value of the first candidate column present in
    /// both the header and the row. Missing columns and absent cells both
    /// come back as `None`.
    pub(crate) fn field<'r>(
        &self,
        row: &'r csv::StringRecord,
        candidates: &[&str],
    ) -> Option<&'r str> {
        candidates
            .iter()
            .find_map(|name| self.indexes.get(*name))
            .and_then(|&i| row.get(i))
            .map(str::trim)
    }
}

// ---------------------------------------------------------------------------
// Numeric normalization
// ---------------------------------------------------------------------------

/// Parse a numeric cell. Empty strings, the literal tokens "null"/"NaN"
/// (case-insensitive), unparseable text, and non-finite results are all
/// invalid and come back as `None`.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return None;
    }
    let lowered = cleaned.to_lowercase();
    if lowered == "null" || lowered == "nan" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer year cell via the shared numeric policy.
pub(crate) fn parse_year(value: &str) -> Option<i32> {
    parse_number(value).map(|v| v as i32)
}

/// Derive the birth decade from a birth year: the nearest lower multiple of
/// ten (Euclidean flooring, so it stays correct for any year).
pub fn birth_decade(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

// ---------------------------------------------------------------------------
// Shared CSV reader setup
// ---------------------------------------------------------------------------

/// Build a CSV reader over raw text with the crate-wide settings: trimmed
/// trailing whitespace tolerated, variable-length rows allowed so a short
/// row rejects at the field level instead of failing the batch.
pub(crate) fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.trim().as_bytes())
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Round a WAR figure to three decimal places -- applied at the point values
/// leave the engine, never during accumulation.
pub fn round_war(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
