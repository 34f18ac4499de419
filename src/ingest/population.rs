// State population record parsing: user-supplied CSV and the bundled JSON
// dataset.
//
// Output ordering is load-bearing: records come back sorted by state postal
// code, then year ascending, which the nearest-year lookup index relies on.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo;
use crate::ingest::{csv_reader, parse_number, parse_year, HeaderMap, IngestError, RowSummary};

// ---------------------------------------------------------------------------
// Record type
// ---------------------------------------------------------------------------

/// One observed population figure for a state in a given year. `state` is
/// always the canonical postal code after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub state: String,
    pub year: i32,
    pub population: u64,
}

/// Result of parsing one population batch.
#[derive(Debug, Clone)]
pub struct PopulationBatch {
    pub records: Vec<PopulationRecord>,
    pub summary: RowSummary,
}

// ---------------------------------------------------------------------------
// Header synonyms
// ---------------------------------------------------------------------------

const STATE_FIELDS: &[&str] = &["state", "state/region", "state_postal", "state_name"];
const YEAR_FIELDS: &[&str] = &["year", "Year"];
const POPULATION_FIELDS: &[&str] = &["population", "Population", "pop"];
const AGES_FIELDS: &[&str] = &["ages", "age"];

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse a state population CSV. Rows with an unresolvable state or an
/// unparseable year/population are rejected (counted, not raised). When the
/// source carries an age-cohort column, only the "total" bracket is in
/// domain -- other cohorts are skipped entirely, not counted as rejected.
pub fn parse_population_csv(text: &str) -> PopulationBatch {
    let mut reader = csv_reader(text);
    let headers = match reader.headers() {
        Ok(h) => HeaderMap::new(h),
        Err(e) => {
            warn!("unreadable population CSV header: {e}");
            return PopulationBatch {
                records: Vec::new(),
                summary: RowSummary::default(),
            };
        }
    };

    let mut records = Vec::new();
    let mut summary = RowSummary::default();

    for row in reader.records() {
        summary.row_count += 1;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("skipping malformed population row: {e}");
                summary.rejected += 1;
                continue;
            }
        };

        // Out of domain, not invalid: only the "total" age bracket counts.
        if let Some(ages) = headers.field(&row, AGES_FIELDS) {
            if !ages.eq_ignore_ascii_case("total") {
                continue;
            }
        }

        let state_raw = headers.field(&row, STATE_FIELDS).unwrap_or_default();
        let year = headers.field(&row, YEAR_FIELDS).and_then(parse_year);
        let population = headers
            .field(&row, POPULATION_FIELDS)
            .and_then(parse_number)
            .map(f64::round)
            .filter(|p| *p >= 0.0);

        let (year, population) = match (year, population) {
            (Some(year), Some(population)) if !state_raw.is_empty() => (year, population),
            _ => {
                warn!(
                    "rejecting population row {}: missing state/year/population",
                    summary.row_count
                );
                summary.rejected += 1;
                continue;
            }
        };

        let Some(meta) = geo::find_state(state_raw) else {
            warn!("rejecting population row for unknown state '{state_raw}'");
            summary.rejected += 1;
            continue;
        };

        records.push(PopulationRecord {
            state: meta.postal.to_string(),
            year,
            population: population as u64,
        });
    }

    records.sort_by(|a, b| a.state.cmp(&b.state).then(a.year.cmp(&b.year)));
    summary.accepted = records.len();
    PopulationBatch { records, summary }
}

// ---------------------------------------------------------------------------
// Bundled JSON
// ---------------------------------------------------------------------------

/// Parse the bundled population JSON array, re-establishing the
/// (state, year) ordering in case the source was hand-edited.
pub fn parse_population_json(
    text: &str,
    origin: &str,
) -> Result<Vec<PopulationRecord>, IngestError> {
    let mut records: Vec<PopulationRecord> =
        serde_json::from_str(text).map_err(|e| IngestError::Json {
            path: origin.to_string(),
            source: e,
        })?;
    records.sort_by(|a, b| a.state.cmp(&b.state).then(a.year.cmp(&b.year)));
    Ok(records)
}

/// Load the bundled population JSON from a file path.
pub fn load_population_json(path: &Path) -> Result<Vec<PopulationRecord>, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_population_json(&text, &path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
