// International player record parsing.
//
// Unlike the domestic parser, a resolvable birth country is required: rows
// without one (and rows that actually belong to the domestic dataset) go to
// standard rejection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo;
use crate::ingest::{
    birth_decade, csv_reader, parse_number, parse_year, HeaderMap, IngestError, RowSummary,
};

// ---------------------------------------------------------------------------
// Record type
// ---------------------------------------------------------------------------

/// A validated international player row. `birth_country` is the canonical
/// country name (the aggregation key); the raw string and birth city are
/// kept for display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternationalPlayerRecord {
    pub player_id: String,
    pub full_name: String,
    pub birth_year: i32,
    pub birth_decade: i32,
    pub birth_country: String,
    pub birth_country_raw: Option<String>,
    pub birth_city: Option<String>,
    pub war_career: f64,
}

/// Result of parsing one international batch.
#[derive(Debug, Clone)]
pub struct InternationalBatch {
    pub records: Vec<InternationalPlayerRecord>,
    pub summary: RowSummary,
}

// ---------------------------------------------------------------------------
// Header synonyms
// ---------------------------------------------------------------------------

const PLAYER_ID_FIELDS: &[&str] = &["player_id", "playerID"];
const FULL_NAME_FIELDS: &[&str] = &["full_name", "name"];
const BIRTH_COUNTRY_FIELDS: &[&str] = &["birth_country", "birthCountry", "country"];
const BIRTH_CITY_FIELDS: &[&str] = &["birth_city", "birthCity", "city"];
const BIRTH_YEAR_FIELDS: &[&str] = &["birth_year", "birthYear", "birthyear"];
const WAR_FIELDS: &[&str] = &["war_career", "war", "WAR"];

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse an international players CSV. Rows missing an identifier, birth
/// year, WAR, or a resolvable (non-U.S.) country are rejected -- there is no
/// separate "missing geography" counter on this side.
pub fn parse_international_csv(text: &str) -> InternationalBatch {
    let mut reader = csv_reader(text);
    let headers = match reader.headers() {
        Ok(h) => HeaderMap::new(h),
        Err(e) => {
            warn!("unreadable international CSV header: {e}");
            return InternationalBatch {
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
                warn!("skipping malformed international row: {e}");
                summary.rejected += 1;
                continue;
            }
        };

        let player_id = headers.field(&row, PLAYER_ID_FIELDS).unwrap_or_default();
        let birth_year = headers
            .field(&row, BIRTH_YEAR_FIELDS)
            .and_then(parse_year);
        let war_career = headers.field(&row, WAR_FIELDS).and_then(parse_number);
        let country_raw = headers
            .field(&row, BIRTH_COUNTRY_FIELDS)
            .unwrap_or_default();
        let birth_country = geo::normalize_country(country_raw)
            .filter(|_| !geo::is_united_states(country_raw));

        let (birth_year, war_career, birth_country) =
            match (birth_year, war_career, birth_country) {
                (Some(year), Some(war), Some(country)) if !player_id.is_empty() => {
                    (year, war, country)
                }
                _ => {
                    warn!(
                        "rejecting international row {}: missing id/year/WAR/country",
                        summary.row_count
                    );
                    summary.rejected += 1;
                    continue;
                }
            };

        let full_name = headers
            .field(&row, FULL_NAME_FIELDS)
            .filter(|name| !name.is_empty())
            .unwrap_or(player_id)
            .to_string();
        let birth_city = headers
            .field(&row, BIRTH_CITY_FIELDS)
            .filter(|city| !city.is_empty())
            .map(str::to_string);

        records.push(InternationalPlayerRecord {
            player_id: player_id.to_string(),
            full_name,
            birth_year,
            birth_decade: birth_decade(birth_year),
            birth_country,
            birth_country_raw: Some(country_raw.to_string()).filter(|c| !c.is_empty()),
            birth_city,
            war_career,
        });
    }

    summary.accepted = records.len();
    InternationalBatch { records, summary }
}

// ---------------------------------------------------------------------------
// Bundled JSON
// ---------------------------------------------------------------------------

/// Parse the bundled international players JSON.
pub fn parse_international_json(
    text: &str,
    origin: &str,
) -> Result<Vec<InternationalPlayerRecord>, IngestError> {
    serde_json::from_str(text).map_err(|e| IngestError::Json {
        path: origin.to_string(),
        source: e,
    })
}

/// Load the bundled international players JSON from a file path.
pub fn load_international_json(
    path: &Path,
) -> Result<Vec<InternationalPlayerRecord>, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_international_json(&text, &path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
