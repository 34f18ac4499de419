// Domestic player record parsing: user-supplied CSV and the bundled JSON
// dataset (pre-joined, camelCase keys).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo;
use crate::ingest::{
    birth_decade, csv_reader, parse_number, parse_year, HeaderMap, IngestError, PlayerSummary,
};

// ---------------------------------------------------------------------------
// Record type
// ---------------------------------------------------------------------------

/// A validated domestic player row. `birth_state_raw` keeps the raw
/// geography string; resolution happens lazily via `geo::find_state` at
/// filter/aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub player_id: String,
    pub full_name: String,
    pub birth_year: i32,
    pub birth_state_raw: String,
    pub war_career: f64,
    pub birth_decade: i32,
}

/// Result of parsing one player batch: the accepted records plus the
/// acceptance/rejection counts.
#[derive(Debug, Clone)]
pub struct PlayerBatch {
    pub records: Vec<PlayerRecord>,
    pub summary: PlayerSummary,
}

// ---------------------------------------------------------------------------
// Header synonyms
// ---------------------------------------------------------------------------

const PLAYER_ID_FIELDS: &[&str] = &["player_id", "playerID"];
const FULL_NAME_FIELDS: &[&str] = &["full_name", "name"];
const BIRTH_STATE_FIELDS: &[&str] = &["birth_state", "birthState"];
const BIRTH_YEAR_FIELDS: &[&str] = &["birth_year", "birthYear", "birthyear"];
const WAR_FIELDS: &[&str] = &["war_career", "war", "WAR"];

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse a domestic players CSV. Rows with a missing identifier or an
/// unparseable birth year or WAR are rejected (counted, not raised). Rows
/// whose state fails to resolve are still accepted into the record set but
/// increment the separate `missing_state` counter -- the aggregation engine
/// excludes them later.
pub fn parse_players_csv(text: &str) -> PlayerBatch {
    let mut reader = csv_reader(text);
    let headers = match reader.headers() {
        Ok(h) => HeaderMap::new(h),
        Err(e) => {
            warn!("unreadable player CSV header: {e}");
            return PlayerBatch {
                records: Vec::new(),
                summary: PlayerSummary::default(),
            };
        }
    };

    let mut records = Vec::new();
    let mut summary = PlayerSummary::default();

    for row in reader.records() {
        summary.row_count += 1;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("skipping malformed player row: {e}");
                summary.rejected += 1;
                continue;
            }
        };

        let player_id = headers.field(&row, PLAYER_ID_FIELDS).unwrap_or_default();
        let birth_year = headers
            .field(&row, BIRTH_YEAR_FIELDS)
            .and_then(parse_year);
        let war_career = headers.field(&row, WAR_FIELDS).and_then(parse_number);

        let (birth_year, war_career) = match (birth_year, war_career) {
            (Some(year), Some(war)) if !player_id.is_empty() => (year, war),
            _ => {
                warn!("rejecting player row {}: missing id/year/WAR", summary.row_count);
                summary.rejected += 1;
                continue;
            }
        };

        let birth_state_raw = headers
            .field(&row, BIRTH_STATE_FIELDS)
            .unwrap_or_default()
            .to_string();
        if geo::find_state(&birth_state_raw).is_none() {
            summary.missing_state += 1;
        }

        // A missing name never rejects a row; fall back to the identifier.
        let full_name = headers
            .field(&row, FULL_NAME_FIELDS)
            .filter(|name| !name.is_empty())
            .unwrap_or(player_id)
            .to_string();

        records.push(PlayerRecord {
            player_id: player_id.to_string(),
            full_name,
            birth_year,
            birth_state_raw,
            war_career,
            birth_decade: birth_decade(birth_year),
        });
    }

    summary.accepted = records.len();
    PlayerBatch { records, summary }
}

// ---------------------------------------------------------------------------
// Bundled JSON
// ---------------------------------------------------------------------------

/// Parse the bundled players JSON (an array of pre-validated records with
/// precomputed decade and rounded WAR).
pub fn parse_players_json(text: &str, origin: &str) -> Result<Vec<PlayerRecord>, IngestError> {
    serde_json::from_str(text).map_err(|e| IngestError::Json {
        path: origin.to_string(),
        source: e,
    })
}

/// Load the bundled players JSON from a file path.
pub fn load_players_json(path: &Path) -> Result<Vec<PlayerRecord>, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_players_json(&text, &path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_rows_accepted() {
        let csv_data = "\
player_id,full_name,birth_state,birth_year,war_career
ruthba01,Babe Ruth,MD,1895,182.5
gehrilo01,Lou Gehrig,NY,1903,113.7";

        let batch = parse_players_csv(csv_data);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.summary.row_count, 2);
        assert_eq!(batch.summary.accepted, 2);
        assert_eq!(batch.summary.rejected, 0);
        assert_eq!(batch.summary.missing_state, 0);

        let ruth = &batch.records[0];
        assert_eq!(ruth.player_id, "ruthba01");
        assert_eq!(ruth.full_name, "Babe Ruth");
        assert_eq!(ruth.birth_year, 1895);
        assert_eq!(ruth.birth_decade, 1890);
        assert!((ruth.war_career - 182.5).abs() < f64::EPSILON);
    }

    #[test]
    fn header_synonyms_accepted() {
        let csv_data = "\
playerID,name,birthState,birthYear,WAR
mayswi01,Willie Mays,AL,1931,156.2";

        let batch = parse_players_csv(csv_data);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].player_id, "mayswi01");
        assert_eq!(batch.records[0].birth_state_raw, "AL");
        assert_eq!(batch.records[0].birth_decade, 1930);
    }

    #[test]
    fn nan_birth_year_rejected_not_missing_state() {
        let csv_data = "\
player_id,full_name,birth_state,birth_year,war_career
good01,Good Player,CA,1950,10.0
bad01,Bad Player,CA,NaN,10.0";

        let batch = parse_players_csv(csv_data);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.summary.rejected, 1);
        assert_eq!(batch.summary.missing_state, 0);
    }

    #[test]
    fn unresolvable_state_counts_separately() {
        let csv_data = "\
player_id,full_name,birth_state,birth_year,war_career
a01,Player A,CA,1950,10.0
b01,Player B,Narnia,1960,5.0
c01,Player C,,1970,3.0";

        let batch = parse_players_csv(csv_data);
        // Rows with unknown or empty state are still accepted, just counted.
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.summary.rejected, 0);
        assert_eq!(batch.summary.missing_state, 2);
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let csv_data = "\
player_id,birth_state,birth_year,war_career
anon01,TX,1940,20.0";

        let batch = parse_players_csv(csv_data);
        assert_eq!(batch.records[0].full_name, "anon01");
    }

    #[test]
    fn fields_are_trimmed() {
        let csv_data = "\
player_id,full_name,birth_state,birth_year,war_career
  pad01  ,  Padded Name  ,  ca  , 1950 , 7.5 ";

        let batch = parse_players_csv(csv_data);
        assert_eq!(batch.records[0].player_id, "pad01");
        assert_eq!(batch.records[0].full_name, "Padded Name");
        assert_eq!(batch.records[0].birth_state_raw, "ca");
        assert_eq!(batch.summary.missing_state, 0);
    }

    #[test]
    fn empty_input_yields_zero_rows() {
        let batch = parse_players_csv("");
        assert!(batch.records.is_empty());
        assert_eq!(batch.summary.row_count, 0);

        let headers_only = parse_players_csv("player_id,birth_year,war_career");
        assert!(headers_only.records.is_empty());
        assert_eq!(headers_only.summary.row_count, 0);
    }

    #[test]
    fn negative_war_is_valid() {
        let csv_data = "\
player_id,full_name,birth_state,birth_year,war_career
neg01,Sub Replacement,OH,1962,-4.25";

        let batch = parse_players_csv(csv_data);
        assert_eq!(batch.records.len(), 1);
        assert!((batch.records[0].war_career + 4.25).abs() < f64::EPSILON);
    }

    #[test]
    fn json_roundtrip_is_idempotent() {
        let csv_data = "\
player_id,full_name,birth_state,birth_year,war_career
ruthba01,Babe Ruth,MD,1895,182.5
neg01,Sub Replacement,OH,1962,-4.25";

        let batch = parse_players_csv(csv_data);
        let serialized = serde_json::to_string(&batch.records).unwrap();
        let reparsed = parse_players_json(&serialized, "inline").unwrap();
        assert_eq!(batch.records, reparsed);
    }

    #[test]
    fn json_camel_case_keys() {
        let json = r#"[{
            "playerId": "ruthba01",
            "fullName": "Babe Ruth",
            "birthYear": 1895,
            "birthStateRaw": "MD",
            "warCareer": 182.5,
            "birthDecade": 1890
        }]"#;

        let records = parse_players_json(json, "inline").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_id, "ruthba01");
        assert_eq!(records[0].birth_decade, 1890);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_players_json("not json", "inline").is_err());
    }
}
