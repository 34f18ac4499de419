// Filter policy: stateless predicates over a player record set.

use serde::{Deserialize, Serialize};

use crate::geo;
use crate::ingest::PlayerRecord;

// ---------------------------------------------------------------------------
// Filter model
// ---------------------------------------------------------------------------

/// Decade constraint: either all decades or one specific birth decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecadeFilter {
    #[default]
    All,
    Only(i32),
}

impl DecadeFilter {
    pub fn matches(&self, birth_decade: i32) -> bool {
        match self {
            DecadeFilter::All => true,
            DecadeFilter::Only(decade) => birth_decade == *decade,
        }
    }
}

/// Active filter state for an aggregation query. `league` is carried for
/// forward compatibility and currently always passes -- no league field
/// exists on records yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub min_year: i32,
    pub max_year: i32,
    pub min_war: f64,
    pub decade: DecadeFilter,
    pub league: Option<String>,
}

impl Filters {
    /// Default bounds used before any dataset establishes its own extent.
    pub const DEFAULT_MIN_YEAR: i32 = 1850;

    /// A copy of these filters with the decade replaced, leaving the stored
    /// selection untouched -- callers may aggregate a specific decade without
    /// mutating global filter state.
    pub fn with_decade(&self, decade: DecadeFilter) -> Filters {
        Filters {
            decade,
            ..self.clone()
        }
    }
}

impl Default for Filters {
    fn default() -> Self {
        Filters {
            min_year: Self::DEFAULT_MIN_YEAR,
            max_year: current_year(),
            min_war: 0.0,
            decade: DecadeFilter::All,
            league: None,
        }
    }
}

fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Whether a domestic player record passes the active filters: birth year
/// within the inclusive range, WAR at or above the threshold, decade match,
/// and a resolvable birth state. The league selector always passes.
pub fn player_passes(player: &PlayerRecord, filters: &Filters) -> bool {
    if player.birth_year < filters.min_year || player.birth_year > filters.max_year {
        return false;
    }
    if player.war_career < filters.min_war {
        return false;
    }
    if !filters.decade.matches(player.birth_decade) {
        return false;
    }
    geo::find_state(&player.birth_state_raw).is_some()
}

/// Filter a domestic player set.
pub fn filter_players<'p>(players: &'p [PlayerRecord], filters: &Filters) -> Vec<&'p PlayerRecord> {
    players.iter().filter(|p| player_passes(p, filters)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
