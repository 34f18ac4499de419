// Aggregation: filter policy, population lookup, and the domestic and
// international grouping engines. Everything here is a pure function of its
// inputs; aggregates are computed on demand and never persisted.

pub mod domestic;
pub mod filters;
pub mod international;
pub mod population;

pub use domestic::{aggregate_by_state, rank_aggregates, RankingMetric, StateAggregate};
pub use filters::{filter_players, player_passes, DecadeFilter, Filters};
pub use international::{aggregate_by_country, CountryAggregate, CountryFilter};
pub use population::{target_year, PopulationIndex};

use crate::ingest::PlayerRecord;

/// Distinct birth decades present in a domestic player set, ascending.
pub fn list_decades(players: &[PlayerRecord]) -> Vec<i32> {
    let mut decades: Vec<i32> = players.iter().map(|p| p.birth_decade).collect();
    decades.sort_unstable();
    decades.dedup();
    decades
}

/// Minimum and maximum birth year across a domestic player set, or `None`
/// when the set is empty.
pub fn year_extent(players: &[PlayerRecord]) -> Option<(i32, i32)> {
    let mut iter = players.iter().map(|p| p.birth_year);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), year| {
        (min.min(year), max.max(year))
    }))
}
