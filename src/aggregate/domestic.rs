// Domestic (state-level) aggregation engine.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::filters::{filter_players, DecadeFilter, Filters};
use crate::aggregate::population::{decade_from_filter, target_year, PopulationIndex};
use crate::geo::{self, StateMeta};
use crate::ingest::{round_war, PlayerRecord};

// ---------------------------------------------------------------------------
// Aggregate type
// ---------------------------------------------------------------------------

/// Per-state aggregate produced freshly on every query. `war_per_million`
/// is `None` whenever no usable population figure exists -- never zero or
/// infinite.
#[derive(Debug, Clone, Serialize)]
pub struct StateAggregate {
    pub meta: &'static StateMeta,
    pub total_war: f64,
    pub player_count: usize,
    pub war_per_million: Option<f64>,
    pub players: Vec<PlayerRecord>,
}

/// Ranking metric for the domestic view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMetric {
    TotalWar,
    WarPerMillion,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group filtered players by resolved state FIPS code and compute per-state
/// totals, counts, and the per-capita metric.
///
/// `decade_override` selects the decade for this query independently of the
/// filter's own stored selection; `None` means "use the filter as given".
/// Accumulation runs at full floating-point precision; totals are rounded
/// to three decimals only on the way out. The result is sorted by total WAR
/// descending.
pub fn aggregate_by_state(
    players: &[PlayerRecord],
    population: &PopulationIndex,
    filters: &Filters,
    decade_override: Option<i32>,
) -> Vec<StateAggregate> {
    let effective = match decade_override {
        Some(decade) => filters.with_decade(DecadeFilter::Only(decade)),
        None => filters.clone(),
    };
    let filtered = filter_players(players, &effective);
    let effective_decade = decade_override.or(decade_from_filter(filters.decade));
    let lookup_year = target_year(filters, effective_decade);

    let mut groups: HashMap<&'static str, (f64, Vec<PlayerRecord>, &'static StateMeta)> =
        HashMap::new();

    for player in filtered {
        // The filter already required resolvability; this lookup cannot
        // miss for a surviving record.
        let Some(meta) = geo::find_state(&player.birth_state_raw) else {
            continue;
        };
        let entry = groups.entry(meta.fips).or_insert((0.0, Vec::new(), meta));
        entry.0 += player.war_career;
        entry.1.push(player.clone());
    }

    let mut aggregates: Vec<StateAggregate> = groups
        .into_values()
        .map(|(total, mut members, meta)| {
            sort_players(&mut members);
            let war_per_million = population
                .closest(meta.postal, lookup_year)
                .filter(|pop| *pop > 0)
                .map(|pop| total / (pop as f64 / 1_000_000.0));
            StateAggregate {
                meta,
                total_war: round_war(total),
                player_count: members.len(),
                war_per_million,
                players: members,
            }
        })
        .collect();

    aggregates.sort_by(|a, b| {
        b.total_war
            .partial_cmp(&a.total_war)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    aggregates
}

/// Re-rank aggregates for the requested metric. The per-capita view drops
/// states with no population match before sorting; the total-WAR view keeps
/// them (with a null metric).
pub fn rank_aggregates(
    mut aggregates: Vec<StateAggregate>,
    metric: RankingMetric,
) -> Vec<StateAggregate> {
    match metric {
        RankingMetric::TotalWar => aggregates,
        RankingMetric::WarPerMillion => {
            aggregates.retain(|a| a.war_per_million.is_some());
            aggregates.sort_by(|a, b| {
                b.war_per_million
                    .partial_cmp(&a.war_per_million)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            aggregates
        }
    }
}

/// Within-group ordering: WAR descending, then player id ascending so equal
/// WAR values rank reproducibly.
fn sort_players(players: &mut [PlayerRecord]) {
    players.sort_by(|a, b| {
        b.war_career
            .partial_cmp(&a.war_career)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{birth_decade, PopulationRecord};

    fn player(id: &str, state: &str, year: i32, war: f64) -> PlayerRecord {
        PlayerRecord {
            player_id: id.to_string(),
            full_name: id.to_string(),
            birth_year: year,
            birth_state_raw: state.to_string(),
            war_career: war,
            birth_decade: birth_decade(year),
        }
    }

    fn pop(state: &str, year: i32, population: u64) -> PopulationRecord {
        PopulationRecord {
            state: state.to_string(),
            year,
            population,
        }
    }

    fn open_filters() -> Filters {
        Filters {
            min_year: 1900,
            max_year: 2000,
            min_war: -100.0,
            decade: DecadeFilter::All,
            league: None,
        }
    }

    #[test]
    fn two_players_one_state() {
        let players = vec![
            player("a", "CA", 1950, 10.0),
            player("b", "CA", 1965, -2.0),
        ];
        let index = PopulationIndex::build(&[]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        assert_eq!(aggs.len(), 1);

        let ca = &aggs[0];
        assert_eq!(ca.meta.postal, "CA");
        assert!((ca.total_war - 8.0).abs() < 1e-9);
        assert_eq!(ca.player_count, 2);
        assert_eq!(ca.players[0].player_id, "a");
        assert_eq!(ca.players[1].player_id, "b");
        assert!(ca.war_per_million.is_none());
    }

    #[test]
    fn total_equals_sum_of_grouped_players() {
        let players = vec![
            player("a", "CA", 1950, 10.5),
            player("b", "CA", 1951, 3.25),
            player("c", "NY", 1952, 7.0),
            player("d", "Narnia", 1953, 100.0), // unresolvable, excluded
        ];
        let index = PopulationIndex::build(&[]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        assert_eq!(aggs.len(), 2);

        let ca = aggs.iter().find(|a| a.meta.postal == "CA").unwrap();
        let expected: f64 = ca.players.iter().map(|p| p.war_career).sum();
        assert!((ca.total_war - round_war(expected)).abs() < 1e-9);
        assert!((ca.total_war - 13.75).abs() < 1e-9);
    }

    #[test]
    fn sorted_by_total_war_descending() {
        let players = vec![
            player("a", "CA", 1950, 5.0),
            player("b", "NY", 1950, 50.0),
            player("c", "TX", 1950, 20.0),
        ];
        let index = PopulationIndex::build(&[]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        let order: Vec<&str> = aggs.iter().map(|a| a.meta.postal).collect();
        assert_eq!(order, vec!["NY", "TX", "CA"]);
    }

    #[test]
    fn per_million_uses_nearest_year() {
        let players = vec![player("a", "CA", 1950, 10.0)];
        let index = PopulationIndex::build(&[
            pop("CA", 1950, 10_000_000),
            pop("CA", 1970, 20_000_000),
        ]);

        // Year range 1900..2000 -> midpoint 1950 -> population 10M -> 1.0/M.
        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        let per_million = aggs[0].war_per_million.unwrap();
        assert!((per_million - 1.0).abs() < 1e-9);
    }

    #[test]
    fn decade_override_filters_and_targets_midpoint() {
        let players = vec![
            player("a", "CA", 1950, 10.0),
            player("b", "CA", 1965, 20.0),
        ];
        let index = PopulationIndex::build(&[
            pop("CA", 1955, 10_000_000),
            pop("CA", 1995, 40_000_000),
        ]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), Some(1950));
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].player_count, 1);
        assert!((aggs[0].total_war - 10.0).abs() < 1e-9);
        // Target year 1955 matches the 10M row exactly.
        assert!((aggs[0].war_per_million.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn decade_override_does_not_mutate_filters() {
        let players = vec![player("a", "CA", 1950, 10.0)];
        let index = PopulationIndex::build(&[]);
        let filters = open_filters();

        let _ = aggregate_by_state(&players, &index, &filters, Some(1950));
        assert_eq!(filters.decade, DecadeFilter::All);
    }

    #[test]
    fn zero_population_is_null_metric() {
        let players = vec![player("a", "CA", 1950, 10.0)];
        let index = PopulationIndex::build(&[pop("CA", 1950, 0)]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        assert!(aggs[0].war_per_million.is_none());
    }

    #[test]
    fn per_capita_ranking_drops_null_metrics() {
        let players = vec![
            player("a", "CA", 1950, 30.0),
            player("b", "NY", 1950, 20.0),
            player("c", "TX", 1950, 10.0),
        ];
        // No population data for NY.
        let index = PopulationIndex::build(&[
            pop("CA", 1950, 30_000_000),
            pop("TX", 1950, 2_000_000),
        ]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        assert_eq!(aggs.len(), 3);

        let ranked = rank_aggregates(aggs, RankingMetric::WarPerMillion);
        let order: Vec<&str> = ranked.iter().map(|a| a.meta.postal).collect();
        // TX: 10/2M = 5.0/M beats CA: 30/30M = 1.0/M; NY dropped.
        assert_eq!(order, vec!["TX", "CA"]);
    }

    #[test]
    fn equal_war_players_sorted_by_id() {
        let players = vec![
            player("zz", "CA", 1950, 10.0),
            player("aa", "CA", 1951, 10.0),
            player("mm", "CA", 1952, 10.0),
        ];
        let index = PopulationIndex::build(&[]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        let order: Vec<&str> = aggs[0].players.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(order, vec!["aa", "mm", "zz"]);
    }

    #[test]
    fn totals_rounded_to_three_decimals() {
        let players = vec![
            player("a", "CA", 1950, 1.0001),
            player("b", "CA", 1951, 2.0001),
        ];
        let index = PopulationIndex::build(&[]);

        let aggs = aggregate_by_state(&players, &index, &open_filters(), None);
        assert_eq!(aggs[0].total_war, 3.0);
    }
}
