// International (country-level) aggregation engine.
//
// Same grouping shape as the domestic engine, keyed by canonical country
// name, with an average-WAR column and a defined tie-break: equal totals
// order by country name ascending.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::filters::DecadeFilter;
use crate::ingest::{round_war, InternationalPlayerRecord};

// ---------------------------------------------------------------------------
// Aggregate type
// ---------------------------------------------------------------------------

/// Per-country aggregate produced freshly on every query.
#[derive(Debug, Clone, Serialize)]
pub struct CountryAggregate {
    pub country: String,
    pub total_war: f64,
    pub player_count: usize,
    pub average_war: f64,
    pub players: Vec<InternationalPlayerRecord>,
}

/// Filter inputs for the international view: a minimum career WAR and an
/// optional decade constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryFilter {
    pub min_war: f64,
    pub decade: DecadeFilter,
}

impl Default for CountryFilter {
    fn default() -> Self {
        CountryFilter {
            min_war: 0.0,
            decade: DecadeFilter::All,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group filtered international players by birth country. Totals and
/// averages are accumulated at full precision and rounded to three decimals
/// on the way out. Sorted by total WAR descending, ties broken by country
/// name ascending.
pub fn aggregate_by_country(
    players: &[InternationalPlayerRecord],
    filter: CountryFilter,
) -> Vec<CountryAggregate> {
    let mut groups: HashMap<&str, Vec<InternationalPlayerRecord>> = HashMap::new();

    for player in players {
        if player.war_career < filter.min_war {
            continue;
        }
        if !filter.decade.matches(player.birth_decade) {
            continue;
        }
        groups
            .entry(player.birth_country.as_str())
            .or_default()
            .push(player.clone());
    }

    let mut aggregates: Vec<CountryAggregate> = groups
        .into_iter()
        .map(|(country, mut members)| {
            members.sort_by(|a, b| {
                b.war_career
                    .partial_cmp(&a.war_career)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.player_id.cmp(&b.player_id))
            });
            let total: f64 = members.iter().map(|p| p.war_career).sum();
            let average = total / members.len() as f64;
            CountryAggregate {
                country: country.to_string(),
                total_war: round_war(total),
                player_count: members.len(),
                average_war: round_war(average),
                players: members,
            }
        })
        .collect();

    aggregates.sort_by(|a, b| {
        b.total_war
            .partial_cmp(&a.total_war)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.country.cmp(&b.country))
    });
    aggregates
}

/// Distinct birth decades present in an international player set, ascending.
pub fn list_decades(players: &[InternationalPlayerRecord]) -> Vec<i32> {
    let mut decades: Vec<i32> = players.iter().map(|p| p.birth_decade).collect();
    decades.sort_unstable();
    decades.dedup();
    decades
}

/// Minimum and maximum career WAR across a player set, or `None` when the
/// set is empty.
pub fn war_extent(players: &[InternationalPlayerRecord]) -> Option<(f64, f64)> {
    let mut iter = players.iter().map(|p| p.war_career);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), war| {
        (min.min(war), max.max(war))
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
