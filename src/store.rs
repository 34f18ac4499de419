// Central dataset store: the single snapshot of parsed datasets plus the
// active filters. Aggregation views are pure functions of this snapshot and
// are recomputed from scratch on every query rather than cached.

use tracing::{info, warn};

use crate::aggregate::{
    self, aggregate_by_country, aggregate_by_state, rank_aggregates, CountryAggregate,
    CountryFilter, Filters, PopulationIndex, RankingMetric, StateAggregate,
};
use crate::ingest::{
    international::InternationalBatch, players::PlayerBatch, population::PopulationBatch,
    InternationalPlayerRecord, PlayerRecord, PlayerSummary, PopulationRecord, RowSummary,
    ValidationSummary,
};
use crate::source::BundledData;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Holds the current datasets and filter state.
///
/// Concurrent loads are serialized by a monotonic sequence number: each load
/// takes a ticket from [`Store::begin_load`], and a result is applied only if
/// its ticket is still the newest. Results from superseded loads are
/// discarded, so the snapshot never mixes rows from two different loads.
pub struct Store {
    players: Vec<PlayerRecord>,
    players_summary: PlayerSummary,
    populations: Vec<PopulationRecord>,
    population_index: PopulationIndex,
    population_summary: RowSummary,
    international: Vec<InternationalPlayerRecord>,
    international_summary: RowSummary,
    pub filters: Filters,
    pub country_filter: CountryFilter,
    load_seq: u64,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            players: Vec::new(),
            players_summary: PlayerSummary::default(),
            populations: Vec::new(),
            population_index: PopulationIndex::build(&[]),
            population_summary: RowSummary::default(),
            international: Vec::new(),
            international_summary: RowSummary::default(),
            filters: Filters::default(),
            country_filter: CountryFilter::default(),
            load_seq: 0,
        }
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // -- load sequencing ----------------------------------------------------

    /// Take a ticket for a new load. Any load holding an older ticket is
    /// superseded from this point on; its eventual result will be dropped.
    pub fn begin_load(&mut self) -> u64 {
        self.load_seq += 1;
        self.load_seq
    }

    fn is_current(&self, seq: u64) -> bool {
        if seq != self.load_seq {
            warn!(
                seq,
                current = self.load_seq,
                "discarding result from superseded load"
            );
            return false;
        }
        true
    }

    // -- dataset application ------------------------------------------------

    /// Install a parsed domestic player batch. Returns false (and changes
    /// nothing) when the ticket has been superseded.
    pub fn apply_players(&mut self, seq: u64, batch: PlayerBatch) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        info!(
            accepted = batch.summary.accepted,
            rejected = batch.summary.rejected,
            missing_state = batch.summary.missing_state,
            "player dataset installed"
        );
        self.players = batch.records;
        self.players_summary = batch.summary;
        self.refit_filters();
        true
    }

    /// Install a parsed population batch.
    pub fn apply_populations(&mut self, seq: u64, batch: PopulationBatch) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        info!(
            accepted = batch.summary.accepted,
            rejected = batch.summary.rejected,
            "population dataset installed"
        );
        self.population_index = PopulationIndex::build(&batch.records);
        self.populations = batch.records;
        self.population_summary = batch.summary;
        true
    }

    /// Install a parsed international player batch.
    pub fn apply_international(&mut self, seq: u64, batch: InternationalBatch) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        info!(
            accepted = batch.summary.accepted,
            rejected = batch.summary.rejected,
            "international dataset installed"
        );
        self.international = batch.records;
        self.international_summary = batch.summary;
        true
    }

    /// Install all three bundled datasets at once. JSON sources are trusted
    /// (already shaped), so the summaries record full acceptance.
    pub fn apply_bundled(&mut self, seq: u64, data: BundledData) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        self.players_summary = PlayerSummary {
            row_count: data.players.len(),
            accepted: data.players.len(),
            ..PlayerSummary::default()
        };
        self.population_summary = RowSummary {
            row_count: data.populations.len(),
            accepted: data.populations.len(),
            rejected: 0,
        };
        self.international_summary = RowSummary {
            row_count: data.international.len(),
            accepted: data.international.len(),
            rejected: 0,
        };
        self.players = data.players;
        self.population_index = PopulationIndex::build(&data.populations);
        self.populations = data.populations;
        self.international = data.international;
        self.refit_filters();
        true
    }

    /// Re-fit the year bounds to the freshly installed player set so the
    /// default view covers exactly the data on hand. An empty set reverts to
    /// the built-in bounds. WAR threshold and decade selection are left
    /// alone; they are user choices, not dataset properties.
    fn refit_filters(&mut self) {
        match aggregate::year_extent(&self.players) {
            Some((min, max)) => {
                self.filters.min_year = min;
                self.filters.max_year = max;
            }
            None => {
                let defaults = Filters::default();
                self.filters.min_year = defaults.min_year;
                self.filters.max_year = defaults.max_year;
            }
        }
    }

    // -- views --------------------------------------------------------------

    /// Domestic aggregation under the active filters, ranked by the requested
    /// metric. Recomputed from the snapshot on every call.
    pub fn domestic_aggregates(
        &self,
        metric: RankingMetric,
        decade_override: Option<i32>,
    ) -> Vec<StateAggregate> {
        let aggregates = aggregate_by_state(
            &self.players,
            &self.population_index,
            &self.filters,
            decade_override,
        );
        rank_aggregates(aggregates, metric)
    }

    /// International aggregation under the active country filter.
    pub fn international_aggregates(&self) -> Vec<CountryAggregate> {
        aggregate_by_country(&self.international, self.country_filter)
    }

    pub fn decades(&self) -> Vec<i32> {
        aggregate::list_decades(&self.players)
    }

    pub fn international_decades(&self) -> Vec<i32> {
        aggregate::international::list_decades(&self.international)
    }

    pub fn year_extent(&self) -> Option<(i32, i32)> {
        aggregate::year_extent(&self.players)
    }

    pub fn international_war_extent(&self) -> Option<(f64, f64)> {
        aggregate::international::war_extent(&self.international)
    }

    pub fn validation(&self) -> ValidationSummary {
        ValidationSummary {
            players: self.players_summary,
            populations: self.population_summary,
        }
    }

    pub fn international_summary(&self) -> RowSummary {
        self.international_summary
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn populations(&self) -> &[PopulationRecord] {
        &self.populations
    }

    pub fn international(&self) -> &[InternationalPlayerRecord] {
        &self.international
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{parse_players_csv, parse_population_csv};

    const PLAYERS_CSV: &str = "\
player_id,full_name,birth_state,birth_year,war_career
ruthba01,Babe Ruth,MD,1895,182.5
gehrilo01,Lou Gehrig,NY,1903,114.1
";

    const POP_CSV: &str = "\
state,year,population
NY,1900,7268894
MD,1900,1188044
";

    #[test]
    fn stale_load_is_discarded() {
        let mut store = Store::new();
        let old = store.begin_load();
        let new = store.begin_load();

        assert!(!store.apply_players(old, parse_players_csv(PLAYERS_CSV)));
        assert!(store.players().is_empty());

        assert!(store.apply_players(new, parse_players_csv(PLAYERS_CSV)));
        assert_eq!(store.players().len(), 2);
    }

    #[test]
    fn filters_fit_to_player_extent() {
        let mut store = Store::new();
        let seq = store.begin_load();
        store.apply_players(seq, parse_players_csv(PLAYERS_CSV));

        assert_eq!(store.filters.min_year, 1895);
        assert_eq!(store.filters.max_year, 1903);

        // Emptying the dataset reverts to the built-in bounds.
        let seq = store.begin_load();
        store.apply_players(seq, parse_players_csv("player_id,birth_year,war_career\n"));
        assert_eq!(store.filters.min_year, Filters::DEFAULT_MIN_YEAR);
    }

    #[test]
    fn refit_preserves_war_threshold() {
        let mut store = Store::new();
        store.filters.min_war = 50.0;
        let seq = store.begin_load();
        store.apply_players(seq, parse_players_csv(PLAYERS_CSV));
        assert_eq!(store.filters.min_war, 50.0);
    }

    #[test]
    fn domestic_view_reflects_snapshot() {
        let mut store = Store::new();
        let seq = store.begin_load();
        store.apply_players(seq, parse_players_csv(PLAYERS_CSV));
        store.apply_populations(seq, parse_population_csv(POP_CSV));

        let aggregates = store.domestic_aggregates(RankingMetric::TotalWar, None);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].meta.postal, "MD");
        assert!(aggregates[0].war_per_million.is_some());
    }

    #[test]
    fn validation_tracks_both_batches() {
        let mut store = Store::new();
        let seq = store.begin_load();
        store.apply_players(seq, parse_players_csv(PLAYERS_CSV));
        store.apply_populations(
            seq,
            parse_population_csv("state,year,population\nNY,1900,abc\n"),
        );

        let summary = store.validation();
        assert_eq!(summary.players.accepted, 2);
        assert_eq!(summary.populations.rejected, 1);
    }
}
