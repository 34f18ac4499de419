// Nearest-year population lookup.
//
// Built once per population dataset version and reused across queries; the
// store rebuilds it whenever the dataset is replaced.

use std::collections::HashMap;

use crate::aggregate::filters::{DecadeFilter, Filters};
use crate::ingest::PopulationRecord;

/// Per-state population time series indexed for nearest-year resolution.
#[derive(Debug, Clone, Default)]
pub struct PopulationIndex {
    by_state: HashMap<String, Vec<PopulationRecord>>,
}

impl PopulationIndex {
    /// Group population rows by state postal code into ascending-year
    /// sequences. Input ordering is not trusted; each sequence is re-sorted.
    pub fn build(populations: &[PopulationRecord]) -> Self {
        let mut by_state: HashMap<String, Vec<PopulationRecord>> = HashMap::new();
        for record in populations {
            by_state
                .entry(record.state.clone())
                .or_default()
                .push(record.clone());
        }
        for series in by_state.values_mut() {
            series.sort_by_key(|r| r.year);
        }
        Self { by_state }
    }

    /// Population figure from the closest available year for a state, or
    /// `None` when the state has no recorded rows. Ties in absolute distance
    /// go to the earlier year (the first candidate in ascending order).
    pub fn closest(&self, state_postal: &str, target_year: i32) -> Option<u64> {
        let series = self.by_state.get(state_postal)?;
        let mut best = series.first()?;
        let mut best_diff = (best.year - target_year).abs();
        for candidate in &series[1..] {
            let diff = (candidate.year - target_year).abs();
            if diff < best_diff {
                best = candidate;
                best_diff = diff;
            }
        }
        Some(best.population)
    }
}

/// Derive the target year for a population lookup: the decade midpoint when
/// aggregating a specific decade, otherwise the rounded midpoint of the
/// active year range.
pub fn target_year(filters: &Filters, decade_override: Option<i32>) -> i32 {
    match decade_override {
        Some(decade) => decade + 5,
        None => {
            let midpoint = (filters.min_year as f64 + filters.max_year as f64) / 2.0;
            midpoint.round() as i32
        }
    }
}

/// Convenience: the decade override implied by a filter's own selection.
pub fn decade_from_filter(decade: DecadeFilter) -> Option<i32> {
    match decade {
        DecadeFilter::All => None,
        DecadeFilter::Only(d) => Some(d),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, year: i32, population: u64) -> PopulationRecord {
        PopulationRecord {
            state: state.to_string(),
            year,
            population,
        }
    }

    #[test]
    fn nearest_year_by_absolute_distance() {
        let index = PopulationIndex::build(&[
            record("CA", 1950, 10_000_000),
            record("CA", 1970, 20_000_000),
        ]);

        // Distance 5 vs 15.
        assert_eq!(index.closest("CA", 1955), Some(10_000_000));
        assert_eq!(index.closest("CA", 1965), Some(20_000_000));
        assert_eq!(index.closest("CA", 1940), Some(10_000_000));
        assert_eq!(index.closest("CA", 1990), Some(20_000_000));
    }

    #[test]
    fn tie_goes_to_earlier_year() {
        let index = PopulationIndex::build(&[
            record("CA", 1950, 10_000_000),
            record("CA", 1970, 20_000_000),
        ]);

        // 1960 is equidistant; the ascending scan keeps the first candidate.
        assert_eq!(index.closest("CA", 1960), Some(10_000_000));
    }

    #[test]
    fn missing_state_is_none() {
        let index = PopulationIndex::build(&[record("CA", 1950, 10_000_000)]);
        assert_eq!(index.closest("NY", 1950), None);
        assert_eq!(PopulationIndex::build(&[]).closest("CA", 1950), None);
    }

    #[test]
    fn unsorted_input_is_resorted() {
        let index = PopulationIndex::build(&[
            record("CA", 1970, 20_000_000),
            record("CA", 1950, 10_000_000),
        ]);
        assert_eq!(index.closest("CA", 1955), Some(10_000_000));
    }

    #[test]
    fn target_year_decade_midpoint() {
        let filters = Filters {
            min_year: 1900,
            max_year: 2000,
            min_war: 0.0,
            decade: DecadeFilter::All,
            league: None,
        };
        assert_eq!(target_year(&filters, Some(1950)), 1955);
        assert_eq!(target_year(&filters, None), 1950);
    }

    #[test]
    fn target_year_rounds_midpoint() {
        let filters = Filters {
            min_year: 1901,
            max_year: 2000,
            min_war: 0.0,
            decade: DecadeFilter::All,
            league: None,
        };
        // (1901 + 2000) / 2 = 1950.5 -> 1951.
        assert_eq!(target_year(&filters, None), 1951);
    }
}
