// Geography reference data and resolution.
//
// Canonical state metadata (name, postal code, FIPS) plus the country alias
// and map-feature tables. All tables are process-wide immutable constants;
// the lookup indexes are built once on first use.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

// ---------------------------------------------------------------------------
// State metadata
// ---------------------------------------------------------------------------

/// Canonical reference record for a U.S. state (or DC). The FIPS code is the
/// stable aggregation key; the postal code keys the population dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateMeta {
    pub name: &'static str,
    pub postal: &'static str,
    pub fips: &'static str,
}

/// The 50 states plus the District of Columbia.
pub const STATES: &[StateMeta] = &[
    StateMeta { name: "Alabama", postal: "AL", fips: "01" },
    StateMeta { name: "Alaska", postal: "AK", fips: "02" },
    StateMeta { name: "Arizona", postal: "AZ", fips: "04" },
    StateMeta { name: "Arkansas", postal: "AR", fips: "05" },
    StateMeta { name: "California", postal: "CA", fips: "06" },
    StateMeta { name: "Colorado", postal: "CO", fips: "08" },
    StateMeta { name: "Connecticut", postal: "CT", fips: "09" },
    StateMeta { name: "Delaware", postal: "DE", fips: "10" },
    StateMeta { name: "District of Columbia", postal: "DC", fips: "11" },
    StateMeta { name: "Florida", postal: "FL", fips: "12" },
    StateMeta { name: "Georgia", postal: "GA", fips: "13" },
    StateMeta { name: "Hawaii", postal: "HI", fips: "15" },
    StateMeta { name: "Idaho", postal: "ID", fips: "16" },
    StateMeta { name: "Illinois", postal: "IL", fips: "17" },
    StateMeta { name: "Indiana", postal: "IN", fips: "18" },
    StateMeta { name: "Iowa", postal: "IA", fips: "19" },
    StateMeta { name: "Kansas", postal: "KS", fips: "20" },
    StateMeta { name: "Kentucky", postal: "KY", fips: "21" },
    StateMeta { name: "Louisiana", postal: "LA", fips: "22" },
    StateMeta { name: "Maine", postal: "ME", fips: "23" },
    StateMeta { name: "Maryland", postal: "MD", fips: "24" },
    StateMeta { name: "Massachusetts", postal: "MA", fips: "25" },
    StateMeta { name: "Michigan", postal: "MI", fips: "26" },
    StateMeta { name: "Minnesota", postal: "MN", fips: "27" },
    StateMeta { name: "Mississippi", postal: "MS", fips: "28" },
    StateMeta { name: "Missouri", postal: "MO", fips: "29" },
    StateMeta { name: "Montana", postal: "MT", fips: "30" },
    StateMeta { name: "Nebraska", postal: "NE", fips: "31" },
    StateMeta { name: "Nevada", postal: "NV", fips: "32" },
    StateMeta { name: "New Hampshire", postal: "NH", fips: "33" },
    StateMeta { name: "New Jersey", postal: "NJ", fips: "34" },
    StateMeta { name: "New Mexico", postal: "NM", fips: "35" },
    StateMeta { name: "New York", postal: "NY", fips: "36" },
    StateMeta { name: "North Carolina", postal: "NC", fips: "37" },
    StateMeta { name: "North Dakota", postal: "ND", fips: "38" },
    StateMeta { name: "Ohio", postal: "OH", fips: "39" },
    StateMeta { name: "Oklahoma", postal: "OK", fips: "40" },
    StateMeta { name: "Oregon", postal: "OR", fips: "41" },
    StateMeta { name: "Pennsylvania", postal: "PA", fips: "42" },
    StateMeta { name: "Rhode Island", postal: "RI", fips: "44" },
    StateMeta { name: "South Carolina", postal: "SC", fips: "45" },
    StateMeta { name: "South Dakota", postal: "SD", fips: "46" },
    StateMeta { name: "Tennessee", postal: "TN", fips: "47" },
    StateMeta { name: "Texas", postal: "TX", fips: "48" },
    StateMeta { name: "Utah", postal: "UT", fips: "49" },
    StateMeta { name: "Vermont", postal: "VT", fips: "50" },
    StateMeta { name: "Virginia", postal: "VA", fips: "51" },
    StateMeta { name: "Washington", postal: "WA", fips: "53" },
    StateMeta { name: "West Virginia", postal: "WV", fips: "54" },
    StateMeta { name: "Wisconsin", postal: "WI", fips: "55" },
    StateMeta { name: "Wyoming", postal: "WY", fips: "56" },
];

struct StateIndex {
    by_postal: HashMap<String, &'static StateMeta>,
    by_name: HashMap<String, &'static StateMeta>,
}

fn state_index() -> &'static StateIndex {
    static INDEX: OnceLock<StateIndex> = OnceLock::new();
    INDEX.get_or_init(|| {
        let by_postal = STATES
            .iter()
            .map(|s| (s.postal.to_uppercase(), s))
            .collect();
        let by_name = STATES
            .iter()
            .map(|s| (s.name.to_lowercase(), s))
            .collect();
        StateIndex { by_postal, by_name }
    })
}

/// Resolve a free-text state identifier (postal code or full name) to its
/// canonical metadata. Postal codes take priority over names. Empty or
/// whitespace-only input is simply no match -- never an error.
pub fn find_state(value: &str) -> Option<&'static StateMeta> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let index = state_index();
    if let Some(meta) = index.by_postal.get(&trimmed.to_uppercase()) {
        return Some(meta);
    }
    index.by_name.get(&trimmed.to_lowercase()).copied()
}

// ---------------------------------------------------------------------------
// Country normalization
// ---------------------------------------------------------------------------

/// Known raw-variant aliases in the source data mapped to canonical country
/// names. Applied before any further country handling.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("USA", "United States"),
    ("CAN", "Canada"),
    ("D.R.", "Dominican Republic"),
    ("P.R.", "Puerto Rico"),
    ("V.I.", "U.S. Virgin Islands"),
];

/// Canonicalize a raw country string: trim, apply the alias table (exact
/// match first, then uppercased), otherwise pass the trimmed value through.
/// Returns `None` for empty input.
pub fn normalize_country(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let alias = COUNTRY_ALIASES
        .iter()
        .find(|(raw, _)| *raw == trimmed)
        .or_else(|| {
            let upper = trimmed.to_uppercase();
            COUNTRY_ALIASES.iter().find(|(raw, _)| *raw == upper)
        });
    Some(match alias {
        Some((_, canonical)) => (*canonical).to_string(),
        None => trimmed.to_string(),
    })
}

/// Returns true when the raw value designates the United States (such rows
/// belong to the domestic dataset, never the international one).
pub fn is_united_states(value: &str) -> bool {
    let normalized = value.trim().to_uppercase();
    normalized == "USA" || normalized == "UNITED STATES" || normalized == "U.S.A."
}

// ---------------------------------------------------------------------------
// Map feature names
// ---------------------------------------------------------------------------

/// Canonical country names whose world-map feature name differs, or which
/// have no shape in the world map dataset at all (`None`). Countries mapped
/// to `None` remain valid for tabular aggregation but are excluded from
/// choropleth coloring.
const COUNTRY_FEATURE_OVERRIDES: &[(&str, Option<&str>)] = &[
    ("Czech Republic", Some("Czechia")),
    ("Dominican Republic", Some("Dominican Rep.")),
    ("Viet Nam", Some("Vietnam")),
    ("Curacao", None),
    ("American Samoa", None),
    ("U.S. Virgin Islands", None),
    ("Guam", None),
    ("Aruba", None),
    ("Singapore", None),
    ("At Sea", None),
];

/// Map a canonical country name to the feature name used by the world map
/// dataset. `None` means the country has no display shape.
pub fn country_feature_name(country: &str) -> Option<&str> {
    for (name, feature) in COUNTRY_FEATURE_OVERRIDES {
        if *name == country {
            return *feature;
        }
    }
    Some(country)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_lookup_is_case_insensitive() {
        assert_eq!(find_state("CA").unwrap().fips, "06");
        assert_eq!(find_state("ca").unwrap().fips, "06");
        assert_eq!(find_state(" Ca ").unwrap().name, "California");
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(find_state("california").unwrap().postal, "CA");
        assert_eq!(find_state("NEW YORK").unwrap().fips, "36");
        assert_eq!(find_state("District of Columbia").unwrap().postal, "DC");
    }

    #[test]
    fn postal_takes_priority_over_name() {
        // No real collision exists in the reference set, but the postal index
        // must be consulted first.
        let meta = find_state("CA").unwrap();
        assert_eq!(meta.postal, "CA");
    }

    #[test]
    fn empty_and_whitespace_resolve_to_no_match() {
        assert!(find_state("").is_none());
        assert!(find_state("   ").is_none());
        assert!(find_state("Atlantis").is_none());
    }

    #[test]
    fn all_states_have_unique_keys() {
        let mut postals: Vec<&str> = STATES.iter().map(|s| s.postal).collect();
        let mut fips: Vec<&str> = STATES.iter().map(|s| s.fips).collect();
        postals.sort_unstable();
        postals.dedup();
        fips.sort_unstable();
        fips.dedup();
        assert_eq!(postals.len(), STATES.len());
        assert_eq!(fips.len(), STATES.len());
    }

    #[test]
    fn country_aliases_apply() {
        assert_eq!(normalize_country("USA").as_deref(), Some("United States"));
        assert_eq!(normalize_country("usa").as_deref(), Some("United States"));
        assert_eq!(
            normalize_country("D.R.").as_deref(),
            Some("Dominican Republic")
        );
        assert_eq!(normalize_country("P.R.").as_deref(), Some("Puerto Rico"));
    }

    #[test]
    fn unknown_countries_pass_through_trimmed() {
        assert_eq!(normalize_country("  Japan  ").as_deref(), Some("Japan"));
        assert_eq!(normalize_country(""), None);
        assert_eq!(normalize_country("   "), None);
    }

    #[test]
    fn united_states_detection() {
        assert!(is_united_states("USA"));
        assert!(is_united_states("united states"));
        assert!(is_united_states("U.S.A."));
        assert!(!is_united_states("Canada"));
    }

    #[test]
    fn feature_overrides_rename_and_suppress() {
        assert_eq!(country_feature_name("Czech Republic"), Some("Czechia"));
        assert_eq!(
            country_feature_name("Dominican Republic"),
            Some("Dominican Rep.")
        );
        assert_eq!(country_feature_name("Curacao"), None);
        assert_eq!(country_feature_name("Guam"), None);
        assert_eq!(country_feature_name("Japan"), Some("Japan"));
    }
}
