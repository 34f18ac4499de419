// Birthplace WAR map entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the dataset cache
// 4. Restore cached CSV datasets, falling back to the bundled JSON data
// 5. Print the ranked aggregation views and the validation report

use warmap::aggregate::RankingMetric;
use warmap::cache::{self, DatasetCache};
use warmap::config;
use warmap::ingest::{parse_players_csv, parse_population_csv};
use warmap::source;
use warmap::store::Store;

use anyhow::Context;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, keep stdout for the report)
    init_tracing()?;
    info!("warmap starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: players={}, populations={}",
        config.data.players_json, config.data.populations_json
    );

    // 3. Open the dataset cache
    let cache_path = match &config.cache_path {
        Some(path) => path.clone(),
        None => DatasetCache::default_path()
            .context("failed to resolve cache path")?
            .display()
            .to_string(),
    };
    let cache = DatasetCache::open(&cache_path).context("failed to open dataset cache")?;
    info!("Dataset cache opened at {}", cache_path);

    // 4. Populate the store
    let mut store = Store::new();
    store.filters.min_year = config.filters.min_year;
    store.filters.min_war = config.filters.min_war;

    let client = reqwest::Client::new();
    let seq = store.begin_load();

    let cached_players = cache.load(cache::PLAYERS_KEY)?;
    let cached_population = cache.load(cache::POPULATION_KEY)?;

    match (cached_players, cached_population) {
        (Some(players_text), Some(population_text)) => {
            info!("Restoring datasets from cache");
            store.apply_players(seq, parse_players_csv(&players_text));
            store.apply_populations(seq, parse_population_csv(&population_text));

            let international = source::fetch_text(&client, &config.data.international_json)
                .await
                .and_then(|text| {
                    warmap::ingest::international::parse_international_json(
                        &text,
                        &config.data.international_json,
                    )
                    .map_err(Into::into)
                });
            match international {
                Ok(records) => {
                    let batch = warmap::ingest::international::InternationalBatch {
                        summary: warmap::ingest::RowSummary {
                            row_count: records.len(),
                            accepted: records.len(),
                            rejected: 0,
                        },
                        records,
                    };
                    store.apply_international(seq, batch);
                }
                Err(e) => warn!("international dataset unavailable: {e}"),
            }
        }
        _ => {
            info!("No cached datasets, loading bundled data");
            match source::load_bundled(&client, &config.data).await {
                Ok(data) => {
                    store.apply_bundled(seq, data);
                }
                Err(e) => {
                    warn!("bundled load failed ({e}), falling back to sample CSVs");
                    let (players_text, population_text) =
                        source::fetch_sample_data(&client, &config.data)
                            .await
                            .context("failed to load sample datasets")?;
                    store.apply_players(seq, parse_players_csv(&players_text));
                    store.apply_populations(seq, parse_population_csv(&population_text));
                    cache.store(cache::PLAYERS_KEY, &players_text)?;
                    cache.store(cache::POPULATION_KEY, &population_text)?;
                }
            }
        }
    }

    // 5. Print the views
    print_report(&store);

    let validation = store.validation();
    info!(
        "Validation: players {}/{} accepted ({} missing state), populations {}/{} accepted",
        validation.players.accepted,
        validation.players.row_count,
        validation.players.missing_state,
        validation.populations.accepted,
        validation.populations.row_count,
    );

    info!("warmap done");
    Ok(())
}

fn print_report(store: &Store) {
    if let Some((min, max)) = store.year_extent() {
        println!("Birth years {min}-{max}\n");
    }

    println!("Total WAR by birth state");
    for (rank, agg) in store
        .domestic_aggregates(RankingMetric::TotalWar, None)
        .iter()
        .enumerate()
    {
        println!(
            "{:>3}. {:<22} {:>8.3} WAR  {:>4} players",
            rank + 1,
            agg.meta.name,
            agg.total_war,
            agg.player_count
        );
    }

    println!("\nWAR per million residents");
    for (rank, agg) in store
        .domestic_aggregates(RankingMetric::WarPerMillion, None)
        .iter()
        .enumerate()
    {
        let per_million = agg.war_per_million.unwrap_or_default();
        println!(
            "{:>3}. {:<22} {:>10.3} WAR/M",
            rank + 1,
            agg.meta.name,
            per_million
        );
    }

    let international = store.international_aggregates();
    if !international.is_empty() {
        println!("\nTotal WAR by birth country");
        for (rank, agg) in international.iter().enumerate() {
            println!(
                "{:>3}. {:<22} {:>8.3} WAR  avg {:>7.3}  {:>4} players",
                rank + 1,
                agg.country,
                agg.total_war,
                agg.average_war,
                agg.player_count
            );
        }
    }
}

/// Initialize tracing to log to a file so stdout stays clean for the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("warmap.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warmap=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
