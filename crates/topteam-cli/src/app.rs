// Run pipeline: load player data, build the candidate pool, search, report.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use topteam_core::report::SearchReport;
use topteam_core::search::{search, SearchError, SearchOptions};
use topteam_core::squad::SquadRules;
use topteam_fpl::{bootstrap, build_pool, historical, CandidatePool, RawPlayer};

use crate::config::{Config, SourceConfig, SourceKind};

/// Load raw players from the configured source.
pub async fn load_players(source: &SourceConfig) -> anyhow::Result<Vec<RawPlayer>> {
    match source.kind {
        SourceKind::Api => {
            let body = bootstrap::fetch_bootstrap(&source.bootstrap_url).await?;
            Ok(bootstrap::parse_bootstrap(&body)?)
        }
        SourceKind::Csv => {
            let players = source
                .players_csv
                .as_deref()
                .context("source.players_csv is not set")?;
            let names = source
                .names_csv
                .as_deref()
                .context("source.names_csv is not set")?;
            info!("loading historical players from {}", players);
            Ok(historical::load_players(Path::new(players), Path::new(names))?)
        }
    }
}

/// Run the search on a blocking thread and detach the result from the pool.
pub async fn run_search(
    pool: CandidatePool,
    options: SearchOptions,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<SearchReport> {
    tokio::task::spawn_blocking(move || {
        let outcome = search(
            &pool.candidates,
            &pool.pre_picked,
            &SquadRules::FPL,
            &options,
            &cancel,
        )?;
        Ok::<_, SearchError>(SearchReport::from_outcome(&outcome, &options))
    })
    .await
    .context("search task failed to complete")?
    .context("search failed")
}

/// Full run: source → pool → search.
pub async fn run(config: &Config, cancel: Arc<AtomicBool>) -> anyhow::Result<SearchReport> {
    let raw = load_players(&config.source)
        .await
        .context("failed to load player data")?;
    info!("Loaded {} players", raw.len());

    let pool = build_pool(raw, &config.filter.pool_filter(), &config.search.prefill);
    let squad_size = SquadRules::FPL.squad_size();
    let available = pool.candidates.len() + pool.pre_picked.len();
    if available < squad_size {
        anyhow::bail!(
            "only {available} players survive filtering, a squad needs {squad_size}; \
             loosen the [filter] settings"
        );
    }

    run_search(pool, config.search.search_options(), cancel).await
}

/// A flag that flips when the process receives Ctrl+C.
pub fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping search");
            flag.store(true, Ordering::Relaxed);
        }
    });
    cancel
}
