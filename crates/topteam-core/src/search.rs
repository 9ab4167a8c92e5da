// Search driver: repeated independent trials under a wall-clock budget.
//
// Each trial samples a fresh squad and, optionally, picks its starting XI.
// The best squad (by raw PPG) and the best lineup (by weighted score) seen
// across all trials are kept. Timeout and cancellation are checked before
// every trial and end the run cleanly with whatever has been found.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::lineup::{pick_lineup, Lineup, LineupError, LineupRules, LineupWeights};
use crate::player::{round1, Candidate};
use crate::sampler::{Sampler, SamplerError};
use crate::squad::{Squad, SquadError, SquadRules};

// ---------------------------------------------------------------------------
// Options / outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Upper bound on trials; the timeout may end the run sooner.
    pub trials: usize,
    pub timeout: Duration,
    pub weights: LineupWeights,
    /// When false only raw squads are scored.
    pub pick_lineup: bool,
    /// Fixed RNG seed for reproducible runs. Worker `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Number of worker threads. `1` runs on the calling thread.
    pub workers: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            trials: 10_000,
            timeout: Duration::from_secs(10),
            weights: LineupWeights::default(),
            pick_lineup: true,
            seed: None,
            workers: 1,
        }
    }
}

/// Best results of a search run.
///
/// `None` means no trial completed (e.g. a zero timeout), which is distinct
/// from a completed squad that happens to score zero.
#[derive(Debug, Clone)]
pub struct SearchOutcome<'a> {
    pub best_squad: Option<Squad<'a>>,
    pub best_lineup: Option<Lineup<'a>>,
    pub trials_run: usize,
    pub candidate_count: usize,
    pub elapsed: Duration,
    /// Whether the timeout or a cancellation ended the run before all
    /// requested trials were executed.
    pub stopped_early: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Lineup(#[from] LineupError),

    #[error("invalid pre-picked players: {0}")]
    PrePicked(#[from] SquadError),
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run the search over `pool`, starting every squad from `pre_picked`.
///
/// `cancel` is polled before each trial; setting it stops the run and
/// returns the best results so far. Sampler exhaustion and malformed
/// squads are fatal.
pub fn search<'a>(
    pool: &'a [Candidate],
    pre_picked: &'a [Candidate],
    rules: &SquadRules,
    options: &SearchOptions,
    cancel: &AtomicBool,
) -> Result<SearchOutcome<'a>, SearchError> {
    let start = Instant::now();
    let seed_squad = Squad::seeded(pre_picked, rules)?;
    let sampler = Sampler::new(pool, *rules);
    let workers = options.workers.max(1);

    info!(
        candidates = pool.len(),
        pre_picked = pre_picked.len(),
        trials = options.trials,
        timeout_secs = options.timeout.as_secs_f64(),
        workers,
        "starting squad search"
    );

    let ctx = TrialContext {
        sampler,
        seed: &seed_squad,
        rules: *rules,
        lineup_rules: LineupRules::FPL,
        options,
        start,
        cancel,
    };

    let best = if workers == 1 {
        let mut rng = worker_rng(options.seed, 0);
        ctx.run_batch(options.trials, &mut rng)?
    } else {
        run_parallel(&ctx, workers)?
    };

    let elapsed = start.elapsed();
    info!(
        trials_run = best.trials_run,
        elapsed_secs = elapsed.as_secs_f64(),
        best_squad_points = ?best.best_squad.as_ref().map(|s| s.points()),
        best_lineup_points = ?best.best_lineup.as_ref().map(|l| l.points),
        stopped_early = best.stopped_early,
        "squad search finished"
    );

    Ok(SearchOutcome {
        best_squad: best.best_squad,
        best_lineup: best.best_lineup,
        trials_run: best.trials_run,
        candidate_count: pool.len(),
        elapsed,
        stopped_early: best.stopped_early,
    })
}

fn worker_rng(seed: Option<u64>, worker: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Split `trials` across `workers`, the first batches taking the remainder.
fn batch_sizes(trials: usize, workers: usize) -> Vec<usize> {
    let base = trials / workers;
    let extra = trials % workers;
    (0..workers)
        .map(|w| base + usize::from(w < extra))
        .collect()
}

fn run_parallel<'a>(ctx: &TrialContext<'a, '_>, workers: usize) -> Result<Batch<'a>, SearchError> {
    let sizes = batch_sizes(ctx.options.trials, workers);
    let run = || {
        sizes
            .par_iter()
            .enumerate()
            .map(|(worker, &trials)| {
                let mut rng = worker_rng(ctx.options.seed, worker);
                ctx.run_batch(trials, &mut rng)
            })
            .collect::<Vec<_>>()
    };

    let results = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!("failed to build worker pool, using the global pool: {}", e);
            run()
        }
    };

    // Worker order is preserved, so ties go to the lower worker index.
    let mut merged = Batch::default();
    for result in results {
        merged.merge(result?);
    }
    Ok(merged)
}

// ---------------------------------------------------------------------------
// Trials
// ---------------------------------------------------------------------------

struct TrialContext<'a, 'r> {
    sampler: Sampler<'a>,
    seed: &'r Squad<'a>,
    rules: SquadRules,
    lineup_rules: LineupRules,
    options: &'r SearchOptions,
    start: Instant,
    cancel: &'r AtomicBool,
}

impl<'a> TrialContext<'a, '_> {
    fn should_stop(&self) -> bool {
        self.start.elapsed() >= self.options.timeout || self.cancel.load(Ordering::Relaxed)
    }

    fn run_batch<R: Rng>(&self, trials: usize, rng: &mut R) -> Result<Batch<'a>, SearchError> {
        let mut batch = Batch::default();

        for _ in 0..trials {
            if self.should_stop() {
                batch.stopped_early = true;
                break;
            }

            let squad = self.sampler.sample(self.seed, rng)?;
            batch.trials_run += 1;

            if self.options.pick_lineup {
                let lineup = pick_lineup(&squad, &self.rules, &self.lineup_rules, &self.options.weights)?;
                batch.offer_lineup(lineup);
            }
            batch.offer_squad(squad);
        }

        Ok(batch)
    }
}

/// Best-so-far results of one worker.
#[derive(Debug, Default)]
struct Batch<'a> {
    best_squad: Option<Squad<'a>>,
    best_lineup: Option<Lineup<'a>>,
    trials_run: usize,
    stopped_early: bool,
}

impl<'a> Batch<'a> {
    fn offer_squad(&mut self, squad: Squad<'a>) {
        let better = match &self.best_squad {
            Some(best) => round1(squad.points()) > round1(best.points()),
            None => true,
        };
        if better {
            debug!(points = squad.points(), cost = squad.cost(), "new best squad");
            self.best_squad = Some(squad);
        }
    }

    fn offer_lineup(&mut self, lineup: Lineup<'a>) {
        let better = match &self.best_lineup {
            Some(best) => lineup.points > best.points,
            None => true,
        };
        if better {
            debug!(points = lineup.points, captain = %lineup.captain.name, "new best lineup");
            self.best_lineup = Some(lineup);
        }
    }

    fn merge(&mut self, other: Batch<'a>) {
        self.trials_run += other.trials_run;
        self.stopped_early |= other.stopped_early;
        if let Some(squad) = other.best_squad {
            self.offer_squad(squad);
        }
        if let Some(lineup) = other.best_lineup {
            self.offer_lineup(lineup);
        }
    }
}
