// Candidate-pool preparation: threshold filters, per-position truncation,
// and dominated-player pruning.
//
// Every step builds a new collection from the previous one; nothing is
// removed from a list while it is being iterated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use topteam_core::player::{Candidate, Position, PositionMap};
use topteam_core::squad::SquadRules;

/// A player as loaded from a data source, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlayer {
    pub candidate: Candidate,
    /// Fit to play next round.
    pub available: bool,
}

/// Filter settings applied when building the candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolFilter {
    /// Minimum season total points.
    pub points_minimum: i32,
    /// Minimum points per game.
    pub ppg_minimum: f64,
    /// Keep only the best N per position (by PPG, cheaper first on ties).
    /// `None` keeps everyone.
    pub best_per_position: Option<PositionMap<usize>>,
    /// Drop players flagged as doubtful or unavailable.
    pub require_available: bool,
    /// Drop players beaten on price and PPG by enough same-position peers.
    pub cut_dominated: bool,
}

impl Default for PoolFilter {
    fn default() -> Self {
        PoolFilter {
            points_minimum: 60,
            ppg_minimum: 0.0,
            best_per_position: Some(PositionMap::new(6, 15, 15, 9)),
            require_available: true,
            cut_dominated: true,
        }
    }
}

/// The filtered pool plus the players the user asked to lock in.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    pub candidates: Vec<Candidate>,
    pub pre_picked: Vec<Candidate>,
    /// Requested pre-pick names that matched no player.
    pub missing_prefill: Vec<String>,
}

/// Build the candidate pool from raw players.
///
/// Players named in `prefill_names` are diverted to `pre_picked` before any
/// filter runs, so a locked-in player is never filtered away. Duplicate ids
/// keep their first occurrence.
pub fn build_pool(raw: Vec<RawPlayer>, filter: &PoolFilter, prefill_names: &[String]) -> CandidatePool {
    let total = raw.len();
    let mut seen = HashSet::new();
    let mut pre_picked = Vec::new();
    let mut kept = Vec::new();

    for player in raw {
        if !seen.insert(player.candidate.id) {
            debug!(id = player.candidate.id, name = %player.candidate.name, "dropping duplicate id");
            continue;
        }
        if prefill_names.iter().any(|n| *n == player.candidate.name) {
            pre_picked.push(player.candidate);
            continue;
        }
        if passes_thresholds(&player, filter) {
            kept.push(player.candidate);
        }
    }

    let missing_prefill: Vec<String> = prefill_names
        .iter()
        .filter(|n| !pre_picked.iter().any(|p| &p.name == *n))
        .cloned()
        .collect();
    for name in &missing_prefill {
        warn!("pre-picked player '{}' not found in the player data", name);
    }

    let after_thresholds = kept.len();
    if let Some(limits) = &filter.best_per_position {
        kept = best_per_position(kept, limits);
    }
    let after_best = kept.len();
    if filter.cut_dominated {
        kept = cut_dominated(kept, &SquadRules::FPL.quotas);
    }

    info!(
        total,
        after_thresholds,
        after_best,
        candidates = kept.len(),
        pre_picked = pre_picked.len(),
        "candidate pool built"
    );

    CandidatePool {
        candidates: kept,
        pre_picked,
        missing_prefill,
    }
}

fn passes_thresholds(player: &RawPlayer, filter: &PoolFilter) -> bool {
    let c = &player.candidate;
    if c.total_points < filter.points_minimum || c.ppg < filter.ppg_minimum {
        return false;
    }
    !(filter.require_available && !player.available)
}

/// Keep the best `limits[pos]` players per position.
///
/// Ranking is by PPG descending; among equal PPG the cheaper player wins,
/// and equal price keeps the input order. Output is grouped GKP, DEF, MID, FWD.
pub fn best_per_position(players: Vec<Candidate>, limits: &PositionMap<usize>) -> Vec<Candidate> {
    let mut by_pos: PositionMap<Vec<Candidate>> = PositionMap::default();
    for p in players {
        by_pos[p.position].push(p);
    }

    let mut out = Vec::new();
    for pos in Position::ALL {
        let mut group = std::mem::take(&mut by_pos[pos]);
        group.sort_by_key(|c| c.cost_tenths);
        group.sort_by(|a, b| b.ppg.total_cmp(&a.ppg));
        group.truncate(limits[pos]);
        out.extend(group);
    }
    out
}

/// Drop dominated players.
///
/// A player is dominated when at least `quotas[pos]` other players at the
/// same position cost no more and have strictly higher PPG; such a player
/// could never improve on a squad built from those peers. Counts are taken
/// against the unpruned input. Input order is preserved.
pub fn cut_dominated(players: Vec<Candidate>, quotas: &PositionMap<usize>) -> Vec<Candidate> {
    let dominated: HashSet<u32> = players
        .iter()
        .filter(|p1| {
            let better = players
                .iter()
                .filter(|p2| {
                    p2.id != p1.id
                        && p2.position == p1.position
                        && p2.cost_tenths <= p1.cost_tenths
                        && p2.ppg > p1.ppg
                })
                .count();
            better >= quotas[p1.position]
        })
        .map(|p| p.id)
        .collect();

    players
        .into_iter()
        .filter(|p| !dominated.contains(&p.id))
        .collect()
}
