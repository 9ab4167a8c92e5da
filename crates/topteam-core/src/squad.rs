// Squad construction rules and the incrementally built 15-player squad.

use std::collections::HashMap;
use std::fmt;

use crate::player::{Candidate, Position, PositionMap};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Composition, budget, and quota constraints for a squad.
///
/// Costs are in tenths of the budget currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquadRules {
    /// Exact number of players per position.
    pub quotas: PositionMap<usize>,
    /// Hard cap on total squad cost.
    pub budget_tenths: u32,
    /// A sampling attempt is abandoned once the running cost exceeds this,
    /// before the remaining candidates run out with an unaffordable remainder.
    pub abort_above_tenths: u32,
    /// Maximum players from a single club.
    pub max_per_club: usize,
    /// Sampling attempts before the pool is declared unable to satisfy the rules.
    pub max_attempts: usize,
}

impl SquadRules {
    /// Fantasy Premier League rules: 2/5/5/3, 100.0 budget, 3 per club.
    pub const FPL: SquadRules = SquadRules {
        quotas: PositionMap::new(2, 5, 5, 3),
        budget_tenths: 1000,
        abort_above_tenths: 960,
        max_per_club: 3,
        max_attempts: 10_000,
    };

    /// Total number of players in a complete squad.
    pub fn squad_size(&self) -> usize {
        self.quotas.values().sum()
    }
}

impl Default for SquadRules {
    fn default() -> Self {
        SquadRules::FPL
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a candidate cannot join a squad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BucketFull,
    OverBudget,
    ClubQuota,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::BucketFull => "position already full",
            Rejection::OverBudget => "would exceed the budget",
            Rejection::ClubQuota => "club quota reached",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SquadError {
    #[error("pre-picked player {name} (id {id}) is listed more than once")]
    DuplicatePlayer { id: u32, name: String },

    #[error("pre-picked player {name} cannot be placed: {reason}")]
    Rejected { name: String, reason: Rejection },
}

// ---------------------------------------------------------------------------
// Squad
// ---------------------------------------------------------------------------

/// A squad under construction, borrowing its players from the candidate pool.
#[derive(Debug, Clone, Default)]
pub struct Squad<'a> {
    buckets: PositionMap<Vec<&'a Candidate>>,
    cost_tenths: u32,
    points: f64,
    club_counts: HashMap<&'a str, usize>,
    len: usize,
}

impl<'a> Squad<'a> {
    /// An empty squad.
    pub fn new() -> Self {
        Self::default()
    }

    /// A squad pre-loaded with players the caller wants locked in.
    ///
    /// The pre-picked players must be consistent with `rules` on their own;
    /// a duplicate or a player that breaks a quota or the budget is an error.
    pub fn seeded(pre_picked: &'a [Candidate], rules: &SquadRules) -> Result<Self, SquadError> {
        let mut squad = Squad::new();
        for player in pre_picked {
            if squad.contains(player.id) {
                return Err(SquadError::DuplicatePlayer {
                    id: player.id,
                    name: player.name.clone(),
                });
            }
            squad
                .try_accept(player, rules)
                .map_err(|reason| SquadError::Rejected {
                    name: player.name.clone(),
                    reason,
                })?;
        }
        Ok(squad)
    }

    /// Check whether `player` fits without violating any rule.
    pub fn can_accept(&self, player: &Candidate, rules: &SquadRules) -> Result<(), Rejection> {
        if self.buckets[player.position].len() >= rules.quotas[player.position] {
            return Err(Rejection::BucketFull);
        }
        if self.cost_tenths + player.cost_tenths > rules.budget_tenths {
            return Err(Rejection::OverBudget);
        }
        if self.club_count(&player.club) >= rules.max_per_club {
            return Err(Rejection::ClubQuota);
        }
        Ok(())
    }

    /// Add `player` if it fits, updating the running totals.
    pub fn try_accept(&mut self, player: &'a Candidate, rules: &SquadRules) -> Result<(), Rejection> {
        self.can_accept(player, rules)?;
        self.buckets[player.position].push(player);
        self.cost_tenths += player.cost_tenths;
        self.points += player.ppg;
        *self.club_counts.entry(player.club.as_str()).or_insert(0) += 1;
        self.len += 1;
        Ok(())
    }

    /// Whether every position bucket is filled to its quota.
    pub fn is_complete(&self, rules: &SquadRules) -> bool {
        Position::ALL
            .iter()
            .all(|&pos| self.buckets[pos].len() == rules.quotas[pos])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cost_tenths(&self) -> u32 {
        self.cost_tenths
    }

    /// Total cost in budget units.
    pub fn cost(&self) -> f64 {
        self.cost_tenths as f64 / 10.0
    }

    /// Sum of PPG over every player in the squad.
    pub fn points(&self) -> f64 {
        self.points
    }

    /// Players at one position, in the order they were added.
    pub fn bucket(&self, pos: Position) -> &[&'a Candidate] {
        &self.buckets[pos]
    }

    /// All players, grouped GKP, DEF, MID, FWD.
    pub fn players(&self) -> impl Iterator<Item = &'a Candidate> + '_ {
        self.buckets.values().flat_map(|bucket| bucket.iter().copied())
    }

    pub fn club_count(&self, club: &str) -> usize {
        self.club_counts.get(club).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.players().any(|p| p.id == id)
    }
}
