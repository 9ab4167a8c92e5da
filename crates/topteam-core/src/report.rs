// Owned, serializable result record handed to the output layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lineup::Lineup;
use crate::player::{round1, Candidate, Position, PositionMap};
use crate::search::{SearchOptions, SearchOutcome};
use crate::squad::Squad;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub id: u32,
    pub name: String,
    pub club: String,
    pub position: Position,
    pub cost: f64,
    pub ppg: f64,
}

impl From<&Candidate> for PlayerReport {
    fn from(c: &Candidate) -> Self {
        PlayerReport {
            id: c.id,
            name: c.name.clone(),
            club: c.club.clone(),
            position: c.position,
            cost: c.cost(),
            ppg: c.ppg,
        }
    }
}

/// Players listed per position, serialized as `{"GKP": [...], ...}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionGroups {
    #[serde(rename = "GKP")]
    pub gkp: Vec<PlayerReport>,
    #[serde(rename = "DEF")]
    pub def: Vec<PlayerReport>,
    #[serde(rename = "MID")]
    pub mid: Vec<PlayerReport>,
    #[serde(rename = "FWD")]
    pub fwd: Vec<PlayerReport>,
}

impl PositionGroups {
    fn from_map(map: &PositionMap<Vec<&Candidate>>) -> Self {
        let list = |pos: Position| -> Vec<PlayerReport> {
            map[pos].iter().map(|&c| PlayerReport::from(c)).collect()
        };
        PositionGroups {
            gkp: list(Position::Gkp),
            def: list(Position::Def),
            mid: list(Position::Mid),
            fwd: list(Position::Fwd),
        }
    }

    pub fn get(&self, pos: Position) -> &[PlayerReport] {
        match pos {
            Position::Gkp => &self.gkp,
            Position::Def => &self.def,
            Position::Mid => &self.mid,
            Position::Fwd => &self.fwd,
        }
    }

    pub fn len(&self) -> usize {
        self.gkp.len() + self.def.len() + self.mid.len() + self.fwd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadReport {
    pub players: PositionGroups,
    pub cost: f64,
    pub points: f64,
}

impl From<&Squad<'_>> for SquadReport {
    fn from(squad: &Squad<'_>) -> Self {
        let buckets = PositionMap::from_fn(|pos| squad.bucket(pos).to_vec());
        SquadReport {
            players: PositionGroups::from_map(&buckets),
            cost: round1(squad.cost()),
            points: round1(squad.points()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupReport {
    pub captain: PlayerReport,
    pub starters: PositionGroups,
    pub bench: Vec<PlayerReport>,
    pub points: f64,
    pub cost: f64,
}

impl From<&Lineup<'_>> for LineupReport {
    fn from(lineup: &Lineup<'_>) -> Self {
        LineupReport {
            captain: PlayerReport::from(lineup.captain),
            starters: PositionGroups::from_map(&lineup.starters),
            bench: lineup.bench.iter().map(|&c| PlayerReport::from(c)).collect(),
            points: lineup.points,
            cost: round1(lineup.squad_cost()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub trials_requested: usize,
    pub trials_run: usize,
    pub stopped_early: bool,
    pub player_count: usize,
    /// Wall-clock seconds, two decimal places.
    pub runtime_secs: f64,
    pub generated_at: DateTime<Utc>,
}

/// Everything a run produced, detached from the candidate pool's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub squad: Option<SquadReport>,
    pub lineup: Option<LineupReport>,
    pub run: RunReport,
}

impl SearchReport {
    pub fn from_outcome(outcome: &SearchOutcome<'_>, options: &SearchOptions) -> Self {
        SearchReport {
            squad: outcome.best_squad.as_ref().map(SquadReport::from),
            lineup: outcome.best_lineup.as_ref().map(LineupReport::from),
            run: RunReport {
                trials_requested: options.trials,
                trials_run: outcome.trials_run,
                stopped_early: outcome.stopped_early,
                player_count: outcome.candidate_count,
                runtime_secs: (outcome.elapsed.as_secs_f64() * 100.0).round() / 100.0,
                generated_at: Utc::now(),
            },
        }
    }

    /// Whether any trial completed.
    pub fn found_squad(&self) -> bool {
        self.squad.is_some()
    }
}
