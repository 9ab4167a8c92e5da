// Candidate players and the four squad positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Squad positions. Every candidate belongs to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Gkp,
    Def,
    Mid,
    Fwd,
}

impl Position {
    /// All positions in squad display order.
    pub const ALL: [Position; 4] = [Position::Gkp, Position::Def, Position::Mid, Position::Fwd];

    /// Dense index used by `PositionMap`.
    pub fn index(self) -> usize {
        match self {
            Position::Gkp => 0,
            Position::Def => 1,
            Position::Mid => 2,
            Position::Fwd => 3,
        }
    }

    /// Parse a position code.
    ///
    /// Accepts the short names used by the FPL API and the historical
    /// datasets (`GKP`/`GK`, `DEF`, `MID`, `FWD`) as well as the numeric
    /// element type codes `1..=4`. Managers (`MNG`, code 5) and anything
    /// else return `None`.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GKP" | "GK" | "1" => Some(Position::Gkp),
            "DEF" | "2" => Some(Position::Def),
            "MID" | "3" => Some(Position::Mid),
            "FWD" | "4" => Some(Position::Fwd),
            _ => None,
        }
    }

    pub fn display_str(self) -> &'static str {
        match self {
            Position::Gkp => "GKP",
            Position::Def => "DEF",
            Position::Mid => "MID",
            Position::Fwd => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// PositionMap
// ---------------------------------------------------------------------------

/// A fixed-size table with one entry per `Position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionMap<T>([T; 4]);

impl<T> PositionMap<T> {
    /// Build from values in `GKP, DEF, MID, FWD` order.
    pub const fn new(gkp: T, def: T, mid: T, fwd: T) -> Self {
        PositionMap([gkp, def, mid, fwd])
    }

    pub fn from_fn(mut f: impl FnMut(Position) -> T) -> Self {
        PositionMap(Position::ALL.map(&mut f))
    }

    /// Iterate `(position, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        Position::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl<T> Index<Position> for PositionMap<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        &self.0[pos.index()]
    }
}

impl<T> IndexMut<Position> for PositionMap<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        &mut self.0[pos.index()]
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A player eligible for squad selection.
///
/// Cost is held in integer tenths of the budget currency (the FPL API's
/// `now_cost` unit) so the budget arithmetic is exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
    /// Club short name; drives the per-club quota.
    pub club: String,
    pub position: Position,
    pub cost_tenths: u32,
    /// Points per game, the scoring basis for every trial.
    pub ppg: f64,
    /// Season total, only consulted by upstream filtering.
    pub total_points: i32,
}

impl Candidate {
    /// Cost in budget units (e.g. `5.5`).
    pub fn cost(&self) -> f64 {
        self.cost_tenths as f64 / 10.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.ppg)
    }
}

/// Round to one decimal place, the precision every reported score uses.
///
/// Exact ties go to the even digit (`21.25` becomes `21.2`). A value whose
/// binary form sits just off a tie, like `0.15`, rounds toward the side it
/// actually lies on.
pub fn round1(value: f64) -> f64 {
    let scaled = value * 10.0;
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        // The product landed on a tie; its rounding error says which side
        // the exact value is on.
        let residual = value.mul_add(10.0, -scaled);
        if residual > 0.0 {
            scaled.ceil()
        } else if residual < 0.0 {
            scaled.floor()
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    rounded / 10.0
}
