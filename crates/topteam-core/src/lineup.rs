// Starting-XI selection.
//
// Deterministic: the same squad always yields the same captain, starters,
// bench, and score. Every sort is stable and descending by PPG, so players
// with equal PPG keep the order they have in the squad.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::player::{round1, Candidate, Position, PositionMap};
use crate::squad::{Squad, SquadRules};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Score multipliers applied on top of a starter's PPG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineupWeights {
    /// The captain scores `captain_multiplier * PPG` in total.
    pub captain_multiplier: f64,
    /// Each benched player contributes `bench_multiplier * PPG`.
    pub bench_multiplier: f64,
}

impl Default for LineupWeights {
    fn default() -> Self {
        LineupWeights {
            captain_multiplier: 2.0,
            bench_multiplier: 0.5,
        }
    }
}

/// Formation constraints for the starting eleven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineupRules {
    pub starters: usize,
    /// Players per position who start regardless of PPG.
    pub minimums: PositionMap<usize>,
}

impl LineupRules {
    /// One goalkeeper, at least three defenders, at least one forward.
    pub const FPL: LineupRules = LineupRules {
        starters: 11,
        minimums: PositionMap::new(1, 3, 0, 1),
    };
}

impl Default for LineupRules {
    fn default() -> Self {
        LineupRules::FPL
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LineupError {
    #[error("squad has {found} {position} players, expected {expected}")]
    IncompleteBucket {
        position: Position,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// Lineup
// ---------------------------------------------------------------------------

/// A squad split into starters and bench, with its weighted score.
#[derive(Debug, Clone)]
pub struct Lineup<'a> {
    /// Highest-PPG player in the whole squad.
    pub captain: &'a Candidate,
    pub starters: PositionMap<Vec<&'a Candidate>>,
    /// Benched goalkeeper first, then outfield players by descending PPG.
    pub bench: Vec<&'a Candidate>,
    /// Weighted score, rounded to one decimal place.
    pub points: f64,
    pub squad_cost_tenths: u32,
}

impl<'a> Lineup<'a> {
    pub fn starter_count(&self) -> usize {
        self.starters.values().map(Vec::len).sum()
    }

    /// Starters grouped GKP, DEF, MID, FWD.
    pub fn starters(&self) -> impl Iterator<Item = &'a Candidate> + '_ {
        self.starters.values().flat_map(|s| s.iter().copied())
    }

    pub fn squad_cost(&self) -> f64 {
        self.squad_cost_tenths as f64 / 10.0
    }
}

fn by_ppg_desc(a: &&Candidate, b: &&Candidate) -> Ordering {
    b.ppg.total_cmp(&a.ppg)
}

/// Sorted copy of one position bucket, best first.
fn ranked<'a>(squad: &Squad<'a>, pos: Position) -> Vec<&'a Candidate> {
    let mut players = squad.bucket(pos).to_vec();
    players.sort_by(by_ppg_desc);
    players
}

/// Pick the captain, starting eleven, and bench for a complete squad.
///
/// Forced starters are taken first (the best goalkeeper, the best three
/// defenders, the best forward). The remaining outfield players compete for
/// the open slots purely on PPG. Only one goalkeeper ever starts.
pub fn pick_lineup<'a>(
    squad: &Squad<'a>,
    squad_rules: &SquadRules,
    lineup_rules: &LineupRules,
    weights: &LineupWeights,
) -> Result<Lineup<'a>, LineupError> {
    for (position, &expected) in squad_rules.quotas.iter() {
        let found = squad.bucket(position).len();
        if found != expected || found < lineup_rules.minimums[position] {
            return Err(LineupError::IncompleteBucket {
                position,
                expected,
                found,
            });
        }
    }

    // First strictly greater PPG wins, so ties go to the earlier player.
    let mut players = squad.players();
    let Some(mut captain) = players.next() else {
        return Err(LineupError::IncompleteBucket {
            position: Position::Gkp,
            expected: squad_rules.quotas[Position::Gkp],
            found: 0,
        });
    };
    for p in players {
        if p.ppg > captain.ppg {
            captain = p;
        }
    }

    let mut points = (weights.captain_multiplier - 1.0) * captain.ppg;
    let mut starters: PositionMap<Vec<&'a Candidate>> = PositionMap::default();
    let mut bench = Vec::new();
    let mut contenders = Vec::new();

    // Goalkeepers: the best starts, the rest go straight to the bench.
    let keepers = ranked(squad, Position::Gkp);
    let (first_choice, reserves) = keepers.split_at(lineup_rules.minimums[Position::Gkp]);
    for &gk in first_choice {
        starters[Position::Gkp].push(gk);
        points += gk.ppg;
    }
    for &gk in reserves {
        bench.push(gk);
        points += weights.bench_multiplier * gk.ppg;
    }

    // Outfield minimums start; the leftovers contend for the open slots.
    for pos in [Position::Def, Position::Fwd, Position::Mid] {
        let mut ordered = ranked(squad, pos);
        let rest = ordered.split_off(lineup_rules.minimums[pos]);
        for p in ordered {
            starters[pos].push(p);
            points += p.ppg;
        }
        contenders.extend(rest);
    }

    // Pool order before the stable sort: DEF leftovers, FWD leftovers, MIDs.
    contenders.sort_by(by_ppg_desc);
    let open_slots = lineup_rules.starters.saturating_sub(
        starters.values().map(Vec::len).sum::<usize>(),
    );
    let benched = contenders.split_off(open_slots.min(contenders.len()));

    for p in contenders {
        starters[p.position].push(p);
        points += p.ppg;
    }
    for p in benched {
        bench.push(p);
        points += weights.bench_multiplier * p.ppg;
    }

    Ok(Lineup {
        captain,
        starters,
        bench,
        points: round1(points),
        squad_cost_tenths: squad.cost_tenths(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, position: Position, cost_tenths: u32, ppg: f64) -> Candidate {
        Candidate {
            id,
            name: format!("P{id}"),
            club: format!("C{id}"),
            position,
            cost_tenths,
            ppg,
            total_points: 0,
        }
    }

    /// Fifteen players with the given PPGs per position (2/5/5/3).
    fn squad_players(gkp: [f64; 2], def: [f64; 5], mid: [f64; 5], fwd: [f64; 3]) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut id = 0;
        let groups: [(Position, &[f64]); 4] = [
            (Position::Gkp, &gkp),
            (Position::Def, &def),
            (Position::Mid, &mid),
            (Position::Fwd, &fwd),
        ];
        for (pos, ppgs) in groups {
            for &ppg in ppgs {
                id += 1;
                out.push(player(id, pos, 50, ppg));
            }
        }
        out
    }

    fn build<'a>(players: &'a [Candidate]) -> Squad<'a> {
        let mut squad = Squad::new();
        for p in players {
            squad.try_accept(p, &SquadRules::FPL).unwrap();
        }
        squad
    }

    fn pick<'a>(squad: &Squad<'a>, weights: LineupWeights) -> Lineup<'a> {
        pick_lineup(squad, &SquadRules::FPL, &LineupRules::FPL, &weights).unwrap()
    }

    fn ids(players: &[&Candidate]) -> Vec<u32> {
        players.iter().map(|p| p.id).collect()
    }

    #[test]
    fn eleven_starters_four_bench() {
        let players = squad_players(
            [3.0, 5.0],
            [4.0, 3.5, 3.0, 2.6, 2.0],
            [6.0, 5.5, 5.0, 4.5, 4.0],
            [7.0, 3.0, 2.0],
        );
        let squad = build(&players);
        let lineup = pick(&squad, LineupWeights::default());

        assert_eq!(lineup.starter_count(), 11);
        assert_eq!(lineup.bench.len(), 4);
        assert_eq!(lineup.starters[Position::Gkp].len(), 1);
        assert!(lineup.starters[Position::Def].len() >= 3);
        assert!(lineup.starters[Position::Fwd].len() >= 1);

        let mut all: Vec<u32> = lineup.starters().map(|p| p.id).collect();
        all.extend(ids(&lineup.bench));
        all.sort_unstable();
        assert_eq!(all, (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn better_goalkeeper_starts_other_benched_at_half() {
        let mut players = squad_players(
            [3.0, 5.0],
            [1.0; 5],
            [1.0; 5],
            [1.0; 3],
        );
        players[0].cost_tenths = 40;
        players[1].cost_tenths = 45;
        let squad = build(&players);
        let weights = LineupWeights {
            captain_multiplier: 1.0,
            bench_multiplier: 0.5,
        };
        let lineup = pick(&squad, weights);

        assert_eq!(lineup.starters[Position::Gkp][0].ppg, 5.0);
        assert_eq!(lineup.bench[0].ppg, 3.0);
        // Starters: 5.0 + 10 * 1.0; bench: 0.5 * 3.0 + 3 * 0.5 * 1.0
        assert!((lineup.points - 18.0).abs() < 1e-9);
    }

    #[test]
    fn score_matches_hand_computation() {
        let players = squad_players(
            [3.0, 5.0],
            [4.0, 3.5, 3.0, 2.6, 2.0],
            [6.0, 5.5, 5.0, 4.5, 4.0],
            [7.0, 3.0, 2.0],
        );
        let squad = build(&players);
        let lineup = pick(&squad, LineupWeights::default());

        assert_eq!(lineup.captain.ppg, 7.0);
        // Forced: GK 5.0, DEF 4.0+3.5+3.0, FWD 7.0 = 22.5
        // Pool: DEF 2.6,2.0  FWD 3.0,2.0  MID 6,5.5,5,4.5,4
        // Top six: 6+5.5+5+4.5+4+3 = 28.0
        // Bench: GK 3.0, then 2.6, 2.0, 2.0 -> 0.5 * 9.6 = 4.8
        // Captain bonus: 7.0
        assert!((lineup.points - 62.3).abs() < 1e-9, "got {}", lineup.points);
        assert_eq!(lineup.starters[Position::Mid].len(), 5);
        assert_eq!(lineup.starters[Position::Fwd].len(), 2);
        assert_eq!(lineup.starters[Position::Def].len(), 3);
    }

    #[test]
    fn tied_score_rounds_to_even() {
        let players = squad_players([5.0, 4.5], [1.0; 5], [1.0; 5], [1.0; 3]);
        let squad = build(&players);
        let weights = LineupWeights {
            captain_multiplier: 1.5,
            bench_multiplier: 0.5,
        };
        // Bonus 2.5 + GK 5.0 + bench GK 2.25 + 10 starters + 3 * 0.5 = 21.25
        let lineup = pick(&squad, weights);
        assert_eq!(lineup.points, 21.2);
    }

    #[test]
    fn captain_is_squad_wide_maximum() {
        let players = squad_players(
            [9.0, 1.0],
            [2.0; 5],
            [3.0; 5],
            [4.0; 3],
        );
        let squad = build(&players);
        let lineup = pick(&squad, LineupWeights::default());
        assert_eq!(lineup.captain.position, Position::Gkp);
        for p in squad.players() {
            assert!(lineup.captain.ppg >= p.ppg);
        }
    }

    #[test]
    fn captain_ties_go_to_first_in_squad_order() {
        let players = squad_players(
            [1.0, 1.0],
            [6.0, 2.0, 2.0, 2.0, 2.0],
            [6.0, 2.0, 2.0, 2.0, 2.0],
            [2.0; 3],
        );
        let squad = build(&players);
        let lineup = pick(&squad, LineupWeights::default());
        assert_eq!(lineup.captain.position, Position::Def);
    }

    #[test]
    fn pool_ties_keep_def_fwd_mid_order() {
        // Every outfield leftover has the same PPG; the stable sort keeps
        // leftover defenders ahead of leftover forwards ahead of midfielders.
        let players = squad_players(
            [2.0, 1.0],
            [3.0, 3.0, 3.0, 3.0, 3.0],
            [3.0; 5],
            [3.0; 3],
        );
        let squad = build(&players);
        let lineup = pick(&squad, LineupWeights::default());
        assert_eq!(lineup.starters[Position::Def].len(), 5);
        assert_eq!(lineup.starters[Position::Fwd].len(), 3);
        assert_eq!(lineup.starters[Position::Mid].len(), 2);
        assert_eq!(ids(&lineup.bench), vec![2, 10, 11, 12]);
    }

    #[test]
    fn selection_is_idempotent() {
        let players = squad_players(
            [4.2, 4.1],
            [5.1, 3.3, 4.4, 2.2, 3.9],
            [6.6, 2.1, 5.5, 4.8, 3.0],
            [6.1, 5.9, 1.2],
        );
        let squad = build(&players);
        let a = pick(&squad, LineupWeights::default());
        let b = pick(&squad, LineupWeights::default());
        assert_eq!(a.captain.id, b.captain.id);
        assert_eq!(a.points, b.points);
        assert_eq!(ids(&a.bench), ids(&b.bench));
        let sa: Vec<_> = a.starters().map(|p| p.id).collect();
        let sb: Vec<_> = b.starters().map(|p| p.id).collect();
        assert_eq!(sa, sb);
    }

    #[test]
    fn higher_captain_multiplier_never_lowers_score() {
        let players = squad_players(
            [4.2, 4.1],
            [5.1, 3.3, 4.4, 2.2, 3.9],
            [6.6, 2.1, 5.5, 4.8, 3.0],
            [6.1, 5.9, 1.2],
        );
        let squad = build(&players);
        let mut last = f64::MIN;
        for m in [1.0, 1.5, 2.0, 3.0] {
            let lineup = pick(
                &squad,
                LineupWeights {
                    captain_multiplier: m,
                    bench_multiplier: 0.5,
                },
            );
            assert!(lineup.points >= last);
            last = lineup.points;
        }
    }

    #[test]
    fn incomplete_squad_is_an_error() {
        let players = squad_players([3.0, 5.0], [1.0; 5], [1.0; 5], [1.0; 3]);
        let mut squad = Squad::new();
        for p in players.iter().skip(1) {
            squad.try_accept(p, &SquadRules::FPL).unwrap();
        }
        let err = pick_lineup(
            &squad,
            &SquadRules::FPL,
            &LineupRules::FPL,
            &LineupWeights::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LineupError::IncompleteBucket {
                position: Position::Gkp,
                expected: 2,
                found: 1,
            }
        ));
    }

    #[test]
    fn squad_cost_is_carried() {
        let players = squad_players([1.0; 2], [1.0; 5], [1.0; 5], [1.0; 3]);
        let squad = build(&players);
        let lineup = pick(&squad, LineupWeights::default());
        assert_eq!(lineup.squad_cost_tenths, 750);
        assert!((lineup.squad_cost() - 75.0).abs() < 1e-9);
    }
}
