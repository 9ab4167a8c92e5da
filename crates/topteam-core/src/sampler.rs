// Random squad sampler.
//
// Builds one complete squad by drawing candidates uniformly at random,
// without replacement, and keeping every draw that still fits the rules.
// A dead end (running cost past the abort threshold, or no candidates left)
// throws the attempt away and starts again from the seed state.

use rand::Rng;
use tracing::debug;

use crate::player::Candidate;
use crate::squad::{Squad, SquadRules};

#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error(
        "no valid squad found after {attempts} attempts; \
         the candidate pool cannot satisfy the budget and quota rules"
    )]
    Exhausted { attempts: usize },
}

/// Draws random valid squads from a fixed candidate pool.
#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a> {
    pool: &'a [Candidate],
    rules: SquadRules,
}

impl<'a> Sampler<'a> {
    pub fn new(pool: &'a [Candidate], rules: SquadRules) -> Self {
        Sampler { pool, rules }
    }

    pub fn pool(&self) -> &'a [Candidate] {
        self.pool
    }

    /// Build one complete squad starting from `seed`.
    ///
    /// Retries from scratch on every dead end, up to `rules.max_attempts`
    /// times. Running out of attempts means the pool cannot support the
    /// rules and is reported as an error rather than a partial squad.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        seed: &Squad<'a>,
        rng: &mut R,
    ) -> Result<Squad<'a>, SamplerError> {
        for attempt in 1..=self.rules.max_attempts {
            if let Some(squad) = self.attempt(seed, rng) {
                debug!(attempt, points = squad.points(), "sampled squad");
                return Ok(squad);
            }
        }
        Err(SamplerError::Exhausted {
            attempts: self.rules.max_attempts,
        })
    }

    /// One pass over a fresh copy of the pool. `None` on a dead end.
    pub fn attempt<R: Rng + ?Sized>(&self, seed: &Squad<'a>, rng: &mut R) -> Option<Squad<'a>> {
        let mut squad = seed.clone();
        let mut remaining: Vec<&'a Candidate> = self
            .pool
            .iter()
            .filter(|c| !seed.contains(c.id))
            .collect();
        let target = self.rules.squad_size();

        while squad.len() < target {
            if squad.cost_tenths() > self.rules.abort_above_tenths || remaining.is_empty() {
                return None;
            }

            // Order of `remaining` is irrelevant to a uniform draw.
            let idx = rng.gen_range(0..remaining.len());
            let candidate = remaining.swap_remove(idx);

            // A rejected draw is simply discarded.
            let _ = squad.try_accept(candidate, &self.rules);
        }

        Some(squad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player(id: u32, club: &str, position: Position, cost_tenths: u32, ppg: f64) -> Candidate {
        Candidate {
            id,
            name: format!("P{id}"),
            club: club.into(),
            position,
            cost_tenths,
            ppg,
            total_points: 100,
        }
    }

    /// `per_position` players for each slot type, spread over plenty of clubs.
    fn roomy_pool(per_position: u32) -> Vec<Candidate> {
        let mut pool = Vec::new();
        let mut id = 0;
        for pos in Position::ALL {
            for i in 0..per_position {
                id += 1;
                let club = format!("C{}", id % 12);
                pool.push(player(id, &club, pos, 40 + (i % 5) * 5, 2.0 + i as f64 * 0.3));
            }
        }
        pool
    }

    /// Exactly fifteen players that fill every quota at exactly 100.0.
    fn exact_pool() -> Vec<Candidate> {
        let mut pool = Vec::new();
        let mut id = 0;
        let quotas = SquadRules::FPL.quotas;
        for (pos, &count) in quotas.iter() {
            for _ in 0..count {
                id += 1;
                let club = format!("C{}", id % 6);
                pool.push(player(id, &club, pos, 60, 3.0));
            }
        }
        // 14 * 6.0 = 84.0, last one brings it to 100.0
        pool.last_mut().unwrap().cost_tenths = 160;
        pool
    }

    fn assert_valid(squad: &Squad<'_>, rules: &SquadRules) {
        assert_eq!(squad.len(), 15);
        assert!(squad.is_complete(rules));
        for (pos, &quota) in rules.quotas.iter() {
            assert_eq!(squad.bucket(pos).len(), quota, "bucket {pos}");
        }
        assert!(squad.cost_tenths() <= rules.budget_tenths);
        for p in squad.players() {
            assert!(squad.club_count(&p.club) <= rules.max_per_club);
        }
    }

    #[test]
    fn sampled_squads_satisfy_all_rules() {
        let rules = SquadRules::FPL;
        let pool = roomy_pool(12);
        let sampler = Sampler::new(&pool, rules);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let squad = sampler.sample(&Squad::new(), &mut rng).unwrap();
            assert_valid(&squad, &rules);
        }
    }

    #[test]
    fn exact_pool_succeeds_on_first_attempt() {
        let rules = SquadRules::FPL;
        let pool = exact_pool();
        let sampler = Sampler::new(&pool, rules);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let squad = sampler
                .attempt(&Squad::new(), &mut rng)
                .expect("exact pool must fill on the first attempt");
            assert_valid(&squad, &rules);
            assert_eq!(squad.cost_tenths(), 1000);
            for c in &pool {
                assert!(squad.contains(c.id));
            }
        }
    }

    #[test]
    fn club_quota_rejects_fourth_regardless_of_ppg() {
        let rules = SquadRules::FPL;
        let mut pool = exact_pool();
        // Four cheap, strong midfielders from one club.
        for (i, ppg) in [8.0, 7.0, 6.0, 5.0].into_iter().enumerate() {
            pool.push(player(100 + i as u32, "BIG", Position::Mid, 40, ppg));
        }
        let sampler = Sampler::new(&pool, rules);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let squad = sampler.sample(&Squad::new(), &mut rng).unwrap();
            assert!(squad.club_count("BIG") <= 3);
        }
    }

    #[test]
    fn impossible_pool_exhausts_attempts() {
        let rules = SquadRules {
            max_attempts: 50,
            ..SquadRules::FPL
        };
        // Only one goalkeeper available.
        let mut pool = roomy_pool(8);
        pool.retain(|c| c.position != Position::Gkp);
        pool.push(player(999, "X", Position::Gkp, 40, 3.0));
        let sampler = Sampler::new(&pool, rules);
        let mut rng = StdRng::seed_from_u64(1);
        let err = sampler.sample(&Squad::new(), &mut rng).unwrap_err();
        assert!(matches!(err, SamplerError::Exhausted { attempts: 50 }));
    }

    #[test]
    fn too_expensive_pool_aborts_attempts() {
        let rules = SquadRules {
            max_attempts: 20,
            ..SquadRules::FPL
        };
        let mut pool = roomy_pool(10);
        for c in &mut pool {
            c.cost_tenths = 100;
        }
        let sampler = Sampler::new(&pool, rules);
        let mut rng = StdRng::seed_from_u64(9);
        assert!(sampler.sample(&Squad::new(), &mut rng).is_err());
    }

    #[test]
    fn seeded_players_are_kept_and_not_redrawn() {
        let rules = SquadRules::FPL;
        let pool = roomy_pool(12);
        let pre = vec![pool[0].clone(), pool[30].clone()];
        let seed = Squad::seeded(&pre, &rules).unwrap();
        let sampler = Sampler::new(&pool, rules);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let squad = sampler.sample(&seed, &mut rng).unwrap();
            assert_valid(&squad, &rules);
            let hits = squad.players().filter(|p| p.id == pre[0].id).count();
            assert_eq!(hits, 1);
            assert!(squad.contains(pre[1].id));
        }
    }

    #[test]
    fn same_seed_same_squad() {
        let rules = SquadRules::FPL;
        let pool = roomy_pool(12);
        let sampler = Sampler::new(&pool, rules);
        let a = sampler
            .sample(&Squad::new(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = sampler
            .sample(&Squad::new(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let ids_a: Vec<_> = a.players().map(|p| p.id).collect();
        let ids_b: Vec<_> = b.players().map(|p| p.id).collect();
        assert_eq!(ids_a, ids_b);
    }
}
