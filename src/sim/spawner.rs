//! Challenge spawning
//!
//! Decides when a new challenge may appear, whether it is a trap, and which
//! key it shows. Keys of active challenges are always pairwise distinct.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;

use super::state::{Challenge, ChallengeKind};
use crate::consts::*;

/// Most traps allowed alive at once for a given population cap
pub fn trap_limit(max_challenges: usize) -> usize {
    max_challenges.div_ceil(3)
}

/// Keys not currently handed out
///
/// Refilled from the full alphabet when it runs dry, so keys are unique per
/// generation of active challenges rather than globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPool {
    available: BTreeSet<char>,
}

impl Default for KeyPool {
    fn default() -> Self {
        Self::full()
    }
}

impl KeyPool {
    pub fn full() -> Self {
        Self {
            available: ALPHABET.iter().copied().collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            available: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn contains(&self, key: char) -> bool {
        self.available.contains(&key)
    }

    pub fn refill(&mut self) {
        self.available.extend(ALPHABET.iter().copied());
    }

    /// Remove a key; false if it was not available
    pub fn take(&mut self, key: char) -> bool {
        self.available.remove(&key)
    }

    /// Return a key once its challenge resolves or expires
    pub fn give_back(&mut self, key: char) {
        if ALPHABET.contains(&key) {
            self.available.insert(key);
        }
    }

    fn candidates(&self, active: &[Challenge]) -> Vec<char> {
        self.available
            .iter()
            .copied()
            .filter(|k| !active.iter().any(|c| c.key == *k))
            .collect()
    }
}

/// Spawns challenges under the population cap and trap ratio
#[derive(Debug, Clone)]
pub struct ChallengeSpawner {
    max_challenges: usize,
    trap_chance: f32,
    /// Side of a spawned tile
    tile_size: f32,
    next_id: u32,
}

impl Default for ChallengeSpawner {
    fn default() -> Self {
        Self::new(MAX_CHALLENGES, TRAP_CHANCE)
    }
}

impl ChallengeSpawner {
    pub fn new(max_challenges: usize, trap_chance: f32) -> Self {
        Self {
            max_challenges,
            trap_chance: trap_chance.clamp(0.0, 1.0),
            tile_size: CHALLENGE_SIZE,
            next_id: 1,
        }
    }

    /// Spawn tiles of side `size`, kept narrower than the play area
    pub fn with_tile_size(mut self, size: f32) -> Self {
        self.tile_size = size.clamp(1.0, PLAY_WIDTH / 2.0);
        self
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn max_challenges(&self) -> usize {
        self.max_challenges
    }

    fn next_challenge_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Try to introduce one falling challenge
    ///
    /// The new tile falls at `speed`. On success the chosen key is removed
    /// from `pool`; the caller returns it when the challenge leaves play.
    pub fn try_spawn<R: Rng>(
        &mut self,
        active: &[Challenge],
        pool: &mut KeyPool,
        speed: f32,
        rng: &mut R,
        now: f64,
    ) -> Option<Challenge> {
        if active.len() >= self.max_challenges {
            return None;
        }

        let traps = active.iter().filter(|c| c.is_trap()).count();
        let regular = active.len() - traps;
        let force_regular = regular < MIN_REGULAR || traps > 2 * regular;

        let roll = rng.random::<f32>();
        let is_trap =
            !force_regular && traps < trap_limit(self.max_challenges) && roll < self.trap_chance;

        if pool.is_empty() {
            log::debug!("Key pool exhausted, refilling");
            pool.refill();
        }
        let mut candidates = pool.candidates(active);
        if candidates.is_empty() {
            pool.refill();
            candidates = pool.candidates(active);
        }
        if candidates.is_empty() {
            return None;
        }

        let key = candidates[rng.random_range(0..candidates.len())];
        pool.take(key);

        let size = self.tile_size;
        let x = rng.random_range(0.0..=(PLAY_WIDTH - size));
        let kind = if is_trap {
            ChallengeKind::Trap
        } else {
            ChallengeKind::Regular
        };

        Some(Challenge {
            id: self.next_challenge_id(),
            key,
            kind,
            spawn_time: now,
            speed,
            pos: Vec2::new(x, -size),
        })
    }

    /// Lay out static tutorial challenges for `keys`
    ///
    /// Keys that are already taken are skipped.
    pub fn spawn_tutorial(&mut self, keys: &[char], pool: &mut KeyPool, now: f64) -> Vec<Challenge> {
        let keys: Vec<char> = keys.iter().copied().filter(|k| pool.take(*k)).collect();
        let slot = PLAY_WIDTH / (keys.len() as f32 + 1.0);
        let half = self.tile_size / 2.0;
        keys.into_iter()
            .enumerate()
            .map(|(i, key)| Challenge {
                id: self.next_challenge_id(),
                key,
                kind: ChallengeKind::Regular,
                spawn_time: now,
                speed: 0.0,
                pos: Vec2::new(
                    slot * (i as f32 + 1.0) - half,
                    PLAY_HEIGHT / 2.0 - half,
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SPEED: f32 = 80.0;

    fn challenge(id: u32, key: char, kind: ChallengeKind) -> Challenge {
        Challenge {
            id,
            key,
            kind,
            spawn_time: 0.0,
            speed: 1.0,
            pos: Vec2::ZERO,
        }
    }

    #[test]
    fn test_refuses_at_cap() {
        let mut spawner = ChallengeSpawner::new(3, 0.2);
        let mut pool = KeyPool::full();
        let active: Vec<_> = ['A', 'B', 'C']
            .into_iter()
            .enumerate()
            .map(|(i, k)| challenge(i as u32, k, ChallengeKind::Regular))
            .collect();
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(spawner.try_spawn(&active, &mut pool, SPEED, &mut rng, 0.0).is_none());
        assert_eq!(pool.len(), 26);
    }

    #[test]
    fn test_forces_regular_below_baseline() {
        let mut spawner = ChallengeSpawner::new(MAX_CHALLENGES, 1.0);
        let mut pool = KeyPool::full();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut active = Vec::new();
        for _ in 0..MIN_REGULAR {
            let c = spawner.try_spawn(&active, &mut pool, SPEED, &mut rng, 0.0).unwrap();
            assert_eq!(c.kind, ChallengeKind::Regular);
            active.push(c);
        }
        // Baseline met and trap chance is 1.0: next one is a trap
        let c = spawner.try_spawn(&active, &mut pool, SPEED, &mut rng, 0.0).unwrap();
        assert_eq!(c.kind, ChallengeKind::Trap);
    }

    #[test]
    fn test_trap_limit_caps_traps() {
        let mut spawner = ChallengeSpawner::new(MAX_CHALLENGES, 1.0);
        let mut pool = KeyPool::full();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut active = Vec::new();
        while let Some(c) = spawner.try_spawn(&active, &mut pool, SPEED, &mut rng, 0.0) {
            active.push(c);
        }
        let traps = active.iter().filter(|c| c.is_trap()).count();
        assert_eq!(active.len(), MAX_CHALLENGES);
        assert!(traps <= trap_limit(MAX_CHALLENGES));
        assert!(traps > 0);
    }

    #[test]
    fn test_chosen_key_leaves_pool() {
        let mut spawner = ChallengeSpawner::default();
        let mut pool = KeyPool::full();
        let mut rng = Pcg32::seed_from_u64(11);
        let c = spawner
            .try_spawn(&[], &mut pool, SPEED, &mut rng, 1.5)
            .unwrap();
        assert_eq!(c.speed, SPEED);
        assert!(!pool.contains(c.key));
        assert_eq!(pool.len(), 25);
        assert_eq!(c.spawn_time, 1.5);
        assert!(c.pos.x >= 0.0 && c.pos.x <= PLAY_WIDTH - CHALLENGE_SIZE);
        pool.give_back(c.key);
        assert_eq!(pool.len(), 26);
    }

    #[test]
    fn test_tile_size_bounds_spawn_position() {
        let mut spawner = ChallengeSpawner::new(26, 0.0).with_tile_size(60.0);
        let mut pool = KeyPool::full();
        let mut rng = Pcg32::seed_from_u64(21);
        let mut active = Vec::new();
        while let Some(c) = spawner.try_spawn(&active, &mut pool, 135.0, &mut rng, 0.0) {
            assert_eq!(c.pos.y, -60.0);
            assert!(c.pos.x >= 0.0 && c.pos.x <= PLAY_WIDTH - 60.0);
            assert_eq!(c.speed, 135.0);
            active.push(c);
        }
        assert_eq!(active.len(), 26);

        let tutorial = spawner.spawn_tutorial(&['C'], &mut KeyPool::full(), 0.0);
        assert_eq!(tutorial[0].pos, Vec2::new(PLAY_WIDTH / 2.0 - 30.0, PLAY_HEIGHT / 2.0 - 30.0));
    }

    #[test]
    fn test_refill_on_exhaustion() {
        let mut spawner = ChallengeSpawner::default();
        let mut pool = KeyPool::empty();
        let active = vec![challenge(1, 'A', ChallengeKind::Regular)];
        let mut rng = Pcg32::seed_from_u64(5);
        let c = spawner
            .try_spawn(&active, &mut pool, SPEED, &mut rng, 0.0)
            .unwrap();
        assert_ne!(c.key, 'A');
        // Refilled pool holds everything except the new key
        assert_eq!(pool.len(), 25);
        assert!(pool.contains('A'));
    }

    #[test]
    fn test_tutorial_layout() {
        let mut spawner = ChallengeSpawner::default();
        let mut pool = KeyPool::full();
        let tutorial = spawner.spawn_tutorial(&['C', 'L', 'I'], &mut pool, 0.0);
        assert_eq!(tutorial.len(), 3);
        assert!(tutorial.iter().all(|c| c.speed == 0.0 && !c.is_trap()));
        assert!(!pool.contains('C'));
        let ids: BTreeSet<u32> = tutorial.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_active_keys_unique_and_capped(
            seed in any::<u64>(),
            ops in proptest::collection::vec(0u8..4, 1..300),
        ) {
            let mut spawner = ChallengeSpawner::default();
            let mut pool = KeyPool::full();
            let mut rng = Pcg32::seed_from_u64(seed);
                let mut active: Vec<Challenge> = Vec::new();

            for op in ops {
                if op == 0 && !active.is_empty() {
                    // Resolve the oldest challenge
                    let c = active.remove(0);
                    pool.give_back(c.key);
                } else if let Some(c) = spawner.try_spawn(&active, &mut pool, SPEED, &mut rng, 0.0) {
                    active.push(c);
                }

                let keys: BTreeSet<char> = active.iter().map(|c| c.key).collect();
                prop_assert_eq!(keys.len(), active.len());
                prop_assert!(active.len() <= MAX_CHALLENGES);
                let traps = active.iter().filter(|c| c.is_trap()).count();
                prop_assert!(traps <= trap_limit(MAX_CHALLENGES));
            }
        }
    }
}
