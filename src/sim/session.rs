//! Game session
//!
//! Owns every piece of per-run state. Collaborators (ledger, tier, seed) are
//! handed in at construction; nothing here reaches for globals.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::ReflexClock;
use super::hazard::HazardPursuit;
use super::pacing::{DifficultyController, PacingState};
use super::spawner::{ChallengeSpawner, KeyPool};
use super::state::{Challenge, GameEvent, GamePhase, SessionState, Snapshot};
use crate::consts::*;
use crate::highscores::{ScoreEntry, ScoreLedger};
use crate::tuning::DifficultyTier;

/// Static warm-up keys, truncated to the tier's initial challenge count
pub const TUTORIAL_KEYS: [char; 5] = ['C', 'L', 'I', 'M', 'B'];

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tier: DifficultyTier,
    pub player_name: String,
    /// Start with the static tutorial challenges
    pub tutorial: bool,
    pub lives: u8,
    pub max_challenges: usize,
    pub trap_chance: f32,
    /// Side of a falling tile in play-area units
    pub tile_size: f32,
    /// RNG seed; restarts derive their seed from it
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tier: DifficultyTier::default(),
            player_name: "Anonymous".to_string(),
            tutorial: true,
            lives: START_LIVES,
            max_challenges: MAX_CHALLENGES,
            trap_chance: TRAP_CHANCE,
            tile_size: CHALLENGE_SIZE,
            seed: 0,
        }
    }
}

fn spawner_for(config: &SessionConfig) -> ChallengeSpawner {
    ChallengeSpawner::new(config.max_challenges, config.trap_chance).with_tile_size(config.tile_size)
}

pub struct GameSession {
    pub(super) config: SessionConfig,
    pub(super) state: SessionState,
    pub(super) challenges: Vec<Challenge>,
    pub(super) pool: KeyPool,
    pub(super) spawner: ChallengeSpawner,
    pub(super) pacing: DifficultyController,
    pub(super) clock: ReflexClock,
    pub(super) hazard: HazardPursuit,
    pub(super) ledger: ScoreLedger,
    pub(super) rng: Pcg32,
    pub(super) events: Vec<GameEvent>,
    restarts: u64,
}

impl GameSession {
    pub fn new(mut config: SessionConfig, ledger: ScoreLedger) -> Self {
        config.player_name = crate::sanitize_name(&config.player_name);
        let mut session = Self {
            state: SessionState::new(config.lives, GamePhase::Playing),
            challenges: Vec::new(),
            pool: KeyPool::full(),
            spawner: spawner_for(&config),
            pacing: DifficultyController::new(config.tier),
            clock: ReflexClock::new(),
            hazard: HazardPursuit::new(&config.tier),
            ledger,
            rng: Pcg32::seed_from_u64(config.seed),
            events: Vec::new(),
            restarts: 0,
            config,
        };
        session.begin();
        session
    }

    /// Set up the opening phase of a fresh run
    fn begin(&mut self) {
        let count = self.config.tier.initial_challenge_count.min(TUTORIAL_KEYS.len());
        if self.config.tutorial && count > 0 {
            let now = self.state.clock;
            self.challenges =
                self.spawner
                    .spawn_tutorial(&TUTORIAL_KEYS[..count], &mut self.pool, now);
            self.state.phase = GamePhase::Tutorial;
        } else {
            self.state.phase = GamePhase::Playing;
        }
        log::info!(
            "Session started: tier={}, player={}, phase={:?}",
            self.config.tier.name(),
            self.config.player_name,
            self.state.phase
        );
    }

    /// Throw away all run state and start over; the ledger is kept
    pub fn restart(&mut self) {
        self.restarts += 1;
        let seed = self.config.seed.wrapping_add(self.restarts);
        self.state = SessionState::new(self.config.lives, GamePhase::Playing);
        self.challenges.clear();
        self.pool = KeyPool::full();
        self.spawner = spawner_for(&self.config);
        self.pacing = DifficultyController::new(self.config.tier);
        self.clock.reset();
        self.hazard = HazardPursuit::new(&self.config.tier);
        self.rng = Pcg32::seed_from_u64(seed);
        self.events.clear();
        self.begin();
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == GamePhase::Terminal
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn pool(&self) -> &KeyPool {
        &self.pool
    }

    pub fn pacing(&self) -> &PacingState {
        self.pacing.pacing()
    }

    pub fn hazard(&self) -> &HazardPursuit {
        &self.hazard
    }

    pub fn reflex_clock(&self) -> &ReflexClock {
        &self.clock
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn distance_to_hazard(&self) -> f32 {
        self.hazard.distance_to(self.state.player_altitude)
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ledger entry describing the run so far
    pub fn final_entry(&self) -> ScoreEntry {
        ScoreEntry {
            name: self.config.player_name.clone(),
            score: self.state.score,
            letters: self.state.correct_count,
            avg_time: (self.clock.average() * 100.0).round() / 100.0,
            difficulty: Some(self.config.tier.name().to_string()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let hazard = self.hazard.state();
        Snapshot {
            challenges: self.challenges.clone(),
            phase: self.state.phase,
            score: self.state.score,
            lives: self.state.lives,
            player_altitude: self.state.player_altitude,
            hazard_level: hazard.level,
            hazard_phase: hazard.phase,
            countdown: self.state.countdown,
            response_window: self.pacing.pacing().response_window,
        }
    }
}
