//! Session state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hazard::HazardPhase;
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Static warm-up challenges, no scoring
    Tutorial,
    /// Short countdown between tutorial and play
    Countdown,
    /// Active gameplay
    Playing,
    /// Frozen until resumed
    Paused,
    /// Run ended; only a restart is accepted
    Terminal,
}

/// What a challenge does when its key is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// Pressing the key scores and climbs
    Regular,
    /// Pressing the key costs a life
    Trap,
}

/// A spawned key prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u32,
    pub key: char,
    pub kind: ChallengeKind,
    /// Session clock (seconds) when the challenge was presented
    pub spawn_time: f64,
    /// Fall speed (units/s), zero for tutorial challenges
    pub speed: f32,
    /// Top-left corner in play-area coordinates (y grows downward)
    pub pos: Vec2,
}

impl Challenge {
    pub fn is_trap(&self) -> bool {
        self.kind == ChallengeKind::Trap
    }

    /// Move down by speed * dt
    pub fn advance(&mut self, dt: f32) {
        if self.speed > 0.0 {
            self.pos.y += self.speed * dt;
        }
    }

    /// True once the tile has fully left the bottom of the play area
    pub fn has_exited(&self) -> bool {
        self.pos.y > PLAY_HEIGHT
    }
}

/// Which loss conditions tripped on the terminal tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TerminalCause {
    pub out_of_lives: bool,
    pub overtaken: bool,
}

impl TerminalCause {
    pub fn any(&self) -> bool {
        self.out_of_lives || self.overtaken
    }
}

/// Score/lives/phase bookkeeping for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub lives: u8,
    /// Regular challenges cleared
    pub correct_count: u32,
    /// False once the run is over
    pub running: bool,
    pub phase: GamePhase,
    /// Phase to return to when unpausing
    pub resume_phase: Option<GamePhase>,
    /// Player altitude (units above the hazard's start level)
    pub player_altitude: f32,
    /// Session clock (seconds, advances in every non-paused phase)
    pub clock: f64,
    /// Seconds spent in the Playing phase
    pub play_time: f32,
    /// Seconds left in the countdown
    pub countdown: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Set on the terminal tick
    pub cause: TerminalCause,
}

impl SessionState {
    pub fn new(lives: u8, phase: GamePhase) -> Self {
        Self {
            score: 0,
            lives,
            correct_count: 0,
            running: true,
            phase,
            resume_phase: None,
            player_altitude: PLAYER_START_ALTITUDE,
            clock: 0.0,
            play_time: 0.0,
            countdown: COUNTDOWN_SECS,
            time_ticks: 0,
            cause: TerminalCause::default(),
        }
    }

    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }
}

/// Discrete events for sound and HUD collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned { id: u32, key: char, kind: ChallengeKind },
    Hit { key: char, points: u32, reaction_time: f32 },
    /// A regular challenge left the play area unresolved
    Miss { key: char },
    TrapHit { key: char },
    TutorialCleared,
    /// Whole seconds left before play starts
    CountdownTick { remaining: u32 },
    PlayStarted,
    HazardAwake,
    HazardSurge { speed: f32 },
    WindowRetuned { window: f32 },
    HazardOvertook,
    Paused,
    Resumed,
    GameOver { score: u64, rank: Option<usize> },
}

/// Per-tick view for an external renderer
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub challenges: Vec<Challenge>,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub player_altitude: f32,
    pub hazard_level: f32,
    pub hazard_phase: HazardPhase,
    pub countdown: f32,
    pub response_window: f32,
}

impl Snapshot {
    /// Gap between the player and the hazard's leading edge
    pub fn distance_to_hazard(&self) -> f32 {
        self.player_altitude - self.hazard_level
    }
}
