//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Reaction times measured on the session clock, never the wall clock
//! - No terminal, audio or storage dependencies

pub mod clock;
pub mod drill;
pub mod hazard;
pub mod pacing;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::{Outcome, ReflexClock, points_for};
pub use drill::{DrillEvent, DrillPhase, ReadyStage, ReflexDrill};
pub use hazard::{HazardPhase, HazardPursuit, HazardState, HazardStep};
pub use pacing::{DifficultyController, PacingState, hazard_speed_for, target_window};
pub use session::{GameSession, SessionConfig, TUTORIAL_KEYS};
pub use spawner::{ChallengeSpawner, KeyPool, trap_limit};
pub use state::{
    Challenge, ChallengeKind, GameEvent, GamePhase, SessionState, Snapshot, TerminalCause,
};
pub use tick::TickInput;
