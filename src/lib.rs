//! Keyscale - a reflex climbing game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, pacing, hazard, session loop)
//! - `tuning`: Difficulty tiers
//! - `highscores`: Top-10 ranked ledgers
//! - `persistence`: Score stores (local file, remote API, fallback)
//! - `settings`: Persisted user preferences
//! - `audio`: Sound cues driven by game events
//! - `platform`: Terminal input/output and data paths

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{ScoreEntry, ScoreLedger};
pub use settings::Settings;
pub use tuning::{Difficulty, DifficultyTier};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (20 Hz, one iteration per frame)
    pub const SIM_DT: f32 = 1.0 / 20.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Play area dimensions (units)
    pub const PLAY_WIDTH: f32 = 480.0;
    pub const PLAY_HEIGHT: f32 = 640.0;
    /// Side length of a challenge tile
    pub const CHALLENGE_SIZE: f32 = 30.0;

    /// Key alphabet shown on challenges
    pub const ALPHABET: [char; 26] = [
        'A', 'S', 'D', 'W', 'Z', 'Q', 'E', 'R', 'T', 'Y', 'U', 'I', 'O', 'P', 'F', 'G', 'H',
        'J', 'K', 'L', 'X', 'C', 'V', 'B', 'N', 'M',
    ];

    /// Population limits
    pub const MAX_CHALLENGES: usize = 20;
    /// Regular challenges below this count force a regular spawn
    pub const MIN_REGULAR: usize = 5;
    /// Chance that an unforced spawn is a trap
    pub const TRAP_CHANCE: f32 = 0.2;

    /// Player lives
    pub const START_LIVES: u8 = 4;

    /// Player altitude at session start
    pub const PLAYER_START_ALTITUDE: f32 = 240.0;
    /// Altitude gained per regular hit
    pub const CLIMB_STEP: f32 = 12.0;

    /// Hazard push-back per regular hit (units)
    pub const HAZARD_PUSHBACK: f32 = 50.0;
    /// Hazard receding speed (units/s)
    pub const HAZARD_RECEDE_SPEED: f32 = 120.0;
    /// Hard cap on hazard rising speed (units/s) so a run stays beatable
    pub const MAX_HAZARD_SPEED: f32 = 60.0;
    /// Distance under which the spawn rate gets an extra squeeze
    pub const HAZARD_PROXIMITY: f32 = 100.0;

    /// Reaction-time window bounds (seconds)
    pub const WINDOW_START: f32 = 5.0;
    pub const WINDOW_MIN: f32 = 1.25;
    pub const WINDOW_MAX: f32 = 5.0;
    /// Minimum change before the window is retuned
    pub const WINDOW_HYSTERESIS: f32 = 0.2;
    /// Samples needed before the window adapts
    pub const MIN_REACTION_SAMPLES: usize = 3;
    /// Rolling reaction-time window length
    pub const REACTION_HISTORY: usize = 5;

    /// Scoring
    pub const MAX_POINTS: u32 = 500;
    pub const MIN_POINTS: u32 = 10;
    /// Score band width for spawn/hazard pacing
    pub const SCORE_BAND: u64 = 100;

    /// Countdown between tutorial and play (seconds)
    pub const COUNTDOWN_SECS: f32 = 3.0;

    /// Player names are truncated to this many characters
    pub const MAX_NAME_LEN: usize = 17;
}

/// Trim and bound a player name, falling back to "Anonymous"
pub fn sanitize_name(name: &str) -> String {
    let trimmed: String = name.trim().chars().take(consts::MAX_NAME_LEN).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        "Anonymous".to_string()
    } else {
        trimmed.to_string()
    }
}
