//! Difficulty tiers
//!
//! A tier is chosen once before a session and never changes during it.

use serde::{Deserialize, Serialize};

/// Named difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Parameter bundle for this difficulty
    pub fn tier(&self) -> DifficultyTier {
        match self {
            Difficulty::Easy => DifficultyTier {
                difficulty: *self,
                base_obstacle_speed: 40.0,
                base_spawn_rate: 70,
                base_hazard_speed: 6.0,
                hazard_speed_increment: 0.6,
                hazard_start_delay: 5.0,
                initial_challenge_count: 3,
            },
            Difficulty::Medium => DifficultyTier {
                difficulty: *self,
                base_obstacle_speed: 80.0,
                base_spawn_rate: 50,
                base_hazard_speed: 10.0,
                hazard_speed_increment: 1.4,
                hazard_start_delay: 3.0,
                initial_challenge_count: 4,
            },
            Difficulty::Hard => DifficultyTier {
                difficulty: *self,
                base_obstacle_speed: 120.0,
                base_spawn_rate: 30,
                base_hazard_speed: 14.0,
                hazard_speed_increment: 3.0,
                hazard_start_delay: 2.0,
                initial_challenge_count: 5,
            },
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-difficulty parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    pub difficulty: Difficulty,
    /// Challenge fall speed (units/s)
    pub base_obstacle_speed: f32,
    /// Spawn rate while score < 100 (one spawn per `rate` ticks on average)
    pub base_spawn_rate: u32,
    /// Hazard rising speed at score 0 (units/s)
    pub base_hazard_speed: f32,
    /// Hazard speed added per 100-point band and per miss surge (units/s)
    pub hazard_speed_increment: f32,
    /// Seconds of play before the hazard starts rising
    pub hazard_start_delay: f32,
    /// Number of static tutorial challenges
    pub initial_challenge_count: usize,
}

impl DifficultyTier {
    pub fn name(&self) -> &'static str {
        self.difficulty.as_str()
    }
}

impl Default for DifficultyTier {
    fn default() -> Self {
        Difficulty::default().tier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(Difficulty::from_str("Easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("normal"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str(" HARD "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_tiers_get_harder() {
        let [easy, medium, hard] = Difficulty::ALL.map(|d| d.tier());
        assert!(easy.base_spawn_rate > medium.base_spawn_rate);
        assert!(medium.base_spawn_rate > hard.base_spawn_rate);
        assert!(easy.base_obstacle_speed < hard.base_obstacle_speed);
        assert!(easy.hazard_start_delay > hard.hazard_start_delay);
        assert_eq!(medium.base_spawn_rate, 50);
    }
}
