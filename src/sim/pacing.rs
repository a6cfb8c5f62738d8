//! Adaptive pacing
//!
//! Derives live spawn rate, obstacle speed, hazard speed and the allowed
//! response window from score, hazard proximity and recent reaction times.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::DifficultyTier;

/// Live pacing values, recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingState {
    /// Average ticks between spawns (lower means more frequent)
    pub spawn_rate: u32,
    /// Challenge fall speed (units/s)
    pub obstacle_speed: f32,
    /// Hazard rising speed before miss surges (units/s)
    pub hazard_speed: f32,
    /// Seconds a player gets to answer a prompt
    pub response_window: f32,
}

/// Spawn rate after one score-band step
fn banded_spawn_rate(current: u32, base: u32, score: u64) -> u32 {
    if score < SCORE_BAND {
        base
    } else if score < 2 * SCORE_BAND {
        current.saturating_sub(1).max(10)
    } else {
        current.saturating_sub(1).max(5)
    }
}

/// Extra squeeze when the hazard is close to the player
fn proximity_spawn_rate(rate: u32, distance_to_hazard: f32) -> u32 {
    if distance_to_hazard < HAZARD_PROXIMITY {
        rate.saturating_sub(2).max(5)
    } else {
        rate
    }
}

/// Hazard speed for a score: base plus one increment per full band, capped
pub fn hazard_speed_for(tier: &DifficultyTier, score: u64) -> f32 {
    let bands = (score / SCORE_BAND) as f32;
    (tier.base_hazard_speed + bands * tier.hazard_speed_increment).min(MAX_HAZARD_SPEED)
}

/// Candidate response window from recent reaction samples
///
/// None until there are enough samples to judge.
pub fn target_window(recent: &[f32]) -> Option<f32> {
    if recent.len() < MIN_REACTION_SAMPLES {
        return None;
    }
    let start = recent.len().saturating_sub(REACTION_HISTORY);
    let window = &recent[start..];
    let avg = window.iter().sum::<f32>() / window.len() as f32;
    Some((avg * 1.5).clamp(WINDOW_MIN, WINDOW_MAX))
}

/// Owns the tier and the live pacing values
#[derive(Debug, Clone)]
pub struct DifficultyController {
    tier: DifficultyTier,
    pacing: PacingState,
}

impl DifficultyController {
    pub fn new(tier: DifficultyTier) -> Self {
        Self {
            pacing: PacingState {
                spawn_rate: tier.base_spawn_rate,
                obstacle_speed: tier.base_obstacle_speed,
                hazard_speed: tier.base_hazard_speed.min(MAX_HAZARD_SPEED),
                response_window: WINDOW_START,
            },
            tier,
        }
    }

    pub fn tier(&self) -> &DifficultyTier {
        &self.tier
    }

    pub fn pacing(&self) -> &PacingState {
        &self.pacing
    }

    /// Recompute pacing for this tick
    pub fn retune(&mut self, score: u64, distance_to_hazard: f32, recent: &[f32]) -> &PacingState {
        let rate = banded_spawn_rate(self.pacing.spawn_rate, self.tier.base_spawn_rate, score);
        self.pacing.spawn_rate = proximity_spawn_rate(rate, distance_to_hazard);
        self.pacing.obstacle_speed = self.tier.base_obstacle_speed;
        self.pacing.hazard_speed = hazard_speed_for(&self.tier, score);
        self.retune_window(recent);
        &self.pacing
    }

    /// Adapt the response window; returns the new value when it moved
    pub fn retune_window(&mut self, recent: &[f32]) -> Option<f32> {
        let target = target_window(recent)?;
        if (target - self.pacing.response_window).abs() < WINDOW_HYSTERESIS {
            return None;
        }
        let rounded = (target * 10.0).round() / 10.0;
        log::debug!(
            "Response window {:.1}s -> {:.1}s",
            self.pacing.response_window,
            rounded
        );
        self.pacing.response_window = rounded;
        Some(rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Difficulty;
    use proptest::prelude::*;

    #[test]
    fn test_initial_medium_rate() {
        let ctl = DifficultyController::new(Difficulty::Medium.tier());
        assert_eq!(ctl.pacing().spawn_rate, 50);
        assert_eq!(ctl.pacing().response_window, WINDOW_START);
    }

    #[test]
    fn test_score_band_transition() {
        let mut ctl = DifficultyController::new(Difficulty::Medium.tier());
        assert_eq!(ctl.retune(95, 500.0, &[]).spawn_rate, 50);
        assert_eq!(ctl.retune(105, 500.0, &[]).spawn_rate, 49);
        // Keeps stepping down while in the band, floored at 10
        for _ in 0..100 {
            ctl.retune(150, 500.0, &[]);
        }
        assert_eq!(ctl.pacing().spawn_rate, 10);
        for _ in 0..100 {
            ctl.retune(250, 500.0, &[]);
        }
        assert_eq!(ctl.pacing().spawn_rate, 5);
        // Dropping back under 100 restores the base
        assert_eq!(ctl.retune(0, 500.0, &[]).spawn_rate, 50);
    }

    #[test]
    fn test_proximity_squeeze() {
        let mut far = DifficultyController::new(Difficulty::Hard.tier());
        let mut near = far.clone();
        let far_rate = far.retune(0, 150.0, &[]).spawn_rate;
        let near_rate = near.retune(0, 40.0, &[]).spawn_rate;
        assert_eq!(far_rate, 30);
        assert_eq!(near_rate, 28);
    }

    #[test]
    fn test_window_adapts_to_reactions() {
        let mut ctl = DifficultyController::new(Difficulty::Medium.tier());
        // Too few samples
        assert_eq!(ctl.retune_window(&[1.0, 2.0]), None);
        assert_eq!(ctl.retune_window(&[1.0, 2.0, 3.0]), Some(3.0));
        assert_eq!(ctl.pacing().response_window, 3.0);
    }

    #[test]
    fn test_window_hysteresis() {
        let mut ctl = DifficultyController::new(Difficulty::Medium.tier());
        ctl.retune_window(&[2.0, 2.0, 2.0]);
        assert_eq!(ctl.pacing().response_window, 3.0);
        // avg 2.1 -> 3.15, within 0.2 of 3.0
        assert_eq!(ctl.retune_window(&[2.1, 2.1, 2.1]), None);
        assert_eq!(ctl.pacing().response_window, 3.0);
    }

    #[test]
    fn test_window_uses_last_five() {
        let samples = [4.0, 4.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(target_window(&samples), Some(1.5));
        assert_eq!(target_window(&[0.1, 0.1, 0.1]), Some(WINDOW_MIN));
        assert_eq!(target_window(&[9.0, 9.0, 9.0]), Some(WINDOW_MAX));
    }

    #[test]
    fn test_hazard_speed_capped() {
        let tier = Difficulty::Hard.tier();
        assert_eq!(hazard_speed_for(&tier, 0), tier.base_hazard_speed);
        assert_eq!(hazard_speed_for(&tier, 199), tier.base_hazard_speed + tier.hazard_speed_increment);
        assert_eq!(hazard_speed_for(&tier, 1_000_000), MAX_HAZARD_SPEED);
    }

    proptest! {
        #[test]
        fn prop_proximity_never_slows_spawning(
            score in 0u64..1000,
            distance in -50.0f32..99.9,
            warmup in 0usize..50,
        ) {
            let mut with = DifficultyController::new(Difficulty::Medium.tier());
            for _ in 0..warmup {
                with.retune(score, 500.0, &[]);
            }
            let mut without = with.clone();
            let near = with.retune(score, distance, &[]).spawn_rate;
            let far = without.retune(score, 500.0, &[]).spawn_rate;
            prop_assert!(near <= far);
        }

        #[test]
        fn prop_small_window_changes_ignored(base in 0.9f32..3.3, delta in -0.12f32..0.12) {
            let mut ctl = DifficultyController::new(Difficulty::Medium.tier());
            ctl.retune_window(&[base, base, base]);
            let before = ctl.pacing().response_window;
            // delta * 1.5 stays under the hysteresis
            let nudged = before / 1.5 + delta;
            ctl.retune_window(&[nudged, nudged, nudged]);
            prop_assert_eq!(ctl.pacing().response_window, before);
        }
    }
}
