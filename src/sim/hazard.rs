//! Rising hazard pursuit
//!
//! The hazard sleeps through its start delay, then rises toward the player.
//! Each successful answer knocks it back; once it has receded to its target
//! it starts rising again. Reaching the player while rising ends the run.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::DifficultyTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardPhase {
    /// Waiting out the start delay
    Dormant,
    /// Moving toward the player
    Rising,
    /// Falling back toward `target`
    Receding,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardState {
    /// Altitude of the leading edge
    pub level: f32,
    /// Where a receding hazard stops
    pub target: f32,
    /// Effective rising speed on the last tick (units/s)
    pub speed: f32,
    /// Speed added by misses (units/s)
    pub surge: f32,
    pub phase: HazardPhase,
    pub start_delay_remaining: f32,
}

/// What happened on one hazard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HazardStep {
    /// Start delay ran out this step
    pub awoke: bool,
    /// Leading edge reached the player
    pub overtook: bool,
}

#[derive(Debug, Clone)]
pub struct HazardPursuit {
    state: HazardState,
    surge_step: f32,
    pushback: f32,
    recede_speed: f32,
}

impl HazardPursuit {
    pub fn new(tier: &DifficultyTier) -> Self {
        Self {
            state: HazardState {
                level: 0.0,
                target: 0.0,
                speed: 0.0,
                surge: 0.0,
                phase: HazardPhase::Dormant,
                start_delay_remaining: tier.hazard_start_delay.max(0.0),
            },
            surge_step: tier.hazard_speed_increment,
            pushback: HAZARD_PUSHBACK,
            recede_speed: HAZARD_RECEDE_SPEED,
        }
    }

    pub fn state(&self) -> &HazardState {
        &self.state
    }

    pub fn phase(&self) -> HazardPhase {
        self.state.phase
    }

    pub fn level(&self) -> f32 {
        self.state.level
    }

    pub fn distance_to(&self, player_altitude: f32) -> f32 {
        player_altitude - self.state.level
    }

    /// Advance by `dt` seconds at `paced_speed` (before surges)
    pub fn tick(&mut self, dt: f32, paced_speed: f32, player_altitude: f32) -> HazardStep {
        let mut step = HazardStep::default();
        let state = &mut self.state;
        state.speed = (paced_speed + state.surge).min(MAX_HAZARD_SPEED);

        match state.phase {
            HazardPhase::Dormant => {
                state.start_delay_remaining -= dt;
                if state.start_delay_remaining <= 0.0 {
                    state.start_delay_remaining = 0.0;
                    state.phase = HazardPhase::Rising;
                    step.awoke = true;
                    log::debug!("Hazard awake at level {:.1}", state.level);
                }
            }
            HazardPhase::Rising => {
                state.level += state.speed * dt;
                if state.level >= player_altitude {
                    state.level = player_altitude;
                    step.overtook = true;
                }
            }
            HazardPhase::Receding => {
                state.level -= self.recede_speed * dt;
                if state.level <= state.target {
                    state.level = state.target;
                    state.phase = HazardPhase::Rising;
                }
            }
        }

        step
    }

    /// Knock the hazard back after a successful answer
    pub fn push_back(&mut self) {
        let state = &mut self.state;
        let from = match state.phase {
            HazardPhase::Dormant => return,
            HazardPhase::Rising => state.level,
            HazardPhase::Receding => state.level.min(state.target),
        };
        state.target = (from - self.pushback).max(0.0);
        state.phase = HazardPhase::Receding;
    }

    /// Permanently raise the rising speed after a miss
    pub fn speed_up(&mut self) -> f32 {
        self.state.surge += self.surge_step;
        self.state.surge
    }
}
