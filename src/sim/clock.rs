//! Reaction timing and scoring
//!
//! Times each challenge from presentation to resolution. Only successful
//! resolutions become reaction samples: a miss has no reaction to measure.

use std::collections::BTreeMap;

use crate::consts::*;

/// How a challenge left play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Correct key pressed
    Hit,
    /// Wrong key pressed (trap or drill mistake)
    WrongKey,
    /// Window elapsed or tile left the play area
    Timeout,
}

/// Points for a correct answer: up to 500 for instant, never below 10
pub fn points_for(reaction_time: f32, window: f32) -> u32 {
    if window <= 0.0 {
        return MIN_POINTS;
    }
    let fraction = (1.0 - reaction_time / window).max(0.0);
    let points = (MAX_POINTS as f32 * fraction).floor() as u32;
    points.clamp(MIN_POINTS, MAX_POINTS)
}

#[derive(Debug, Clone, Default)]
pub struct ReflexClock {
    /// Presentation time per challenge id
    started: BTreeMap<u32, f64>,
    /// Most recent successful reaction times, oldest first
    recent: Vec<f32>,
    total_time: f64,
    total_hits: u32,
}

impl ReflexClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the presentation time of a challenge
    pub fn start(&mut self, id: u32, now: f64) {
        self.started.insert(id, now);
    }

    /// Stop timing a challenge and return its elapsed time
    ///
    /// Hits feed the rolling window; other outcomes only stop the timer.
    /// Unknown ids report zero.
    pub fn resolve(&mut self, id: u32, outcome: Outcome, now: f64) -> f32 {
        let Some(started) = self.started.remove(&id) else {
            return 0.0;
        };
        let elapsed = (now - started).max(0.0) as f32;
        if outcome == Outcome::Hit {
            self.record_sample(elapsed);
        }
        elapsed
    }

    fn record_sample(&mut self, reaction_time: f32) {
        self.recent.push(reaction_time);
        if self.recent.len() > REACTION_HISTORY {
            self.recent.remove(0);
        }
        self.total_time += reaction_time as f64;
        self.total_hits += 1;
    }

    /// Rolling window, oldest first
    pub fn recent(&self) -> &[f32] {
        &self.recent
    }

    /// Mean of every successful reaction this session
    pub fn average(&self) -> f32 {
        if self.total_hits == 0 {
            0.0
        } else {
            (self.total_time / self.total_hits as f64) as f32
        }
    }

    pub fn hits(&self) -> u32 {
        self.total_hits
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
