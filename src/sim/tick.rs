//! Fixed timestep session tick
//!
//! One call per frame: spawn, advance, resolve input, retune pacing, move the
//! hazard, then check the loss conditions. Never blocks.

use rand::Rng;

use super::clock::{Outcome, points_for};
use super::session::GameSession;
use super::state::{Challenge, ChallengeKind, GameEvent, GamePhase, TerminalCause};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Key presses since the previous tick, oldest first
    pub keys: Vec<char>,
    /// Pause toggle
    pub pause: bool,
    /// Restart after the run ended
    pub restart: bool,
}

impl TickInput {
    pub fn key(key: char) -> Self {
        Self {
            keys: vec![key],
            ..Default::default()
        }
    }
}

impl GameSession {
    /// Advance the session by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        // Handle pause toggle
        if input.pause {
            match self.state.phase {
                GamePhase::Tutorial | GamePhase::Countdown | GamePhase::Playing => {
                    self.state.resume_phase = Some(self.state.phase);
                    self.state.phase = GamePhase::Paused;
                    self.events.push(GameEvent::Paused);
                    return;
                }
                GamePhase::Paused => {
                    self.state.phase = self.state.resume_phase.take().unwrap_or(GamePhase::Playing);
                    self.events.push(GameEvent::Resumed);
                }
                GamePhase::Terminal => {}
            }
        }

        match self.state.phase {
            GamePhase::Paused => return,
            GamePhase::Terminal => {
                if input.restart {
                    self.restart();
                }
                return;
            }
            _ => {}
        }

        self.state.time_ticks += 1;
        self.state.clock += f64::from(dt);

        match self.state.phase {
            GamePhase::Tutorial => self.tick_tutorial(input),
            GamePhase::Countdown => self.tick_countdown(dt),
            GamePhase::Playing => self.tick_playing(input, dt),
            GamePhase::Paused | GamePhase::Terminal => {}
        }
    }

    fn tick_tutorial(&mut self, input: &TickInput) {
        for key in normalized(&input.keys) {
            if let Some(c) = self.take_challenge(key) {
                self.events.push(GameEvent::Hit {
                    key: c.key,
                    points: 0,
                    reaction_time: (self.state.clock - c.spawn_time) as f32,
                });
            }
        }

        if self.challenges.is_empty() {
            log::debug!("Tutorial cleared");
            self.state.phase = GamePhase::Countdown;
            self.state.countdown = COUNTDOWN_SECS;
            self.events.push(GameEvent::TutorialCleared);
            self.events.push(GameEvent::CountdownTick {
                remaining: COUNTDOWN_SECS.ceil() as u32,
            });
        }
    }

    fn tick_countdown(&mut self, dt: f32) {
        let before = self.state.countdown.ceil();
        self.state.countdown -= dt;
        if self.state.countdown <= 0.0 {
            self.state.countdown = 0.0;
            self.state.phase = GamePhase::Playing;
            self.events.push(GameEvent::PlayStarted);
            log::debug!("Countdown finished, playing");
        } else if self.state.countdown.ceil() < before {
            self.events.push(GameEvent::CountdownTick {
                remaining: self.state.countdown.ceil() as u32,
            });
        }
    }

    fn tick_playing(&mut self, input: &TickInput, dt: f32) {
        self.state.play_time += dt;
        let now = self.state.clock;

        // Spawn
        let rate = self.pacing.pacing().spawn_rate.max(1);
        if self.rng.random::<f32>() < 1.0 / rate as f32 {
            let speed = self.pacing.pacing().obstacle_speed;
            if let Some(c) =
                self.spawner
                    .try_spawn(&self.challenges, &mut self.pool, speed, &mut self.rng, now)
            {
                self.clock.start(c.id, now);
                self.events.push(GameEvent::Spawned {
                    id: c.id,
                    key: c.key,
                    kind: c.kind,
                });
                self.challenges.push(c);
            }
        }

        // Advance and expire
        for c in &mut self.challenges {
            c.advance(dt);
        }
        let mut exited = Vec::new();
        self.challenges.retain(|c| {
            if c.has_exited() {
                exited.push(c.clone());
                false
            } else {
                true
            }
        });
        for c in exited {
            self.expire(c);
        }

        // Input
        for key in normalized(&input.keys) {
            if self.state.lives == 0 {
                break;
            }
            if let Some(c) = self.take_challenge(key) {
                self.resolve_key(c);
            }
        }

        // Retune and move the hazard
        let window_before = self.pacing.pacing().response_window;
        let distance = self.distance_to_hazard();
        let pacing = *self
            .pacing
            .retune(self.state.score, distance, self.clock.recent());
        if pacing.response_window != window_before {
            self.events.push(GameEvent::WindowRetuned {
                window: pacing.response_window,
            });
        }

        let step = self
            .hazard
            .tick(dt, pacing.hazard_speed, self.state.player_altitude);
        if step.awoke {
            self.events.push(GameEvent::HazardAwake);
        }
        if step.overtook {
            self.events.push(GameEvent::HazardOvertook);
        }

        // Terminal check
        let cause = TerminalCause {
            out_of_lives: self.state.lives == 0,
            overtaken: step.overtook,
        };
        if cause.any() {
            self.finish(cause);
        }
    }

    /// Remove the active challenge showing `key` and return its key to the pool
    fn take_challenge(&mut self, key: char) -> Option<Challenge> {
        let idx = self.challenges.iter().position(|c| c.key == key)?;
        let c = self.challenges.remove(idx);
        self.pool.give_back(c.key);
        Some(c)
    }

    fn resolve_key(&mut self, c: Challenge) {
        let now = self.state.clock;
        match c.kind {
            ChallengeKind::Regular => {
                let reaction_time = self.clock.resolve(c.id, Outcome::Hit, now);
                let points = points_for(reaction_time, self.pacing.pacing().response_window);
                self.state.score += u64::from(points);
                self.state.correct_count += 1;
                self.state.player_altitude += CLIMB_STEP;
                self.hazard.push_back();
                self.events.push(GameEvent::Hit {
                    key: c.key,
                    points,
                    reaction_time,
                });
            }
            ChallengeKind::Trap => {
                self.clock.resolve(c.id, Outcome::WrongKey, now);
                self.state.lose_life();
                self.events.push(GameEvent::TrapHit { key: c.key });
            }
        }
    }

    fn expire(&mut self, c: Challenge) {
        self.pool.give_back(c.key);
        self.clock.resolve(c.id, Outcome::Timeout, self.state.clock);
        match c.kind {
            ChallengeKind::Regular => {
                self.state.lose_life();
                self.events.push(GameEvent::Miss { key: c.key });
                let surge = self.hazard.speed_up();
                self.events.push(GameEvent::HazardSurge { speed: surge });
            }
            // Dodged
            ChallengeKind::Trap => {}
        }
    }

    fn finish(&mut self, cause: TerminalCause) {
        self.state.phase = GamePhase::Terminal;
        self.state.running = false;
        self.state.cause = cause;

        let entry = self.final_entry();
        let rank = self.ledger.potential_rank(entry.score);
        self.ledger.record(entry);

        log::info!(
            "Run over: score={}, out_of_lives={}, overtaken={}, rank={:?}",
            self.state.score,
            cause.out_of_lives,
            cause.overtaken,
            rank
        );
        self.events.push(GameEvent::GameOver {
            score: self.state.score,
            rank,
        });
    }
}

fn normalized(keys: &[char]) -> impl Iterator<Item = char> + '_ {
    keys.iter().map(|k| k.to_ascii_uppercase())
}
