//! Terminal reflex drill
//!
//! The stripped-down variant: one prompt at a time, no hazard. A random
//! get-ready delay, then a key and a response window. Correct answers score
//! by speed, wrong keys and timeouts cost a life, and the window adapts to
//! the player's recent reaction times.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::clock::{Outcome, ReflexClock, points_for};
use super::pacing::DifficultyController;
use crate::consts::*;
use crate::highscores::{ScoreEntry, ScoreLedger};
use crate::tuning::DifficultyTier;

/// Longest get-ready delay (seconds)
pub const MAX_READY_DELAY: f32 = 5.0;
/// Pause after each answer (seconds)
pub const FEEDBACK_SECS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyStage {
    Ready,
    Set,
    Go,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrillPhase {
    GetReady { stage: ReadyStage, remaining: f32 },
    Prompt { key: char, started: f64 },
    Feedback { remaining: f32 },
    Over,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillEvent {
    Stage(ReadyStage),
    Prompt { key: char, window: f32 },
    Correct { key: char, reaction_time: f32, points: u32, score: u64 },
    WrongKey { expected: char, pressed: char, lives: u8 },
    TooSlow { key: char, lives: u8 },
    /// Window moved; `harder` when it shrank
    WindowRetuned { window: f32, harder: bool },
    Over { score: u64, rank: Option<usize> },
}

pub struct ReflexDrill {
    player_name: String,
    phase: DrillPhase,
    lives: u8,
    score: u64,
    letters: u32,
    clock: ReflexClock,
    pacing: DifficultyController,
    ledger: ScoreLedger,
    rng: Pcg32,
    now: f64,
    stage_len: f32,
    next_prompt: u32,
    events: Vec<DrillEvent>,
}

impl ReflexDrill {
    pub fn new(player_name: &str, ledger: ScoreLedger, seed: u64) -> Self {
        let mut drill = Self {
            player_name: crate::sanitize_name(player_name),
            phase: DrillPhase::Over,
            lives: START_LIVES,
            score: 0,
            letters: 0,
            clock: ReflexClock::new(),
            pacing: DifficultyController::new(DifficultyTier::default()),
            ledger,
            rng: Pcg32::seed_from_u64(seed),
            now: 0.0,
            stage_len: 0.0,
            next_prompt: 1,
            events: Vec::new(),
        };
        drill.get_ready();
        drill
    }

    /// Start over with the same player and ledger
    pub fn restart(&mut self) {
        self.lives = START_LIVES;
        self.score = 0;
        self.letters = 0;
        self.clock.reset();
        self.pacing = DifficultyController::new(DifficultyTier::default());
        self.events.clear();
        self.get_ready();
    }

    pub fn phase(&self) -> DrillPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == DrillPhase::Over
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn window(&self) -> f32 {
        self.pacing.pacing().response_window
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn average_reaction(&self) -> f32 {
        self.clock.average()
    }

    pub fn drain_events(&mut self) -> Vec<DrillEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn final_entry(&self) -> ScoreEntry {
        ScoreEntry {
            name: self.player_name.clone(),
            score: self.score,
            letters: self.letters,
            avg_time: (self.clock.average() * 100.0).round() / 100.0,
            difficulty: None,
        }
    }

    fn get_ready(&mut self) {
        // Three equal stages: ready, set, then the prompt itself
        let delay = self.rng.random_range(0.0..MAX_READY_DELAY);
        self.stage_len = delay / 3.0;
        self.phase = DrillPhase::GetReady {
            stage: ReadyStage::Ready,
            remaining: self.stage_len,
        };
        self.events.push(DrillEvent::Stage(ReadyStage::Ready));
    }

    fn prompt(&mut self) {
        let key = ALPHABET[self.rng.random_range(0..ALPHABET.len())];
        self.clock.start(self.next_prompt, self.now);
        self.phase = DrillPhase::Prompt {
            key,
            started: self.now,
        };
        self.events.push(DrillEvent::Stage(ReadyStage::Go));
        self.events.push(DrillEvent::Prompt {
            key,
            window: self.window(),
        });
    }

    /// Advance by `dt` seconds with the keys pressed since the last tick
    pub fn tick(&mut self, keys: &[char], dt: f32) {
        if self.is_over() {
            return;
        }
        self.now += f64::from(dt);

        match self.phase {
            DrillPhase::GetReady { stage, remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = DrillPhase::GetReady { stage, remaining };
                    return;
                }
                match stage {
                    ReadyStage::Ready => {
                        self.phase = DrillPhase::GetReady {
                            stage: ReadyStage::Set,
                            remaining: self.stage_len,
                        };
                        self.events.push(DrillEvent::Stage(ReadyStage::Set));
                    }
                    ReadyStage::Set | ReadyStage::Go => self.prompt(),
                }
            }
            DrillPhase::Prompt { key, started } => {
                let pressed = keys
                    .iter()
                    .map(|k| k.to_ascii_uppercase())
                    .find(|k| ALPHABET.contains(k));
                if let Some(pressed) = pressed {
                    if pressed == key {
                        self.answer_correct(key);
                    } else {
                        self.answer_wrong(key, pressed);
                    }
                } else if (self.now - started) as f32 >= self.window() {
                    self.answer_timeout(key);
                }
            }
            DrillPhase::Feedback { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = DrillPhase::Feedback { remaining };
                } else {
                    self.get_ready();
                }
            }
            DrillPhase::Over => {}
        }
    }

    fn answer_correct(&mut self, key: char) {
        let reaction_time = self.clock.resolve(self.next_prompt, Outcome::Hit, self.now);
        let points = points_for(reaction_time, self.window());
        self.score += u64::from(points);
        self.letters += 1;
        self.events.push(DrillEvent::Correct {
            key,
            reaction_time,
            points,
            score: self.score,
        });
        self.end_round();
    }

    fn answer_wrong(&mut self, expected: char, pressed: char) {
        self.clock.resolve(self.next_prompt, Outcome::WrongKey, self.now);
        self.lives = self.lives.saturating_sub(1);
        self.events.push(DrillEvent::WrongKey {
            expected,
            pressed,
            lives: self.lives,
        });
        self.end_round();
    }

    fn answer_timeout(&mut self, key: char) {
        self.clock.resolve(self.next_prompt, Outcome::Timeout, self.now);
        self.lives = self.lives.saturating_sub(1);
        self.events.push(DrillEvent::TooSlow {
            key,
            lives: self.lives,
        });
        self.end_round();
    }

    fn end_round(&mut self) {
        self.next_prompt += 1;
        let before = self.window();
        if let Some(window) = self.pacing.retune_window(self.clock.recent()) {
            self.events.push(DrillEvent::WindowRetuned {
                window,
                harder: window < before,
            });
        }

        if self.lives == 0 {
            let entry = self.final_entry();
            let rank = self.ledger.potential_rank(entry.score);
            self.ledger.record(entry);
            self.phase = DrillPhase::Over;
            log::info!("Drill over: score={}, letters={}", self.score, self.letters);
            self.events.push(DrillEvent::Over {
                score: self.score,
                rank,
            });
        } else {
            self.phase = DrillPhase::Feedback {
                remaining: FEEDBACK_SECS,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next_prompt(drill: &mut ReflexDrill) -> char {
        for _ in 0..400 {
            if let DrillPhase::Prompt { key, .. } = drill.phase() {
                return key;
            }
            drill.tick(&[], SIM_DT);
        }
        panic!("no prompt within 20 seconds");
    }

    fn other_key(key: char) -> char {
        if key == 'A' { 'B' } else { 'A' }
    }

    #[test]
    fn test_stages_lead_to_prompt() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 7);
        next_prompt(&mut drill);
        let events = drill.drain_events();
        assert_eq!(events[0], DrillEvent::Stage(ReadyStage::Ready));
        assert!(events.contains(&DrillEvent::Stage(ReadyStage::Set)));
        assert!(events.contains(&DrillEvent::Stage(ReadyStage::Go)));
        assert!(matches!(events.last(), Some(DrillEvent::Prompt { window, .. }) if *window == WINDOW_START));
    }

    #[test]
    fn test_correct_key_scores_by_speed() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 7);
        let key = next_prompt(&mut drill);
        drill.tick(&[key.to_ascii_lowercase()], SIM_DT);
        assert_eq!(drill.lives(), START_LIVES);
        assert!(drill.score() >= 490);
        assert!(matches!(drill.phase(), DrillPhase::Feedback { .. }));
        assert_eq!(drill.final_entry().letters, 1);
    }

    #[test]
    fn test_wrong_key_costs_a_life() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 3);
        let key = next_prompt(&mut drill);
        drill.tick(&[other_key(key)], SIM_DT);
        assert_eq!(drill.lives(), START_LIVES - 1);
        assert_eq!(drill.score(), 0);
        assert!(drill.drain_events().iter().any(|e| matches!(e, DrillEvent::WrongKey { expected, .. } if *expected == key)));
    }

    #[test]
    fn test_timeout_costs_a_life() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 11);
        next_prompt(&mut drill);
        let ticks = (WINDOW_START / SIM_DT) as u32 + 2;
        for _ in 0..ticks {
            drill.tick(&[], SIM_DT);
            if drill.lives() < START_LIVES {
                break;
            }
        }
        assert_eq!(drill.lives(), START_LIVES - 1);
        assert!(drill.drain_events().iter().any(|e| matches!(e, DrillEvent::TooSlow { .. })));
    }

    #[test]
    fn test_digits_ignored_during_prompt() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 5);
        next_prompt(&mut drill);
        drill.tick(&['7'], SIM_DT);
        assert_eq!(drill.lives(), START_LIVES);
        assert!(matches!(drill.phase(), DrillPhase::Prompt { .. }));
    }

    #[test]
    fn test_quick_hits_shrink_window() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 13);
        for _ in 0..MIN_REACTION_SAMPLES {
            let key = next_prompt(&mut drill);
            drill.tick(&[key], SIM_DT);
        }
        assert!(drill.window() < WINDOW_START);
        assert!(drill.window() >= WINDOW_MIN);
        assert!(drill.drain_events().iter().any(|e| matches!(e, DrillEvent::WindowRetuned { harder: true, .. })));
    }

    #[test]
    fn test_game_over_records_entry() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 21);
        let key = next_prompt(&mut drill);
        drill.tick(&[key], SIM_DT);
        for _ in 0..START_LIVES {
            let key = next_prompt(&mut drill);
            drill.tick(&[other_key(key)], SIM_DT);
        }
        assert!(drill.is_over());
        assert_eq!(drill.ledger().len(), 1);
        let entry = &drill.ledger().entries()[0];
        assert_eq!(entry.name, "tester");
        assert_eq!(entry.letters, 1);
        assert_eq!(entry.difficulty, None);
        let events = drill.drain_events();
        assert!(matches!(events.last(), Some(DrillEvent::Over { rank: Some(1), .. })));

        // Over is inert until restart
        drill.tick(&['A'], SIM_DT);
        assert!(drill.is_over());
        drill.restart();
        assert_eq!(drill.lives(), START_LIVES);
        assert_eq!(drill.score(), 0);
        assert_eq!(drill.ledger().len(), 1);
    }

    #[test]
    fn test_zero_score_not_recorded() {
        let mut drill = ReflexDrill::new("tester", ScoreLedger::new(), 2);
        for _ in 0..START_LIVES {
            let key = next_prompt(&mut drill);
            drill.tick(&[other_key(key)], SIM_DT);
        }
        assert!(drill.is_over());
        assert!(drill.ledger().is_empty());
    }

    #[test]
    fn test_same_seed_same_prompts() {
        let mut a = ReflexDrill::new("a", ScoreLedger::new(), 99);
        let mut b = ReflexDrill::new("b", ScoreLedger::new(), 99);
        for _ in 0..5 {
            let ka = next_prompt(&mut a);
            let kb = next_prompt(&mut b);
            assert_eq!(ka, kb);
            a.tick(&[ka], SIM_DT);
            b.tick(&[kb], SIM_DT);
        }
        assert_eq!(a.score(), b.score());
    }
}
