//! Sound cues
//!
//! Game events map to sound effects; a backend turns them into noise. The
//! terminal backend rings the bell for the cues that matter. A cue can also
//! wait for an animation checkpoint signalled by the frontend.

use std::io::Write;

use crate::settings::Settings;
use crate::sim::{DrillEvent, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// New challenge or prompt appeared
    Spawn,
    /// Correct key
    Hit,
    /// Challenge escaped or prompt answered wrong/too late
    Miss,
    /// Trap key pressed
    TrapHit,
    /// Hazard reached the player
    HazardOvertook,
    /// Hazard got faster
    SpeedUp,
    /// Countdown second elapsed
    CountdownTick,
    /// Game over
    GameOver,
    /// New high score
    HighScore,
}

impl SoundEffect {
    /// Cues worth interrupting the player for
    pub fn is_loud(&self) -> bool {
        matches!(
            self,
            SoundEffect::Miss
                | SoundEffect::TrapHit
                | SoundEffect::HazardOvertook
                | SoundEffect::GameOver
                | SoundEffect::HighScore
        )
    }

    /// Cue for a climb event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Spawned { .. } => Some(SoundEffect::Spawn),
            GameEvent::Hit { .. } => Some(SoundEffect::Hit),
            GameEvent::Miss { .. } => Some(SoundEffect::Miss),
            GameEvent::TrapHit { .. } => Some(SoundEffect::TrapHit),
            GameEvent::CountdownTick { .. } => Some(SoundEffect::CountdownTick),
            GameEvent::HazardSurge { .. } => Some(SoundEffect::SpeedUp),
            GameEvent::HazardOvertook => Some(SoundEffect::HazardOvertook),
            GameEvent::GameOver { rank: Some(_), .. } => Some(SoundEffect::HighScore),
            GameEvent::GameOver { rank: None, .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }

    /// Cue for a drill event, if it has one
    pub fn for_drill_event(event: &DrillEvent) -> Option<Self> {
        match event {
            DrillEvent::Prompt { .. } => Some(SoundEffect::Spawn),
            DrillEvent::Correct { .. } => Some(SoundEffect::Hit),
            DrillEvent::WrongKey { .. } | DrillEvent::TooSlow { .. } => Some(SoundEffect::Miss),
            DrillEvent::WindowRetuned { harder: true, .. } => Some(SoundEffect::SpeedUp),
            DrillEvent::Over { rank: Some(_), .. } => Some(SoundEffect::HighScore),
            DrillEvent::Over { rank: None, .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }
}

/// Something that can make a sound
pub trait SoundBackend: Send {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Silent backend
#[derive(Debug, Default)]
pub struct NullBackend;

impl SoundBackend for NullBackend {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Rings the terminal bell for loud cues
pub struct TerminalBell<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> SoundBackend for TerminalBell<W> {
    fn play(&mut self, effect: SoundEffect, _volume: f32) {
        if !effect.is_loud() {
            return;
        }
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            log::debug!("Bell failed: {}", e);
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Box<dyn SoundBackend>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Cues waiting for a named checkpoint
    pending: Vec<(String, SoundEffect)>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullBackend))
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn SoundBackend>) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            pending: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings, backend: Box<dyn SoundBackend>) -> Self {
        let mut audio = Self::new(backend);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.backend.play(effect, vol);
    }

    pub fn on_event(&mut self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    pub fn on_drill_event(&mut self, event: &DrillEvent) {
        if let Some(effect) = SoundEffect::for_drill_event(event) {
            self.play(effect);
        }
    }

    /// Hold `effect` until `checkpoint` is reached
    pub fn defer_until(&mut self, checkpoint: &str, effect: SoundEffect) {
        self.pending.push((checkpoint.to_string(), effect));
    }

    /// Play every cue waiting on `checkpoint`; returns how many were released
    pub fn checkpoint_reached(&mut self, checkpoint: &str) -> usize {
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(name, _)| name == checkpoint);
        self.pending = waiting;
        for (_, effect) in &ready {
            self.play(*effect);
        }
        ready.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
