//! Keyboard input
//!
//! Drains pending terminal events without blocking and folds them into
//! per-frame commands.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::TickInput;

/// One decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Letter or other printable key
    Key(char),
    /// Esc toggles pause (and leaves a finished run)
    Pause,
    /// Enter starts over after a run ends
    Restart,
    /// Ctrl+C
    Quit,
}

/// Everything pressed since the last frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub keys: Vec<char>,
    pub pause: bool,
    pub restart: bool,
    pub quit: bool,
}

impl InputFrame {
    pub fn from_commands<I: IntoIterator<Item = Command>>(commands: I) -> Self {
        let mut frame = Self::default();
        for cmd in commands {
            match cmd {
                Command::Key(c) => frame.keys.push(c),
                // Two presses in one frame cancel out
                Command::Pause => frame.pause = !frame.pause,
                Command::Restart => frame.restart = true,
                Command::Quit => frame.quit = true,
            }
        }
        frame
    }

    /// Fold a later frame into this one, for frames that ran no substep
    pub fn absorb(&mut self, later: InputFrame) {
        self.keys.extend(later.keys);
        self.pause ^= later.pause;
        self.restart |= later.restart;
        self.quit |= later.quit;
    }

    /// Session input for the first substep of a frame
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            keys: self.keys.clone(),
            pause: self.pause,
            restart: self.restart,
        }
    }
}

/// Decode a key event; releases and unmapped keys give None
pub fn translate(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(Command::Pause),
        KeyCode::Enter => Some(Command::Restart),
        KeyCode::Char(c) if !c.is_control() => Some(Command::Key(c)),
        _ => None,
    }
}

/// Read every queued key event without waiting
pub fn drain() -> io::Result<InputFrame> {
    let mut commands = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if let Some(cmd) = translate(key) {
                commands.push(cmd);
            }
            if commands.len() >= 32 {
                break;
            }
        }
    }
    Ok(InputFrame::from_commands(commands))
}
