//! Terminal output
//!
//! Frames are built as plain lines so they can be checked without a
//! terminal, then written in one synchronized update.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};

use crate::consts::*;
use crate::sim::{ChallengeKind, DrillEvent, DrillPhase, GamePhase, ReadyStage, ReflexDrill, Snapshot};

/// Raw mode + alternate screen, restored on drop
pub struct TerminalGuard {
    out: Stdout,
    active: bool,
}

impl TerminalGuard {
    pub fn begin() -> io::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;
        Ok(Self { out, active: true })
    }

    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    pub fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        for (row, line) in lines.iter().enumerate() {
            queue!(
                self.out,
                cursor::MoveTo(0, row as u16),
                Print(line),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown), EndSynchronizedUpdate)?;
        self.out.flush()
    }

    pub fn end(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, Clear(ClearType::All), cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.end() {
            log::warn!("Failed to restore terminal: {}", e);
        }
    }
}

fn hearts(lives: u8) -> String {
    "♥".repeat(lives as usize)
}

/// Frame for a climb session
pub fn climb_lines(snapshot: &Snapshot, cols: u16, rows: u16) -> Vec<String> {
    let width = (cols as usize).max(20);
    let height = (rows as usize).saturating_sub(2).max(4);

    let mut lines = Vec::with_capacity(height + 2);
    lines.push(format!(
        "Score {:>6}  Lives {:<4}  Window {:.1}s  Gap {:>4.0}",
        snapshot.score,
        hearts(snapshot.lives),
        snapshot.response_window,
        snapshot.distance_to_hazard()
    ));

    let mut grid = vec![vec![' '; width]; height];

    // Lava creeps up as the gap closes
    let danger = (1.0 - snapshot.distance_to_hazard() / PLAYER_START_ALTITUDE).clamp(0.0, 1.0);
    let lava_rows = (danger * height as f32 / 3.0).round() as usize;
    for row in grid.iter_mut().rev().take(lava_rows) {
        row.fill('~');
    }

    for c in &snapshot.challenges {
        if c.pos.y < 0.0 {
            continue;
        }
        let col = ((c.pos.x / PLAY_WIDTH) * (width - 1) as f32) as usize;
        let row = ((c.pos.y / PLAY_HEIGHT) * height as f32) as usize;
        if row < height && col < width {
            grid[row][col] = match c.kind {
                ChallengeKind::Regular => c.key,
                ChallengeKind::Trap => c.key.to_ascii_lowercase(),
            };
        }
    }
    lines.extend(grid.into_iter().map(|row| row.into_iter().collect::<String>()));

    let status = match snapshot.phase {
        GamePhase::Tutorial => "Warm up: type the letters".to_string(),
        GamePhase::Countdown => format!("Starting in {}", snapshot.countdown.ceil().max(1.0) as u32),
        GamePhase::Playing => "UPPERCASE: type it   lowercase: trap, let it fall   Esc: pause".to_string(),
        GamePhase::Paused => "Paused. Esc resumes".to_string(),
        GamePhase::Terminal => format!("Game over! Score {}. Enter restarts, Esc quits", snapshot.score),
    };
    lines.push(status);
    lines
}

/// One-line description of a drill event, for the feedback line
pub fn describe_drill_event(event: &DrillEvent) -> Option<String> {
    match event {
        DrillEvent::Correct {
            reaction_time,
            points,
            ..
        } => Some(format!("Correct! {:.2}s, +{} points", reaction_time, points)),
        DrillEvent::WrongKey { expected, pressed, lives } => Some(format!(
            "Wrong key: {} instead of {}. {} lives left",
            pressed, expected, lives
        )),
        DrillEvent::TooSlow { key, lives } => {
            Some(format!("Too slow! The key was {}. {} lives left", key, lives))
        }
        DrillEvent::WindowRetuned { window, harder } => Some(format!(
            "{} Window is now {:.1}s",
            if *harder { "Speeding up!" } else { "Easing off." },
            window
        )),
        DrillEvent::Over { score, rank } => Some(match rank {
            Some(rank) => format!("New high score #{}: {} points", rank, score),
            None => format!("Final score: {} points", score),
        }),
        _ => None,
    }
}

/// Frame for the reflex drill
pub fn drill_lines(drill: &ReflexDrill, feedback: &[String]) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Score {:>6}  Lives {:<4}  Window {:.1}s  Avg {:.2}s",
            drill.score(),
            hearts(drill.lives()),
            drill.window(),
            drill.average_reaction()
        ),
        String::new(),
    ];
    let center = match drill.phase() {
        DrillPhase::GetReady {
            stage: ReadyStage::Ready,
            ..
        } => "Ready...".to_string(),
        DrillPhase::GetReady { .. } => "Set...".to_string(),
        DrillPhase::Prompt { key, .. } => format!("Type: {}", key),
        DrillPhase::Feedback { .. } => String::new(),
        DrillPhase::Over => "Game over. Enter restarts, Esc quits".to_string(),
    };
    lines.push(format!("    {}", center));
    lines.push(String::new());
    lines.extend(feedback.iter().map(|line| format!("  {}", line)));
    lines
}
