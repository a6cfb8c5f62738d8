//! Keyscale terminal frontend
//!
//! `keyscale start` runs the reflex drill, `keyscale climb` the climbing game.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use keyscale::audio::{AudioManager, SoundEffect, TerminalBell};
use keyscale::consts::*;
use keyscale::persistence::{
    Board, FallbackStore, FileStore, RemoteStore, ScoreStore, StoreError, join_saves, load_ledger,
    spawn_save, sync_board,
};
use keyscale::platform::{
    DataPaths, InputFrame, TerminalGuard, climb_lines, describe_drill_event, drill_lines, input,
};
use keyscale::sim::{DrillEvent, GameEvent, GameSession, ReflexDrill, SessionConfig};
use keyscale::{Difficulty, Settings};

/// Target frame time for the terminal loop
const FRAME: Duration = Duration::from_millis(16);
/// Feedback lines kept on the drill screen
const FEEDBACK_LINES: usize = 4;
/// Checkpoint signalled once a frame has been drawn
const FRAME_DRAWN: &str = "frame-drawn";

#[derive(Parser, Debug)]
#[command(name = "keyscale")]
#[command(version, about = "Reflex typing games: a quick drill and a climb away from rising lava")]
struct Cli {
    /// Directory for settings and local scores
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Score API base URL (overrides settings)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep scores local only
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reflex drill: one key at a time
    Start {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Climb away from the lava by typing falling keys
    Climb {
        #[arg(long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Skip the warm-up letters
        #[arg(long)]
        no_tutorial: bool,
    },
    /// Print a leaderboard
    Highscores {
        #[arg(long, value_parser = parse_board, default_value = "game")]
        board: Board,
    },
    /// Merge local scores into the remote leaderboard
    Sync {
        /// Board to sync; both when omitted
        #[arg(long, value_parser = parse_board)]
        board: Option<Board>,
    },
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{}' (easy, medium, hard)", s))
}

fn parse_board(s: &str) -> Result<Board, String> {
    Board::from_str(s).ok_or_else(|| format!("unknown board '{}' (cli, game)", s))
}

/// Resolved paths and settings shared by every command
struct App {
    paths: DataPaths,
    settings: Settings,
    api_url: Option<String>,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let paths = DataPaths::resolve(cli.data_dir.as_deref()).context("resolving data directory")?;
        let settings_path = paths.settings();
        let settings = Settings::load(&settings_path);
        if !settings_path.exists() {
            if let Err(e) = settings.save(&settings_path) {
                log::warn!("Could not write default settings: {}", e);
            }
        }
        let api_url = if cli.offline {
            None
        } else {
            cli.api_url.clone().or_else(|| settings.api_url.clone())
        };
        Ok(Self {
            paths,
            settings,
            api_url,
        })
    }

    fn local_store(&self, board: Board) -> FileStore {
        FileStore::new(self.paths.scores(board))
    }

    fn remote_store(&self, board: Board) -> Option<Result<RemoteStore, StoreError>> {
        self.api_url
            .as_deref()
            .map(|url| RemoteStore::new(url, board, self.settings.retry_policy()))
    }

    /// Remote store backed by the local file, or the file alone
    fn score_store(&self, board: Board) -> Arc<dyn ScoreStore> {
        let local = self.local_store(board);
        match self.remote_store(board) {
            Some(Ok(remote)) => Arc::new(FallbackStore::new(Box::new(remote), Box::new(local))),
            Some(Err(e)) => {
                log::warn!("Score API unavailable ({}), keeping scores local", e);
                Arc::new(local)
            }
            None => Arc::new(local),
        }
    }

    /// Name from the command line, else the remembered one; remembers it
    fn player_name(&mut self, name: Option<String>) -> String {
        let name = keyscale::sanitize_name(name.as_deref().unwrap_or(&self.settings.player_name));
        if name != self.settings.player_name {
            self.settings.player_name = name.clone();
            if let Err(e) = self.settings.save(&self.paths.settings()) {
                log::warn!("Could not save settings: {}", e);
            }
        }
        name
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn run_climb(
    app: &mut App,
    difficulty: Option<Difficulty>,
    name: Option<String>,
    seed: Option<u64>,
    no_tutorial: bool,
) -> Result<()> {
    let store = app.score_store(Board::Game);
    let ledger = load_ledger(store.as_ref());
    let config = SessionConfig {
        tier: difficulty.unwrap_or(app.settings.difficulty).tier(),
        player_name: app.player_name(name),
        tutorial: app.settings.tutorial && !no_tutorial,
        tile_size: app.settings.tile_size(),
        seed: seed.unwrap_or_else(clock_seed),
        ..Default::default()
    };
    let mut session = GameSession::new(config, ledger);
    let mut audio = AudioManager::from_settings(&app.settings, Box::new(TerminalBell::new(io::stdout())));
    let mut saves = Vec::new();

    let mut term = TerminalGuard::begin().context("entering terminal mode")?;
    let mut accumulator = 0.0;
    let mut last = Instant::now();
    let mut pending = InputFrame::default();

    loop {
        let frame = input::drain()?;
        if frame.quit || (session.is_over() && frame.pause) {
            break;
        }
        pending.absorb(frame);

        let now = Instant::now();
        accumulator += now.duration_since(last).as_secs_f32().min(0.1);
        last = now;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            session.tick(&pending.tick_input(), SIM_DT);
            pending = InputFrame::default();
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in session.drain_events() {
            match &event {
                GameEvent::GameOver { rank, .. } => {
                    let cue = if rank.is_some() {
                        SoundEffect::HighScore
                    } else {
                        SoundEffect::GameOver
                    };
                    audio.defer_until(FRAME_DRAWN, cue);
                    saves.push(spawn_save(store.clone(), session.ledger().entries().to_vec())?);
                }
                _ => audio.on_event(&event),
            }
        }

        let (cols, rows) = term.size()?;
        term.draw(&climb_lines(&session.snapshot(), cols, rows))?;
        audio.checkpoint_reached(FRAME_DRAWN);
        thread::sleep(FRAME);
    }

    term.end()?;
    println!("{}", session.ledger().table());
    join_saves(saves).context("saving scores")
}

fn run_drill(app: &mut App, name: Option<String>, seed: Option<u64>) -> Result<()> {
    let store = app.score_store(Board::Cli);
    let ledger = load_ledger(store.as_ref());
    let name = app.player_name(name);
    let mut drill = ReflexDrill::new(&name, ledger, seed.unwrap_or_else(clock_seed));
    let mut audio = AudioManager::from_settings(&app.settings, Box::new(TerminalBell::new(io::stdout())));
    let mut saves = Vec::new();
    let mut feedback: VecDeque<String> = VecDeque::new();

    let mut term = TerminalGuard::begin().context("entering terminal mode")?;
    let mut accumulator = 0.0;
    let mut last = Instant::now();
    let mut pending = InputFrame::default();

    loop {
        let frame = input::drain()?;
        if frame.quit || frame.pause {
            break;
        }
        if drill.is_over() && frame.restart {
            drill.restart();
            feedback.clear();
        }
        pending.absorb(frame);

        let now = Instant::now();
        accumulator += now.duration_since(last).as_secs_f32().min(0.1);
        last = now;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            drill.tick(&pending.keys, SIM_DT);
            pending = InputFrame::default();
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in drill.drain_events() {
            audio.on_drill_event(&event);
            if let Some(line) = describe_drill_event(&event) {
                feedback.push_back(line);
                if feedback.len() > FEEDBACK_LINES {
                    feedback.pop_front();
                }
            }
            if matches!(event, DrillEvent::Over { .. }) {
                saves.push(spawn_save(store.clone(), drill.ledger().entries().to_vec())?);
            }
        }

        let lines: Vec<String> = feedback.iter().cloned().collect();
        term.draw(&drill_lines(&drill, &lines))?;
        thread::sleep(FRAME);
    }

    term.end()?;
    println!("{}", drill.ledger().table());
    join_saves(saves).context("saving scores")
}

fn show_highscores(app: &App, board: Board) -> Result<()> {
    let ledger = load_ledger(app.score_store(board).as_ref());
    if ledger.is_empty() {
        println!("No {} scores yet", board);
    } else {
        println!("Top {} scores\n", board);
        print!("{}", ledger.table());
    }
    Ok(())
}

fn sync(app: &App, board: Option<Board>) -> Result<()> {
    let boards = match board {
        Some(board) => vec![board],
        None => Board::ALL.to_vec(),
    };
    for board in boards {
        let Some(remote) = app.remote_store(board) else {
            bail!("no score API configured (use --api-url or set api_url in settings)");
        };
        let remote = remote.context("creating HTTP client")?;
        let ledger = sync_board(&app.local_store(board), &remote)
            .with_context(|| format!("syncing {} scores with {}", board, remote.url()))?;
        println!("Synced {} scores: {} entries", board, ledger.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut app = App::new(&cli)?;
    log::info!("Data directory: {}", app.paths.dir.display());

    match cli.command {
        Command::Start { name, seed } => run_drill(&mut app, name, seed),
        Command::Climb {
            difficulty,
            name,
            seed,
            no_tutorial,
        } => run_climb(&mut app, difficulty, name, seed, no_tutorial),
        Command::Highscores { board } => show_highscores(&app, board),
        Command::Sync { board } => sync(&app, board),
    }
}
