//! Move Blocks and Eat Stuff headless host
//!
//! Level pack tools and windowless replay of input recordings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use mbes::persistence::{Recording, load_levels, load_progress, load_recording, save_completions, save_levels, save_recording};
use mbes::sim::{Events, Impulse, LevelState, TickInput, exec_frame};
use mbes::{Progress, Settings};

#[derive(Debug, Parser)]
#[command(name = "mbes", version, about = "Move Blocks and Eat Stuff: level tools and headless replay")]
struct Args {
    /// Settings file (JSON). Defaults are used if it is missing.
    #[arg(short, long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the levels in a pack with their completion state
    Info {
        /// Level pack; defaults to the one named in the settings
        levels: Option<PathBuf>,
    },
    /// Write a pack of blank walled levels
    New {
        out: PathBuf,
        #[arg(long, default_value = "1", value_name = "N")]
        count: usize,
        #[arg(long, default_value_t = mbes::consts::DEFAULT_WIDTH, value_name = "COLS")]
        width: u32,
        #[arg(long, default_value_t = mbes::consts::DEFAULT_HEIGHT, value_name = "ROWS")]
        height: u32,
    },
    /// Encode a move string as a recording. U/D/L/R move, '.' waits, and a
    /// lowercase letter (or ',') also drops a bomb.
    Record { out: PathBuf, moves: String },
    /// Play a recording against a level and report the result
    Replay {
        levels: PathBuf,
        recording: PathBuf,
        #[arg(long, default_value = "0", value_name = "N")]
        level: usize,
        /// Frames to rewind after the recording ends
        #[arg(long, value_name = "K")]
        rewind: Option<u64>,
        /// Print the final grid
        #[arg(long)]
        show: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Record a win in the progress file named in the settings
        #[arg(long)]
        save_progress: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    match args.command {
        Command::Info { levels } => info(&settings, levels),
        Command::New { out, count, width, height } => {
            if width == 0 || height == 0 {
                bail!("level dimensions must be non-zero");
            }
            let levels = vec![LevelState::new(width, height, 1, 1); count];
            save_levels(&out, &levels).with_context(|| format!("writing {}", out.display()))?;
            Ok(())
        }
        Command::Record { out, moves } => {
            let recording = parse_moves(&moves)?;
            save_recording(&out, &recording).with_context(|| format!("writing {}", out.display()))?;
            println!("{} frames", recording.len());
            Ok(())
        }
        Command::Replay { levels, recording, level, rewind, show, json, save_progress } => {
            let opts = ReplayOptions { level, rewind, show, json, save_progress };
            replay(&settings, &levels, &recording, &opts)
        }
    }
}

fn info(settings: &Settings, levels: Option<PathBuf>) -> Result<()> {
    let path = levels.unwrap_or_else(|| settings.levels_path.clone());
    let levels = load_levels(&path).with_context(|| format!("reading {}", path.display()))?;
    let progress = open_progress(settings, levels.len());

    for (i, level) in levels.iter().enumerate() {
        let state = progress.get(i).map(|r| r.state.as_str()).unwrap_or("-");
        println!(
            "{i:3}: {}x{}  items {}  red bombs {}  {}  {}",
            level.width,
            level.height,
            level.items_remaining,
            level.red_bombs,
            if level.validate() { "ok" } else { "corrupt" },
            state,
        );
    }
    println!("{}/{} completed", progress.num_completed(), levels.len());
    Ok(())
}

struct ReplayOptions {
    level: usize,
    rewind: Option<u64>,
    show: bool,
    json: bool,
    save_progress: bool,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    level: usize,
    frames: u64,
    won: bool,
    alive: bool,
    items_remaining: i32,
    red_bombs: i32,
    pending_explosions: usize,
    rewind_count: u64,
    entropy: usize,
    attenuated_space: usize,
    events: Vec<&'static str>,
}

fn replay(settings: &Settings, levels_path: &Path, recording_path: &Path, opts: &ReplayOptions) -> Result<()> {
    let levels = load_levels(levels_path).with_context(|| format!("reading {}", levels_path.display()))?;
    let Some(level) = levels.get(opts.level) else {
        bail!("{} has no level {}", levels_path.display(), opts.level);
    };
    if !level.validate() {
        bail!("level {} has no player", opts.level);
    }
    let recording =
        load_recording(recording_path).with_context(|| format!("reading {}", recording_path.display()))?;

    let mut state = level.clone();
    state.lose_buffer_secs = settings.lose_buffer_secs;
    let mut seen = Events::empty();
    for input in recording.iter() {
        seen |= exec_frame(&mut state, input);
        if state.player_did_win {
            break;
        }
    }
    let won = state.player_did_win;

    if won && opts.save_progress {
        let mut progress = open_progress(settings, levels.len());
        progress.record_win(opts.level, &state);
        save_completions(&settings.progress_path, &progress.levels)
            .with_context(|| format!("writing {}", settings.progress_path.display()))?;
    }
    if let Some(frames) = opts.rewind {
        state.rewind_frames(frames);
    }

    let report = ReplayReport {
        level: opts.level,
        frames: state.frames_executed,
        won,
        alive: state.player_is_alive(),
        items_remaining: state.items_remaining,
        red_bombs: state.red_bombs,
        pending_explosions: state.explosions.len(),
        rewind_count: state.rewind_count,
        entropy: state.compute_entropy(),
        attenuated_space: state.count_attenuated_space(),
        events: seen.names(),
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("level {}: {} frames", report.level, report.frames);
        println!("  won: {}  alive: {}", report.won, report.alive);
        println!("  items remaining: {}  red bombs: {}", report.items_remaining, report.red_bombs);
        println!("  entropy: {}  attenuated space: {}", report.entropy, report.attenuated_space);
        println!("  events: {}", report.events.join(" "));
    }
    if opts.show {
        print!("{state}");
    }
    Ok(())
}

/// Completion records for the pack; unreadable records count as none
fn open_progress(settings: &Settings, num_levels: usize) -> Progress {
    match load_progress(&settings.progress_path, settings.legacy_progress_path.as_deref(), num_levels) {
        Ok(progress) => progress,
        Err(e) => {
            log::warn!("Ignoring completion records: {e}");
            Progress::new(num_levels)
        }
    }
}

fn parse_moves(moves: &str) -> Result<Recording> {
    moves
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            let impulse = match c.to_ascii_uppercase() {
                'U' => Impulse::Up,
                'D' => Impulse::Down,
                'L' => Impulse::Left,
                'R' => Impulse::Right,
                '.' | ',' => Impulse::None,
                other => bail!("unknown move '{other}'"),
            };
            Ok(TickInput { impulse, drop_bomb: c.is_ascii_lowercase() || c == ',' })
        })
        .collect()
}
