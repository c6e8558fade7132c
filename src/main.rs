//! Traffic Therapy
//!
//! Command-line front end for a sliding-block puzzle: a 1x1 target block must
//! leave the grid through a single exit while obstacles slide along their long
//! axis. Solves and validates level files, shows boards and optimal lines,
//! plays scripted moves, and keeps campaign progress on disk.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use traffic_therapy::board::{block_char, format_state, BlockId, Board, TARGET};
use traffic_therapy::level::{Cell, Level};
use traffic_therapy::levels;
use traffic_therapy::progress::{Progress, PROGRESS_FILE};
use traffic_therapy::session::{MoveOutcome, Session};
use traffic_therapy::solver::{self, SearchOutcome, SolveOptions};

/// Solves, validates and plays Traffic Therapy levels.
#[derive(Parser)]
#[command(name = "traffic-therapy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Level file (one level or an array, JSON). Defaults to the built-in
    /// campaign.
    #[arg(long, global = true)]
    levels: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve levels and compare the optimal move count with par.
    Solve {
        /// Only solve this level.
        #[arg(long)]
        level: Option<u32>,
        /// Give up after this many distinct states.
        #[arg(long)]
        max_states: Option<usize>,
    },
    /// Print a level's starting board.
    Show {
        #[arg(long)]
        level: u32,
    },
    /// Print an optimal line of play.
    Hint {
        #[arg(long)]
        level: u32,
    },
    /// Play moves given as BLOCK:X,Y (BLOCK is `T`/`target` or the
    /// obstacle's number on the board).
    Play {
        #[arg(long)]
        level: u32,
        /// Where a win is recorded.
        #[arg(long, default_value = PROGRESS_FILE)]
        progress: PathBuf,
        moves: Vec<MoveArg>,
    },
    /// Validate every level and check that it is solvable within par.
    Validate,
    /// Print the levels as JSON in the level-file format.
    Export,
    /// Show or clear saved progress.
    Progress {
        #[arg(long, default_value = PROGRESS_FILE)]
        progress: PathBuf,
        #[arg(long)]
        clear: bool,
    },
}

/// A scripted move: a block and the cell it should slide to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MoveArg {
    block: BlockId,
    destination: Cell,
}

impl FromStr for MoveArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (block, cell) = s
            .split_once(':')
            .ok_or_else(|| format!("expected BLOCK:X,Y, got {s:?}"))?;

        let block = match block {
            "T" | "t" | "target" => TARGET,
            _ => parse_block_number(block).ok_or_else(|| format!("unknown block {block:?}"))?,
        };

        let (x, y) = cell
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y, got {cell:?}"))?;
        let coord = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|e| format!("bad coordinate {v:?}: {e}"))
        };

        Ok(MoveArg {
            block,
            destination: Cell::new(coord(x)?, coord(y)?),
        })
    }
}

/// Obstacle numbers as drawn on the board: `1`-`9`, then `A`-`Z`. Plain
/// decimal is accepted too.
fn parse_block_number(s: &str) -> Option<BlockId> {
    if let Ok(n) = s.parse::<usize>() {
        return (n > 0).then_some(n);
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c
            .to_digit(36)
            .filter(|&n| n > 0)
            .map(|n| n as BlockId),
        _ => None,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let levels = load_levels(cli.levels.as_deref())?;
    info!("{} levels loaded", levels.len());

    match cli.command {
        Some(Command::Solve { level, max_states }) => run_solve(&levels, level, max_states),
        Some(Command::Show { level }) => run_show(select(&levels, level)?),
        Some(Command::Hint { level }) => run_hint(select(&levels, level)?),
        Some(Command::Play {
            level,
            progress,
            moves,
        }) => run_play(select(&levels, level)?, &progress, &moves),
        Some(Command::Validate) => run_validate(&levels),
        Some(Command::Export) => run_export(&levels),
        Some(Command::Progress { progress, clear }) => run_progress(&progress, clear),
        // default: solve everything
        None => run_solve(&levels, None, None),
    }
}

/// Reads the level file, or the built-in campaign when none is given.
fn load_levels(path: Option<&Path>) -> Result<Vec<Level>> {
    match path {
        Some(path) => levels::load(path)
            .with_context(|| format!("cannot load levels from {}", path.display())),
        None => Ok(levels::builtin()),
    }
}

fn select(levels: &[Level], id: u32) -> Result<&Level> {
    levels::find(levels, id).with_context(|| format!("no level with id {id}"))
}

fn title(level: &Level) -> String {
    format!("Level {} ({})", level.id, level.name)
}

/// One line describing a search result for a level.
fn summary_line(level: &Level, outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Solved { optimal, .. } => {
            format!("{}: optimal {optimal}, par {}", title(level), level.par)
        }
        SearchOutcome::Unsolvable { .. } => format!("{}: unsolvable", title(level)),
        SearchOutcome::Cancelled { explored } => {
            format!("{}: cancelled after {explored} states", title(level))
        }
        SearchOutcome::LimitReached { explored } => {
            format!("{}: gave up after {explored} states", title(level))
        }
    }
}

/// Solves each level and returns one summary line per level.
fn format_summary(levels: &[Level], options: &SolveOptions) -> String {
    let mut output = String::new();
    for level in levels {
        let outcome = solver::search(&Board::new(level), options);
        output.push_str(&summary_line(level, &outcome));
        output.push('\n');
    }
    output
}

fn run_solve(levels: &[Level], only: Option<u32>, max_states: Option<usize>) -> Result<()> {
    let selected = match only {
        Some(id) => std::slice::from_ref(select(levels, id)?),
        None => levels,
    };
    let options = SolveOptions {
        max_states,
        ..SolveOptions::default()
    };
    print!("{}", format_summary(selected, &options));
    Ok(())
}

fn run_show(level: &Level) -> Result<()> {
    let board = Board::new(level);
    println!("{} par {}", title(level), level.par);
    print!("{}", format_state(&board, board.initial_state()));
    Ok(())
}

fn run_hint(level: &Level) -> Result<()> {
    let board = Board::new(level);
    match solver::search(&board, &SolveOptions::default()) {
        SearchOutcome::Solved { optimal, path, .. } => {
            println!("{}: {optimal} moves", title(level));
            // same syntax `play` accepts
            for (i, mv) in path.iter().enumerate() {
                let Cell { x, y } = mv.destination;
                println!("{:>3}. {}:{x},{y}", i + 1, block_char(mv.block));
            }
            Ok(())
        }
        _ => bail!("{} has no solution", title(level)),
    }
}

fn run_play(level: &Level, progress_path: &Path, moves: &[MoveArg]) -> Result<()> {
    let mut session = Session::new(level);

    for mv in moves {
        let label = session.board().label(mv.block);
        match session.apply_move(mv.block, mv.destination) {
            MoveOutcome::Moved { moves } => {
                println!("move {moves}: {label} -> {}", mv.destination)
            }
            MoveOutcome::Unchanged => println!("{label} is already at {}", mv.destination),
            MoveOutcome::Rejected(rejection) => println!("rejected: {rejection}"),
            MoveOutcome::Won(event) => {
                let stars = event.stars();
                println!(
                    "won in {} moves (par {}): {stars} star{}",
                    event.moves,
                    event.par,
                    if stars == 1 { "" } else { "s" }
                );
                let mut progress = Progress::load(progress_path);
                progress.complete_level(event.level_id, stars);
                progress
                    .save(progress_path)
                    .context("cannot record the win")?;
            }
        }
    }

    if !session.is_won() {
        print!("{}", format_state(session.board(), session.state()));
        println!("{} moves so far", session.moves());
    }
    Ok(())
}

fn run_validate(levels: &[Level]) -> Result<()> {
    let mut failures = 0;
    for level in levels {
        if let Err(e) = level.validate() {
            println!("{}: invalid: {e}", title(level));
            failures += 1;
            continue;
        }
        let solution = solver::solve(level);
        match solution.optimal {
            Some(optimal) if optimal > level.par => {
                println!("{}: par {} is below optimal {optimal}", title(level), level.par);
                failures += 1;
            }
            Some(optimal) => println!("{}: ok, optimal {optimal}, par {}", title(level), level.par),
            None => {
                println!("{}: unsolvable", title(level));
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{failures} of {} levels failed validation", levels.len());
    }
    Ok(())
}

fn run_export(levels: &[Level]) -> Result<()> {
    println!("{}", levels::to_json(levels)?);
    Ok(())
}

fn run_progress(path: &Path, clear: bool) -> Result<()> {
    if clear {
        Progress::clear(path)?;
        println!("progress cleared");
        return Ok(());
    }

    let progress = Progress::load(path);
    println!("unlocked up to level {}", progress.unlocked_level);
    for (level_id, stars) in &progress.stars {
        println!("level {level_id}: {stars} stars");
    }
    Ok(())
}
