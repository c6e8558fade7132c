//! Traffic Therapy Library
//!
//! Rules, play sessions, and an optimal solver for a sliding-block puzzle in
//! which a single 1x1 target block must be driven out of the grid through one
//! exit gap.
//!
//! - [`level`] / [`levels`]: level definitions, validation, level files
//! - [`board`] / [`movement`]: board state and the sliding rules
//! - [`session`]: one play-through with move counting and win detection
//! - [`solver`]: breadth-first proof of solvability and optimal move count
//! - [`scoring`] / [`progress`]: star ratings and saved campaign progress

pub mod board;
pub mod level;
pub mod levels;
pub mod movement;
pub mod progress;
pub mod scoring;
pub mod session;
pub mod solver;

pub use board::{BlockId, Board, BoardState, TARGET};
pub use level::{Cell, Exit, Level, LevelError, ObstacleSpec, Side};
pub use session::{MoveOutcome, Session, WinEvent};
pub use solver::{solve, SearchOutcome, Solution, SolveOptions};
