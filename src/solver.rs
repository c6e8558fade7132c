//! Breadth-first level solver.
//!
//! Key points:
//! - Every edge of the state graph is one move, so the first winning move
//!   generated belongs to a shortest solution
//! - Visited states are deduplicated through an FxHashSet of packed keys
//! - Nodes live in an arena with parent links so the winning line can be
//!   rebuilt; the frontier is a FIFO of arena indices
//! - No implicit cap on search size: callers opt into a state limit or an
//!   abort flag through [`SolveOptions`]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::board::{Board, BoardState, StateKey};
use crate::level::Level;
use crate::movement::{is_win_position, legal_moves_into, Move};

/// Solvability verdict handed to the level editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub solvable: bool,
    /// Minimum number of moves, when solvable.
    pub optimal: Option<u32>,
}

impl Solution {
    pub fn solved(optimal: u32) -> Self {
        Self {
            solvable: true,
            optimal: Some(optimal),
        }
    }

    pub fn unsolvable() -> Self {
        Self {
            solvable: false,
            optimal: None,
        }
    }
}

/// Knobs for a search. The default runs to completion.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Checked before each node is expanded; set it to stop the search.
    pub abort: Option<Arc<AtomicBool>>,
    /// Stop once this many distinct states have been seen.
    pub max_states: Option<usize>,
}

impl SolveOptions {
    pub fn with_abort_flag(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }
}

/// Full result of a search. `explored` counts distinct states seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved {
        optimal: u32,
        /// One shortest line of play, ending with the target's exit move.
        path: Vec<Move>,
        explored: usize,
    },
    Unsolvable {
        explored: usize,
    },
    /// The abort flag was raised before the search finished.
    Cancelled {
        explored: usize,
    },
    /// `max_states` was reached before the search finished.
    LimitReached {
        explored: usize,
    },
}

impl SearchOutcome {
    /// The verdict, if the search ran to a conclusion.
    pub fn solution(&self) -> Option<Solution> {
        match self {
            SearchOutcome::Solved { optimal, .. } => Some(Solution::solved(*optimal)),
            SearchOutcome::Unsolvable { .. } => Some(Solution::unsolvable()),
            SearchOutcome::Cancelled { .. } | SearchOutcome::LimitReached { .. } => None,
        }
    }

    pub fn explored(&self) -> usize {
        match self {
            SearchOutcome::Solved { explored, .. }
            | SearchOutcome::Unsolvable { explored }
            | SearchOutcome::Cancelled { explored }
            | SearchOutcome::LimitReached { explored } => *explored,
        }
    }
}

/// A state in the search tree.
struct SearchNode {
    state: BoardState,
    depth: u32,
    /// Arena index of the node this one was reached from.
    parent: Option<usize>,
    /// Move that produced this node from its parent.
    via: Option<Move>,
}

/// One breadth-first search over a board's state graph.
struct Search<'a> {
    board: &'a Board,
    options: &'a SolveOptions,
    nodes: Vec<SearchNode>,
    frontier: VecDeque<usize>,
    visited: FxHashSet<StateKey>,
}

impl<'a> Search<'a> {
    fn new(board: &'a Board, options: &'a SolveOptions) -> Self {
        let initial = board.initial_state().clone();
        let mut visited = FxHashSet::default();
        visited.insert(initial.key());

        Self {
            board,
            options,
            nodes: vec![SearchNode {
                state: initial,
                depth: 0,
                parent: None,
                via: None,
            }],
            frontier: VecDeque::from([0]),
            visited,
        }
    }

    fn is_aborted(&self) -> bool {
        self.options
            .abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn run(mut self) -> SearchOutcome {
        let mut moves = Vec::new();

        while let Some(index) = self.frontier.pop_front() {
            if self.is_aborted() {
                return SearchOutcome::Cancelled {
                    explored: self.visited.len(),
                };
            }

            let state = self.nodes[index].state.clone();
            let depth = self.nodes[index].depth;

            for block in 0..self.board.block_count() {
                moves.clear();
                legal_moves_into(self.board, &state, block, &mut moves);
                let is_target = self.board.shape(block).is_target;

                for &mv in &moves {
                    // win check before building the successor
                    if is_target && is_win_position(self.board, mv.destination) {
                        let mut path = self.path_to(index);
                        path.push(mv);
                        return SearchOutcome::Solved {
                            optimal: depth + 1,
                            path,
                            explored: self.visited.len(),
                        };
                    }

                    let next = state.with_moved(block, mv.destination);
                    if !self.visited.insert(next.key()) {
                        continue;
                    }
                    if self
                        .options
                        .max_states
                        .is_some_and(|limit| self.visited.len() > limit)
                    {
                        return SearchOutcome::LimitReached {
                            explored: self.visited.len() - 1,
                        };
                    }

                    self.nodes.push(SearchNode {
                        state: next,
                        depth: depth + 1,
                        parent: Some(index),
                        via: Some(mv),
                    });
                    self.frontier.push_back(self.nodes.len() - 1);
                }
            }
        }

        SearchOutcome::Unsolvable {
            explored: self.visited.len(),
        }
    }

    /// Moves leading from the root to the node at `index`.
    fn path_to(&self, mut index: usize) -> Vec<Move> {
        let mut path = Vec::with_capacity(self.nodes[index].depth as usize + 1);
        while let Some(mv) = self.nodes[index].via {
            path.push(mv);
            match self.nodes[index].parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Searches the board's state graph from its initial state.
pub fn search(board: &Board, options: &SolveOptions) -> SearchOutcome {
    debug!(
        "searching {}x{} board with {} blocks",
        board.width(),
        board.height(),
        board.block_count()
    );
    let outcome = Search::new(board, options).run();
    match &outcome {
        SearchOutcome::Solved { optimal, explored, .. } => {
            debug!("solved in {optimal} moves after {explored} states")
        }
        SearchOutcome::Unsolvable { explored } => {
            debug!("unsolvable after exhausting {explored} states")
        }
        SearchOutcome::Cancelled { explored } => info!("search cancelled after {explored} states"),
        SearchOutcome::LimitReached { explored } => {
            info!("search stopped at the {explored}-state limit")
        }
    }
    outcome
}

/// Proves a level solvable or not and finds its optimal move count.
///
/// Runs without limits; the level is assumed valid.
pub fn solve(level: &Level) -> Solution {
    match search(&Board::new(level), &SolveOptions::default()) {
        SearchOutcome::Solved { optimal, .. } => Solution::solved(optimal),
        _ => Solution::unsolvable(),
    }
}

/// A search running on its own thread.
pub struct SolveTask {
    abort: Arc<AtomicBool>,
    handle: JoinHandle<SearchOutcome>,
}

impl SolveTask {
    /// Asks the search to stop at its next node.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the search. A panic inside the search is resumed here.
    pub fn join(self) -> SearchOutcome {
        self.handle
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
    }
}

/// Starts a search in the background so callers stay responsive.
///
/// Uses the abort flag from `options` when one is given, so an existing flag
/// shared with other code also stops this task.
pub fn spawn(level: &Level, options: SolveOptions) -> SolveTask {
    let abort = options
        .abort
        .clone()
        .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
    let options = SolveOptions {
        abort: Some(Arc::clone(&abort)),
        ..options
    };
    let board = Board::new(level);
    let handle = thread::spawn(move || search(&board, &options));
    SolveTask { abort, handle }
}
