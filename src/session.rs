//! Interactive play of one level.
//!
//! A [`Session`] owns the only mutable board state for a level. Moves go
//! through two steps: [`Session::propose`] checks a destination against the
//! sliding rules and hands back a [`ProposedMove`]; [`Session::commit`]
//! applies it. Input handling (drag, keys, scripts) sits entirely outside.
//!
//! Illegal requests are not errors: they come back as
//! [`MoveOutcome::Rejected`] and leave the session untouched.

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::board::{Block, BlockId, Board, BoardState};
use crate::level::{Cell, Level};
use crate::movement::{self, Move};
use crate::scoring::star_rating;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Playing,
    Won,
}

/// Why a move request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the level is already won")]
    AlreadyWon,
    #[error("no block with id {0}")]
    UnknownBlock(BlockId),
    #[error("block {block} cannot reach {destination} in one move")]
    Unreachable { block: BlockId, destination: Cell },
    #[error("the board changed since this move was proposed")]
    Stale,
}

/// A validated move, bound to the session revision it was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedMove {
    mv: Move,
    revision: u64,
}

impl ProposedMove {
    pub fn as_move(&self) -> Move {
        self.mv
    }
}

/// Emitted exactly once, by the move that takes the target out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinEvent {
    pub level_id: u32,
    pub moves: u32,
    pub par: u32,
}

impl WinEvent {
    pub fn stars(&self) -> u8 {
        star_rating(self.moves, self.par)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was applied; `moves` is the new move count.
    Moved { moves: u32 },
    /// The move was applied and won the level.
    Won(WinEvent),
    /// Zero-distance request: nothing happened and no move was counted.
    Unchanged,
    Rejected(Rejection),
}

/// Read-only view of a session for rendering collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub level_id: u32,
    pub moves: u32,
    pub won: bool,
    pub blocks: Vec<Block>,
}

/// One play-through of a level.
#[derive(Debug, Clone)]
pub struct Session {
    level_id: u32,
    par: u32,
    board: Board,
    state: BoardState,
    moves: u32,
    status: Status,
    // bumped on every commit and reset; stale proposals are refused
    revision: u64,
}

impl Session {
    /// Starts a session at the level's initial position. The level is assumed
    /// to have passed [`Level::validate`].
    pub fn new(level: &Level) -> Self {
        let board = Board::new(level);
        let state = board.initial_state().clone();
        Self {
            level_id: level.id,
            par: level.par,
            board,
            state,
            moves: 0,
            status: Status::Playing,
            revision: 0,
        }
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn par(&self) -> u32 {
        self.par
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_won(&self) -> bool {
        self.status == Status::Won
    }

    /// Legal moves for a block right now; empty once won or for unknown ids.
    pub fn legal_moves(&self, block: BlockId) -> Vec<Move> {
        if self.is_won() || block >= self.board.block_count() {
            return Vec::new();
        }
        movement::legal_moves(&self.board, &self.state, block)
    }

    /// Checks a move without applying it.
    ///
    /// Returns `Ok(None)` when `destination` is the block's current cell.
    pub fn propose(
        &self,
        block: BlockId,
        destination: Cell,
    ) -> Result<Option<ProposedMove>, Rejection> {
        if self.is_won() {
            return Err(Rejection::AlreadyWon);
        }
        if block >= self.board.block_count() {
            return Err(Rejection::UnknownBlock(block));
        }
        if self.state.position(block) == destination {
            return Ok(None);
        }

        movement::legal_moves(&self.board, &self.state, block)
            .into_iter()
            .find(|m| m.destination == destination)
            .map(|mv| {
                Some(ProposedMove {
                    mv,
                    revision: self.revision,
                })
            })
            .ok_or(Rejection::Unreachable { block, destination })
    }

    /// Applies a proposal made against the current board.
    pub fn commit(&mut self, proposal: ProposedMove) -> MoveOutcome {
        if self.is_won() {
            return MoveOutcome::Rejected(Rejection::AlreadyWon);
        }
        if proposal.revision != self.revision {
            return MoveOutcome::Rejected(Rejection::Stale);
        }

        let Move {
            block, destination, ..
        } = proposal.mv;
        self.state.set(block, destination);
        self.moves += 1;
        self.revision += 1;
        debug!(
            "level {}: move {} {} -> {}",
            self.level_id,
            self.moves,
            self.board.label(block),
            destination
        );

        // only a target move can win
        let is_target = self.board.shape(block).is_target;
        if is_target && movement::is_win_position(&self.board, destination) {
            self.status = Status::Won;
            info!(
                "level {} won in {} moves (par {})",
                self.level_id, self.moves, self.par
            );
            return MoveOutcome::Won(WinEvent {
                level_id: self.level_id,
                moves: self.moves,
                par: self.par,
            });
        }

        MoveOutcome::Moved { moves: self.moves }
    }

    /// Proposes and commits in one step.
    pub fn apply_move(&mut self, block: BlockId, destination: Cell) -> MoveOutcome {
        match self.propose(block, destination) {
            Ok(Some(proposal)) => self.commit(proposal),
            Ok(None) => MoveOutcome::Unchanged,
            Err(rejection) => {
                debug!("level {}: rejected move: {}", self.level_id, rejection);
                MoveOutcome::Rejected(rejection)
            }
        }
    }

    /// Restores the initial position, zero moves, and `Playing`.
    pub fn reset(&mut self) {
        self.state = self.board.initial_state().clone();
        self.moves = 0;
        self.status = Status::Playing;
        self.revision += 1;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level_id: self.level_id,
            moves: self.moves,
            won: self.is_won(),
            blocks: self.board.blocks(&self.state),
        }
    }
}
