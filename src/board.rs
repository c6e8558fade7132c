//! Board geometry and positional state.
//!
//! A [`Board`] holds everything that stays fixed while a level is played:
//! grid size, exit, and the shape of every block. A [`BoardState`] holds only
//! block positions, indexed by block id. States are the unit of equality for
//! the solver and the one thing a session mutates.
//!
//! Occupancy is a `u64` bitmask, one bit per cell in row-major order
//! (`idx = y * width + x`), which is why boards are capped at
//! [`MAX_CELLS`](crate::level::MAX_CELLS) cells.

use serde::Serialize;

use crate::level::{Cell, Exit, Level, Side};

/// Index of a block within a board. The target is always [`TARGET`];
/// obstacle `i` of the level is `i + 1`.
pub type BlockId = usize;

/// Block id of the target block.
pub const TARGET: BlockId = 0;

/// Compact hash key for a state: one `(x, y)` byte pair per block.
pub type StateKey = Box<[u8]>;

/// Size of a block and whether it is the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub width: i32,
    pub height: i32,
    pub is_target: bool,
}

impl Shape {
    /// Horizontal and square blocks slide left/right.
    #[inline]
    pub fn slides_horizontally(&self) -> bool {
        self.width >= self.height
    }

    /// Vertical and square blocks slide up/down.
    #[inline]
    pub fn slides_vertically(&self) -> bool {
        self.height >= self.width
    }
}

/// A block with its current position, as handed to rendering collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub is_target: bool,
}

/// Positions of every block, indexed by [`BlockId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardState {
    positions: Box<[Cell]>,
}

impl BoardState {
    pub fn new(positions: Vec<Cell>) -> Self {
        Self {
            positions: positions.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn position(&self, block: BlockId) -> Cell {
        self.positions[block]
    }

    pub fn positions(&self) -> &[Cell] {
        &self.positions
    }

    /// Returns a new state with one block relocated and all others unchanged.
    pub fn with_moved(&self, block: BlockId, destination: Cell) -> Self {
        let mut next = self.clone();
        next.positions[block] = destination;
        next
    }

    pub(crate) fn set(&mut self, block: BlockId, destination: Cell) {
        self.positions[block] = destination;
    }

    /// Packs the state into bytes for hashing.
    ///
    /// In-grid coordinates fit in a byte. The only out-of-grid coordinate is
    /// `-1`, which packs to 255 and cannot collide with a real cell.
    pub fn key(&self) -> StateKey {
        self.positions
            .iter()
            .flat_map(|cell| [cell.x as u8, cell.y as u8])
            .collect()
    }
}

/// Fixed geometry of a level.
#[derive(Debug, Clone)]
pub struct Board {
    width: i32,
    height: i32,
    exit: Exit,
    shapes: Vec<Shape>,
    initial: BoardState,
}

impl Board {
    /// Builds the board and its starting state. The level is assumed valid.
    pub fn new(level: &Level) -> Self {
        let mut shapes = Vec::with_capacity(level.block_count());
        let mut positions = Vec::with_capacity(level.block_count());

        shapes.push(Shape {
            width: 1,
            height: 1,
            is_target: true,
        });
        positions.push(level.target);

        for spec in &level.blocks {
            shapes.push(Shape {
                width: spec.width,
                height: spec.height,
                is_target: false,
            });
            positions.push(Cell::new(spec.x, spec.y));
        }

        Self {
            width: level.grid_width,
            height: level.grid_height,
            exit: level.exit,
            shapes,
            initial: BoardState::new(positions),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn exit(&self) -> Exit {
        self.exit
    }

    pub fn block_count(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn shape(&self, block: BlockId) -> Shape {
        self.shapes[block]
    }

    pub fn initial_state(&self) -> &BoardState {
        &self.initial
    }

    /// Display label of a block: `target` or `block-i` (level file order).
    pub fn label(&self, block: BlockId) -> String {
        if block == TARGET {
            "target".to_string()
        } else {
            format!("block-{}", block - 1)
        }
    }

    /// Whether a block of `shape` placed at `at` lies fully inside the grid.
    #[inline]
    pub fn fits(&self, shape: Shape, at: Cell) -> bool {
        at.x >= 0
            && at.y >= 0
            && at.x + shape.width <= self.width
            && at.y + shape.height <= self.height
    }

    /// Bitmask of the cells covered by `shape` at `at`. `at` must fit.
    #[inline]
    pub fn footprint(&self, shape: Shape, at: Cell) -> u64 {
        let mut mask = 0u64;
        for y in at.y..at.y + shape.height {
            for x in at.x..at.x + shape.width {
                mask |= 1 << cell_to_idx(self.width, x, y);
            }
        }
        mask
    }

    /// Cells covered by every block except `except`. Blocks outside the grid
    /// (the target after it has exited) cover nothing.
    pub fn occupancy(&self, state: &BoardState, except: Option<BlockId>) -> u64 {
        let mut mask = 0u64;
        for (block, &at) in state.positions().iter().enumerate() {
            if Some(block) == except {
                continue;
            }
            let shape = self.shapes[block];
            if self.fits(shape, at) {
                mask |= self.footprint(shape, at);
            }
        }
        mask
    }

    /// Blocks with their positions in `state`, in id order.
    pub fn blocks(&self, state: &BoardState) -> Vec<Block> {
        self.shapes
            .iter()
            .zip(state.positions())
            .enumerate()
            .map(|(id, (shape, at))| Block {
                id,
                x: at.x,
                y: at.y,
                width: shape.width,
                height: shape.height,
                is_target: shape.is_target,
            })
            .collect()
    }
}

/// Converts a cell to its bit index in the occupancy mask.
#[inline(always)]
pub const fn cell_to_idx(width: i32, x: i32, y: i32) -> usize {
    (y * width + x) as usize
}

/// Character used for a block on the text board: `T` for the target, then
/// `1`-`9`, `A`-`Z` for obstacles in level order.
pub fn block_char(block: BlockId) -> char {
    if block == TARGET {
        return 'T';
    }
    char::from_digit(block as u32, 36)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('#')
}

/// Formats a state as text, one line per row, top row first.
///
/// Empty cells show as `.`; the exit is drawn just outside the grid as an
/// arrow pointing out (`^`, `v`, `<`, `>`).
pub fn format_state(board: &Board, state: &BoardState) -> String {
    let (width, height) = (board.width, board.height);
    let mut cells = vec!['.'; (width * height) as usize];

    for (block, &at) in state.positions().iter().enumerate() {
        let shape = board.shape(block);
        if !board.fits(shape, at) {
            continue;
        }
        for y in at.y..at.y + shape.height {
            for x in at.x..at.x + shape.width {
                cells[cell_to_idx(width, x, y)] = block_char(block);
            }
        }
    }

    let exit = board.exit;
    let marker_line = |marker: char| {
        let mut line = " ".repeat(exit.position as usize);
        line.push(marker);
        line.push('\n');
        line
    };

    let mut output = String::new();
    if exit.side == Side::Top {
        output.push_str(&marker_line('^'));
    }
    for y in 0..height {
        let on_exit_row = exit.side.indexes_rows() && exit.position == y;
        if exit.side == Side::Left {
            output.push(if on_exit_row { '<' } else { ' ' });
        }
        for x in 0..width {
            output.push(cells[cell_to_idx(width, x, y)]);
        }
        if exit.side == Side::Right && on_exit_row {
            output.push('>');
        }
        output.push('\n');
    }
    if exit.side == Side::Bottom {
        output.push_str(&marker_line('v'));
    }

    output
}
