//! Level definitions.
//!
//! A level is plain data: grid size, exit gap, the target's starting cell and
//! a list of obstacle blocks. Levels use camelCase keys on the wire so files
//! exported by the level editor load unchanged. [`Level::validate`] checks the
//! structural invariants that the session and the solver rely on.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of cells on a board (one bit per cell in the occupancy mask).
pub const MAX_CELLS: i32 = 64;

/// An integer cell coordinate.
///
/// Normally inside the grid; the target is one cell outside once it has left
/// through the exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// The grid edge an exit sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// True for the left and right edges, whose exit position is a row index.
    pub fn indexes_rows(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// The gap in the border the target must leave through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exit {
    pub side: Side,
    /// Row index for left/right exits, column index for top/bottom exits.
    pub position: i32,
}

/// An obstacle block as authored. `color` is cosmetic and ignored by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ObstacleSpec {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}

/// One puzzle. The target block is always 1x1 and is not listed in `blocks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub grid_width: i32,
    pub grid_height: i32,
    /// Reference move count for star ratings; never enforced as a limit.
    pub par: u32,
    pub exit: Exit,
    pub target: Cell,
    #[serde(default)]
    pub blocks: Vec<ObstacleSpec>,
}

/// Reasons a level is rejected before play, plus level-file failures.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {level}: grid {width}x{height} must have positive dimensions")]
    EmptyGrid { level: u32, width: i32, height: i32 },
    #[error("level {level}: grid {width}x{height} has more than {} cells", MAX_CELLS)]
    GridTooLarge { level: u32, width: i32, height: i32 },
    #[error("level {level}: block {index} has non-positive size {width}x{height}")]
    DegenerateBlock {
        level: u32,
        index: usize,
        width: i32,
        height: i32,
    },
    #[error("level {level}: target at {cell} is outside the grid")]
    TargetOutOfBounds { level: u32, cell: Cell },
    #[error("level {level}: block {index} at {cell} size {width}x{height} is outside the grid")]
    BlockOutOfBounds {
        level: u32,
        index: usize,
        cell: Cell,
        width: i32,
        height: i32,
    },
    #[error("level {level}: blocks overlap at cell {cell}")]
    Overlap { level: u32, cell: Cell },
    #[error("level {level}: exit position {position} is out of range for the {side} edge")]
    ExitOutOfRange { level: u32, side: Side, position: i32 },
    #[error("failed to read level file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level JSON")]
    Json(#[from] serde_json::Error),
}

impl Level {
    /// Number of blocks including the target.
    pub fn block_count(&self) -> usize {
        self.blocks.len() + 1
    }

    /// Checks the invariants the engine assumes: positive sizes, everything
    /// inside the grid, no overlapping footprints, exit on an existing row or
    /// column, and a board small enough for the occupancy mask.
    pub fn validate(&self) -> Result<(), LevelError> {
        let level = self.id;
        let (width, height) = (self.grid_width, self.grid_height);

        if width <= 0 || height <= 0 {
            return Err(LevelError::EmptyGrid {
                level,
                width,
                height,
            });
        }
        if width > MAX_CELLS || height > MAX_CELLS || width * height > MAX_CELLS {
            return Err(LevelError::GridTooLarge {
                level,
                width,
                height,
            });
        }

        let span = if self.exit.side.indexes_rows() {
            height
        } else {
            width
        };
        if !(0..span).contains(&self.exit.position) {
            return Err(LevelError::ExitOutOfRange {
                level,
                side: self.exit.side,
                position: self.exit.position,
            });
        }

        let target = self.target;
        if !(0..width).contains(&target.x) || !(0..height).contains(&target.y) {
            return Err(LevelError::TargetOutOfBounds {
                level,
                cell: target,
            });
        }

        // bit i set = cell (i % width, i / width) already claimed
        let mut occupied: u64 = 1 << (target.y * width + target.x);

        for (index, block) in self.blocks.iter().enumerate() {
            if block.width <= 0 || block.height <= 0 {
                return Err(LevelError::DegenerateBlock {
                    level,
                    index,
                    width: block.width,
                    height: block.height,
                });
            }
            if block.x < 0
                || block.y < 0
                || block.x + block.width > width
                || block.y + block.height > height
            {
                return Err(LevelError::BlockOutOfBounds {
                    level,
                    index,
                    cell: Cell::new(block.x, block.y),
                    width: block.width,
                    height: block.height,
                });
            }

            for y in block.y..block.y + block.height {
                for x in block.x..block.x + block.width {
                    let bit = 1u64 << (y * width + x);
                    if occupied & bit != 0 {
                        return Err(LevelError::Overlap {
                            level,
                            cell: Cell::new(x, y),
                        });
                    }
                    occupied |= bit;
                }
            }
        }

        Ok(())
    }
}
