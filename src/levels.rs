//! Built-in levels and level files.
//!
//! Level files are JSON holding either a single level object or an array of
//! them, in the format the level editor exports. Every loaded level is
//! validated before it is returned.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::level::{Cell, Exit, Level, LevelError, ObstacleSpec, Side};

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelFile {
    Many(Vec<Level>),
    One(Level),
}

/// Parses level JSON (one level or an array) and validates each level.
pub fn parse(json: &str) -> Result<Vec<Level>, LevelError> {
    let levels = match serde_json::from_str::<LevelFile>(json)? {
        LevelFile::Many(levels) => levels,
        LevelFile::One(level) => vec![level],
    };
    for level in &levels {
        level.validate()?;
    }
    Ok(levels)
}

/// Reads and validates a level file.
pub fn load(path: &Path) -> Result<Vec<Level>, LevelError> {
    let json = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let levels = parse(&json)?;
    debug!("loaded {} levels from {}", levels.len(), path.display());
    Ok(levels)
}

/// Serializes levels as pretty-printed JSON.
pub fn to_json(levels: &[Level]) -> Result<String, LevelError> {
    Ok(serde_json::to_string_pretty(levels)?)
}

/// Looks up a level by id.
pub fn find(levels: &[Level], id: u32) -> Option<&Level> {
    levels.iter().find(|level| level.id == id)
}

fn right_exit(row: i32) -> Exit {
    Exit {
        side: Side::Right,
        position: row,
    }
}

/// The hand-authored campaign, ordered by difficulty.
///
/// Optimal move counts: 3, 6, 10, 12, 14.
pub fn builtin() -> Vec<Level> {
    vec![
        // one short dependency chain
        Level {
            id: 1,
            name: "First Steps".to_string(),
            grid_width: 5,
            grid_height: 5,
            par: 5,
            exit: right_exit(2),
            target: Cell::new(0, 2),
            blocks: vec![
                ObstacleSpec::new(2, 1, 1, 2).with_color("#5B7B9F"),
                ObstacleSpec::new(1, 0, 2, 1).with_color("#7B6B8F"),
                ObstacleSpec::new(4, 2, 1, 2).with_color("#4F7B7B"),
            ],
        },
        // a 1x3 blocker in the centre column
        Level {
            id: 2,
            name: "Side Street".to_string(),
            grid_width: 5,
            grid_height: 5,
            par: 9,
            exit: right_exit(2),
            target: Cell::new(0, 2),
            blocks: vec![
                ObstacleSpec::new(2, 0, 1, 3).with_color("#5B7B9F"),
                ObstacleSpec::new(3, 0, 2, 1).with_color("#7B6B8F"),
                ObstacleSpec::new(4, 1, 1, 2).with_color("#4F7B7B"),
                ObstacleSpec::new(0, 3, 2, 1).with_color("#6B5B8F"),
            ],
        },
        Level {
            id: 3,
            name: "Gridlock".to_string(),
            grid_width: 5,
            grid_height: 5,
            par: 14,
            exit: right_exit(2),
            target: Cell::new(1, 2),
            blocks: vec![
                ObstacleSpec::new(0, 0, 2, 1).with_color("#5B7B9F"),
                ObstacleSpec::new(3, 0, 1, 2).with_color("#7B6B8F"),
                ObstacleSpec::new(2, 1, 1, 3).with_color("#4F7B7B"),
                ObstacleSpec::new(4, 1, 1, 2).with_color("#6B5B8F"),
                ObstacleSpec::new(0, 3, 2, 1).with_color("#8F6B5B"),
                ObstacleSpec::new(3, 3, 2, 1).with_color("#5B8F6B"),
            ],
        },
        // exit on row 1, two 1x3 verticals
        Level {
            id: 4,
            name: "Rush Hour".to_string(),
            grid_width: 5,
            grid_height: 5,
            par: 16,
            exit: right_exit(1),
            target: Cell::new(0, 1),
            blocks: vec![
                ObstacleSpec::new(1, 0, 1, 3).with_color("#5B7B9F"),
                ObstacleSpec::new(2, 0, 1, 2).with_color("#7B6B8F"),
                ObstacleSpec::new(3, 0, 2, 1).with_color("#4F7B7B"),
                ObstacleSpec::new(0, 2, 1, 2).with_color("#6B5B8F"),
                ObstacleSpec::new(3, 1, 1, 2).with_color("#8F6B5B"),
                ObstacleSpec::new(4, 1, 1, 3).with_color("#5B8F6B"),
                ObstacleSpec::new(2, 3, 2, 1).with_color("#7B5B6B"),
            ],
        },
        Level {
            id: 5,
            name: "Parking Lot".to_string(),
            grid_width: 5,
            grid_height: 5,
            par: 20,
            exit: right_exit(2),
            target: Cell::new(0, 2),
            blocks: vec![
                ObstacleSpec::new(0, 0, 1, 2).with_color("#5B7B9F"),
                ObstacleSpec::new(1, 0, 1, 3).with_color("#7B6B8F"),
                ObstacleSpec::new(2, 0, 2, 1).with_color("#4F7B7B"),
                ObstacleSpec::new(4, 0, 1, 2).with_color("#6B5B8F"),
                ObstacleSpec::new(2, 1, 1, 3).with_color("#8F6B5B"),
                ObstacleSpec::new(3, 1, 1, 2).with_color("#5B8F6B"),
                ObstacleSpec::new(0, 3, 2, 1).with_color("#7B5B6B"),
                ObstacleSpec::new(3, 4, 2, 1).with_color("#6B7B5B"),
            ],
        },
    ]
}
