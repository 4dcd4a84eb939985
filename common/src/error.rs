use thiserror::Error;

use crate::point::Point;

pub type Result<T> = std::result::Result<T, KnowledgeError>;

/// A contradiction between an observation and what the knowledge base has
/// already proven. The observation stream cannot come from a real board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("cell {cell} resolved as dangerous in {constraint}, which has no dangerous cells left")]
    NegativeCount { cell: Point, constraint: String },

    #[error("constraint {0} claims more dangerous cells than it contains")]
    Overcommitted(String),

    #[error("constraint over no cells claims {count} dangerous cells")]
    EmptyWithCount { count: usize },

    #[error("cell {cell} would be both safe and dangerous")]
    SafeDangerousOverlap { cell: Point },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board must be at least 1x1, got {width}x{height}")]
    ZeroDimension { width: usize, height: usize },

    #[error("{mines} mines do not fit on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },

    #[error("mine at {0} lies outside the board")]
    MineOutOfBounds(Point),
}
