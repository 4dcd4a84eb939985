//! Minesweeper played by deduction.
//!
//! A [`KnowledgeBase`] receives one observation per revealed cell ("this cell
//! has N mines around it") and saturates a set of [`Constraint`]s with two
//! rules: a constraint whose count is zero or equals its size classifies all
//! its cells, and a constraint contained in another yields their difference.
//! It never guesses; [`Session`] falls back to a random cell when nothing is
//! proven safe.

pub mod board;
pub mod config;
pub mod constraint;
pub mod error;
pub mod knowledge;
pub mod point;
pub mod session;

pub use board::Board;
pub use config::GameConfig;
pub use constraint::Constraint;
pub use error::{ConfigError, KnowledgeError};
pub use knowledge::{KnowledgeBase, Saturation};
pub use point::Point;
pub use session::{Cell, GameState, Move, Session};
