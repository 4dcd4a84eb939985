use rand::Rng;

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::knowledge::KnowledgeBase;
use crate::point::Point;

/// The visible state of a single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Cell {
    Hidden,
    Revealed(u8), // The u8 is the number of adjacent mines.
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// How the next move was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Proven safe by the knowledge base.
    Safe(Point),
    /// No deduction available; a random cell not known to be dangerous.
    Guess(Point),
}

impl Move {
    pub fn point(&self) -> Point {
        match *self {
            Move::Safe(p) | Move::Guess(p) => p,
        }
    }
}

/// A game in progress: the hidden board, what the player can see, and what
/// the player has deduced from it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    board: Board,
    /// Indexed as `view[y][x]`.
    view: Vec<Vec<Cell>>,
    knowledge: KnowledgeBase,
    game_state: GameState,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self, ConfigError> {
        Ok(Session::from_board(Board::new(config, rng)?))
    }

    pub fn from_board(board: Board) -> Self {
        Session {
            view: vec![vec![Cell::Hidden; board.width()]; board.height()],
            board,
            knowledge: KnowledgeBase::new(),
            game_state: GameState::Playing,
        }
    }

    /// Deserializes a session from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the session to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn cell(&self, at: Point) -> Option<Cell> {
        self.view.get(at.y)?.get(at.x).copied()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.view
    }

    /// Reveals `at` and feeds its neighbor count to the knowledge base.
    ///
    /// Returns `Ok(false)` if `at` was a mine. Revealing an already revealed
    /// cell is a no-op.
    pub fn reveal(&mut self, at: Point) -> anyhow::Result<bool> {
        let Some(cell) = self.cell(at) else {
            anyhow::bail!("out_of_bounds");
        };
        if !matches!(cell, Cell::Hidden) {
            return Ok(true);
        }
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        if self.board.is_mine(at) {
            self.game_state = GameState::Lost;
            return Ok(false);
        }

        let count = self.board.nearby_mines(at);
        self.knowledge.observe(at, count, self.board.neighbors(at))?;
        self.view[at.y][at.x] = Cell::Revealed(count as u8);

        if self.check_win_condition() {
            self.game_state = GameState::Won;
        }
        Ok(true)
    }

    /// Every mine identified, or nothing left to reveal but mines.
    pub fn check_win_condition(&self) -> bool {
        self.knowledge.won(self.board.total_mines())
            || self
                .board
                .cells()
                .all(|p| self.knowledge.is_played(&p) || self.board.is_mine(p))
    }

    /// A proven-safe cell if there is one, otherwise a random guess among
    /// cells not known to be dangerous.
    pub fn next_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        if let Some(safe) = self.knowledge.safe_unplayed_cell() {
            return Some(Move::Safe(safe));
        }
        self.knowledge
            .unconstrained_cell(self.board.cells(), rng)
            .map(Move::Guess)
    }

    /// Picks and plays one move. `None` when there was nothing left to play.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Move>> {
        let Some(mv) = self.next_move(rng) else {
            return Ok(None);
        };
        self.reveal(mv.point())?;
        Ok(Some(mv))
    }
}
