//! Connect 4 game engine.
//! A game is an immutable [`GameState`] value: [`GameState::drop_piece`]
//! takes a column and returns the next state together with where the piece
//! landed, so a presentation layer can render it without re-deriving
//! anything. Any board of at least 4×4 is supported; four in a row wins.
use thiserror::Error;

mod board;
mod game;
mod player;

pub use board::{Board, Cell, Position, DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_CELLS, WIN_LENGTH};
pub use game::{DropResult, GameState, GameStatus, Rejection};
pub use player::{Player, PlayerId};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("column {column} is out of bounds (board is {width} wide)")]
    InvalidColumn { column: usize, width: usize },
    #[error("board must be at least 4x4 and at most 4096 cells, got {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },
    #[error("{player} needs a non-empty color")]
    InvalidColor { player: PlayerId },
    #[error("board declares {expected} rows but has {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("floating piece at row {row}, column {col}")]
    FloatingPiece { row: usize, col: usize },
}
