use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Cell, Position, WIN_LENGTH};
use crate::{GameError, Player, PlayerId};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won { winner: PlayerId },
    Tied,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Won { winner } => write!(f, "won by {winner}"),
            GameStatus::Tied => write!(f, "tied"),
        }
    }
}

/// Why a drop left the game untouched.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    ColumnFull,
    GameAlreadyOver,
}

/// Outcome of [`GameState::drop_piece`]. On a rejection `state` is an
/// unchanged copy of the input and `placed_at` is `None`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DropResult {
    pub state: GameState,
    pub status: GameStatus,
    pub placed_at: Option<Position>,
    #[serde(rename = "error")]
    pub rejection: Option<Rejection>,
}

impl DropResult {
    fn placed(state: GameState, at: Position) -> Self {
        Self {
            status: state.status,
            state,
            placed_at: Some(at),
            rejection: None,
        }
    }

    fn rejected(state: &GameState, rejection: Rejection) -> Self {
        Self {
            state: state.clone(),
            status: state.status,
            placed_at: None,
            rejection: Some(rejection),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Everything needed to continue a game. Values are never mutated in place:
/// each drop produces a new state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    players: [Player; 2],
    active: PlayerId,
    status: GameStatus,
    last_move: Option<Position>,
}

impl GameState {
    pub fn initialize(
        height: usize,
        width: usize,
        player1: Player,
        player2: Player,
    ) -> Result<Self, GameError> {
        let board = Board::new(height, width)?;
        Ok(Self::with_board(board, player1, player2))
    }

    /// Standard 6×7 game.
    pub fn new(player1: Player, player2: Player) -> Self {
        Self::with_board(Board::default(), player1, player2)
    }

    fn with_board(board: Board, player1: Player, player2: Player) -> Self {
        // Seats follow argument order whatever ids the callers attached.
        let players = [
            Player {
                id: PlayerId::One,
                ..player1
            },
            Player {
                id: PlayerId::Two,
                ..player2
            },
        ];
        Self {
            board,
            players,
            active: PlayerId::One,
            status: GameStatus::InProgress,
            last_move: None,
        }
    }

    /// Drops the active player's piece into `column`.
    ///
    /// Full columns and finished games are soft rejections reported in the
    /// result. A column outside the board is a caller bug and returns
    /// [`GameError::InvalidColumn`].
    pub fn drop_piece(&self, column: usize) -> Result<DropResult, GameError> {
        let width = self.board.width();
        if column >= width {
            return Err(GameError::InvalidColumn { column, width });
        }
        if self.status.is_terminal() {
            debug!(column, status = %self.status, "drop rejected: game already over");
            return Ok(DropResult::rejected(self, Rejection::GameAlreadyOver));
        }

        let mut next = self.clone();
        let player = self.active;
        let Some(row) = next.board.place(column, player) else {
            debug!(column, %player, "drop rejected: column full");
            return Ok(DropResult::rejected(self, Rejection::ColumnFull));
        };
        let at = Position::new(row, column);
        next.last_move = Some(at);
        debug!(row, column, %player, "piece placed");

        if next.board.winning_line(row, column).is_some() {
            next.status = GameStatus::Won { winner: player };
            info!(%player, row, column, "game won");
        } else if next.board.is_full() {
            next.status = GameStatus::Tied;
            info!(moves = next.board.occupied(), "game tied");
        } else {
            next.active = player.other();
        }
        Ok(DropResult::placed(next, at))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.board.get(row, col)
    }

    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.idx()]
    }

    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    pub fn open_row(&self, column: usize) -> Option<usize> {
        self.board.open_row(column)
    }

    /// Columns that still accept a piece; empty once the game is over.
    pub fn legal_columns(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        (0..self.board.width())
            .filter(|&col| self.board.open_row(col).is_some())
            .collect()
    }

    /// The four cells that decided the game, for highlighting.
    pub fn winning_line(&self) -> Option<[Position; WIN_LENGTH]> {
        let GameStatus::Won { .. } = self.status else {
            return None;
        };
        let at = self.last_move?;
        self.board.winning_line(at.row, at.col)
    }

    /// End-of-game announcement, `None` while the game is running.
    pub fn outcome_message(&self) -> Option<String> {
        match self.status {
            GameStatus::InProgress => None,
            GameStatus::Won { winner } => Some(format!(
                "The {} player won the game!",
                self.player(winner).color
            )),
            GameStatus::Tied => Some("Tied!".to_string()),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(
            Player::default_for(PlayerId::One),
            Player::default_for(PlayerId::Two),
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        match self.status {
            GameStatus::InProgress => writeln!(f, "{} to move", self.active),
            status => writeln!(f, "{status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(state: &GameState, columns: &[usize]) -> GameState {
        columns.iter().fold(state.clone(), |state, &col| {
            let res = state.drop_piece(col).unwrap();
            assert!(!res.is_rejected(), "column {col} rejected:\n{state}");
            res.state
        })
    }

    #[test]
    fn initialize_validates_dimensions() {
        let p1 = Player::default_for(PlayerId::One);
        let p2 = Player::default_for(PlayerId::Two);
        let res = GameState::initialize(3, 3, p1.clone(), p2.clone());
        assert!(matches!(res, Err(GameError::InvalidDimensions { .. })));

        let state = GameState::initialize(5, 9, p1, p2).unwrap();
        assert_eq!((state.height(), state.width()), (5, 9));
        assert_eq!(state.active_player(), PlayerId::One);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.legal_columns().len(), 9);
        assert_eq!(state.cell(4, 8), Some(Cell::Empty));
    }

    #[test]
    fn initialize_assigns_seats_by_position() {
        let p1 = Player::new(PlayerId::Two, "green").unwrap();
        let p2 = Player::new(PlayerId::Two, "gold").unwrap();
        let state = GameState::initialize(6, 7, p1, p2).unwrap();
        assert_eq!(state.player(PlayerId::One).color, "green");
        assert_eq!(state.player(PlayerId::One).id, PlayerId::One);
        assert_eq!(state.player(PlayerId::Two).color, "gold");
    }

    #[test]
    fn drop_switches_turns_and_reports_position() {
        let state = GameState::default();
        let res = state.drop_piece(3).unwrap();
        assert_eq!(res.placed_at, Some(Position::new(5, 3)));
        assert_eq!(res.status(), GameStatus::InProgress);
        assert_eq!(res.state.active_player(), PlayerId::Two);
        assert_eq!(res.state.last_move(), Some(Position::new(5, 3)));
        // The input value is untouched.
        assert_eq!(state.cell(5, 3), Some(Cell::Empty));
    }

    #[test]
    fn out_of_range_column_is_an_error() {
        let state = GameState::default();
        let res = state.drop_piece(7);
        assert!(matches!(
            res,
            Err(GameError::InvalidColumn { column: 7, width: 7 })
        ));
    }

    #[test]
    fn horizontal_win_keeps_winner_active() {
        let state = play(&GameState::default(), &[0, 0, 1, 1, 2, 2]);
        let res = state.drop_piece(3).unwrap();
        assert_eq!(
            res.status(),
            GameStatus::Won {
                winner: PlayerId::One
            }
        );
        assert_eq!(res.state.active_player(), PlayerId::One);
        assert!(res.state.legal_columns().is_empty());
        let line = res.state.winning_line().unwrap();
        assert_eq!(line.map(|p| p.col), [0, 1, 2, 3]);
        assert!(line.iter().all(|p| p.row == 5));
        assert_eq!(
            res.state.outcome_message().as_deref(),
            Some("The red player won the game!")
        );
    }

    #[test]
    fn finished_game_rejects_drops() {
        let won = play(&GameState::default(), &[0, 1, 0, 1, 0, 1, 0]);
        let res = won.drop_piece(4).unwrap();
        assert_eq!(res.rejection, Some(Rejection::GameAlreadyOver));
        assert_eq!(res.placed_at, None);
        assert_eq!(res.state, won);
    }

    #[test]
    fn status_serializes_tagged() {
        let json = serde_json::to_string(&GameStatus::Won {
            winner: PlayerId::Two,
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"won","winner":2}"#);
        let json = serde_json::to_string(&GameStatus::InProgress).unwrap();
        assert_eq!(json, r#"{"state":"in_progress"}"#);
    }

    #[test]
    fn display_shows_turn() {
        let state = play(&small_game(), &[0]);
        assert_eq!(state.to_string(), "....\n....\n....\n1...\nplayer 2 to move\n");
    }

    fn small_game() -> GameState {
        GameState::initialize(
            4,
            4,
            Player::default_for(PlayerId::One),
            Player::default_for(PlayerId::Two),
        )
        .unwrap()
    }
}
