use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GameError, PlayerId};

pub const DEFAULT_HEIGHT: usize = 6;
pub const DEFAULT_WIDTH: usize = 7;
pub const WIN_LENGTH: usize = 4;
/// Largest board accepted, counted in cells.
pub const MAX_CELLS: usize = 4096;

/// Horizontal, vertical, diagonal ↘ and diagonal ↙ as (row, col) steps.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A board square. Serialized as `null`, `1` or `2`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<PlayerId>", into = "Option<PlayerId>")]
pub enum Cell {
    #[default]
    Empty,
    Occupied(PlayerId),
}

impl Cell {
    pub fn owner(self) -> Option<PlayerId> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(id) => Some(id),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Option<PlayerId>> for Cell {
    fn from(owner: Option<PlayerId>) -> Self {
        owner.map_or(Cell::Empty, Cell::Occupied)
    }
}

impl From<Cell> for Option<PlayerId> {
    fn from(cell: Cell) -> Self {
        cell.owner()
    }
}

/// Row 0 is the top of the board, column 0 the left edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Row-major grid. Pieces only ever stack from the bottom row up and are
/// never removed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr", into = "BoardRepr")]
pub struct Board {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

/// Wire shape of a board: nested rows, top row first.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct BoardRepr {
    height: usize,
    width: usize,
    rows: Vec<Vec<Cell>>,
}

impl Board {
    pub fn new(height: usize, width: usize) -> Result<Self, GameError> {
        check_dimensions(height, width)?;
        Ok(Self {
            height,
            width,
            cells: vec![Cell::Empty; height * width],
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    /// Row a piece dropped into `col` would land in, or `None` when the
    /// column is full or out of range.
    pub fn open_row(&self, col: usize) -> Option<usize> {
        if col >= self.width {
            return None;
        }
        (0..self.height)
            .rev()
            .find(|&row| self.cells[row * self.width + col].is_empty())
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Stacks a piece on `col`, returning the landing row. `None` when the
    /// column is full.
    pub(crate) fn place(&mut self, col: usize, id: PlayerId) -> Option<usize> {
        let row = self.open_row(col)?;
        self.cells[row * self.width + col] = Cell::Occupied(id);
        Some(row)
    }

    /// First four-in-a-row passing through `(row, col)` made of that cell's
    /// owner. Only windows containing the cell are inspected.
    pub fn winning_line(&self, row: usize, col: usize) -> Option<[Position; WIN_LENGTH]> {
        let owner = self.get(row, col)?.owner()?;
        for (dr, dc) in DIRECTIONS {
            for back in 0..WIN_LENGTH as isize {
                let start_row = row as isize - back * dr;
                let start_col = col as isize - back * dc;
                if let Some(line) = self.window(start_row, start_col, dr, dc, owner) {
                    return Some(line);
                }
            }
        }
        None
    }

    fn window(
        &self,
        row: isize,
        col: isize,
        dr: isize,
        dc: isize,
        owner: PlayerId,
    ) -> Option<[Position; WIN_LENGTH]> {
        let mut line = [Position::new(0, 0); WIN_LENGTH];
        for (step, slot) in line.iter_mut().enumerate() {
            let r = row + step as isize * dr;
            let c = col + step as isize * dc;
            if r < 0 || c < 0 {
                return None;
            }
            let (r, c) = (r as usize, c as usize);
            if self.get(r, c)? != Cell::Occupied(owner) {
                return None;
            }
            *slot = Position::new(r, c);
        }
        Some(line)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            cells: vec![Cell::Empty; DEFAULT_HEIGHT * DEFAULT_WIDTH],
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: String = row
                .iter()
                .map(|cell| match cell.owner() {
                    None => '.',
                    Some(PlayerId::One) => '1',
                    Some(PlayerId::Two) => '2',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl From<Board> for BoardRepr {
    fn from(board: Board) -> Self {
        let rows = board
            .cells
            .chunks(board.width)
            .map(|row| row.to_vec())
            .collect();
        BoardRepr {
            height: board.height,
            width: board.width,
            rows,
        }
    }
}

impl TryFrom<BoardRepr> for Board {
    type Error = GameError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        check_dimensions(repr.height, repr.width)?;
        if repr.rows.len() != repr.height {
            return Err(GameError::RowCountMismatch {
                expected: repr.height,
                found: repr.rows.len(),
            });
        }
        let mut cells = Vec::with_capacity(repr.height * repr.width);
        for (row, line) in repr.rows.into_iter().enumerate() {
            if line.len() != repr.width {
                return Err(GameError::RowLengthMismatch {
                    row,
                    expected: repr.width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }
        let board = Board {
            height: repr.height,
            width: repr.width,
            cells,
        };
        for col in 0..board.width {
            for row in 0..board.height - 1 {
                let above = board.cells[row * board.width + col];
                let below = board.cells[(row + 1) * board.width + col];
                if !above.is_empty() && below.is_empty() {
                    return Err(GameError::FloatingPiece { row, col });
                }
            }
        }
        Ok(board)
    }
}

fn check_dimensions(height: usize, width: usize) -> Result<(), GameError> {
    let too_small = height < WIN_LENGTH || width < WIN_LENGTH;
    let too_large = height.saturating_mul(width) > MAX_CELLS;
    if too_small || too_large {
        return Err(GameError::InvalidDimensions { height, width });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(board: &mut Board, col: usize, id: PlayerId, count: usize) {
        for _ in 0..count {
            board.place(col, id).unwrap();
        }
    }

    #[test]
    fn rejects_small_and_huge_boards() {
        assert!(matches!(
            Board::new(3, 7),
            Err(GameError::InvalidDimensions { height: 3, width: 7 })
        ));
        assert!(Board::new(6, 3).is_err());
        assert!(Board::new(100, 100).is_err());
        assert!(Board::new(4, 4).is_ok());
    }

    #[test]
    fn pieces_stack_from_the_bottom() {
        let mut board = Board::default();
        assert_eq!(board.open_row(3), Some(5));
        assert_eq!(board.place(3, PlayerId::One), Some(5));
        assert_eq!(board.place(3, PlayerId::Two), Some(4));
        assert_eq!(board.get(5, 3), Some(Cell::Occupied(PlayerId::One)));
        assert_eq!(board.get(4, 3), Some(Cell::Occupied(PlayerId::Two)));
        assert_eq!(board.open_row(3), Some(3));
        assert_eq!(board.get(6, 0), None);
    }

    #[test]
    fn full_column_has_no_open_row() {
        let mut board = Board::default();
        stack(&mut board, 0, PlayerId::One, DEFAULT_HEIGHT);
        assert_eq!(board.open_row(0), None);
        assert_eq!(board.place(0, PlayerId::Two), None);
        assert_eq!(board.occupied(), DEFAULT_HEIGHT);
        assert!(!board.is_full());
    }

    #[test]
    fn finds_line_through_middle_piece() {
        let mut board = Board::default();
        for col in 1..5 {
            board.place(col, PlayerId::Two);
        }
        let line = board.winning_line(5, 2).unwrap();
        assert_eq!(line[0], Position::new(5, 1));
        assert_eq!(line[3], Position::new(5, 4));
    }

    #[test]
    fn three_is_not_enough() {
        let mut board = Board::default();
        stack(&mut board, 6, PlayerId::One, 3);
        assert!(board.winning_line(3, 6).is_none());
        assert!(board.winning_line(0, 0).is_none());
    }

    #[test]
    fn finds_rising_diagonal() {
        let mut board = Board::default();
        // 1 at (5,0),(4,1),(3,2),(2,3) on top of 2-filler.
        board.place(0, PlayerId::One);
        stack(&mut board, 1, PlayerId::Two, 1);
        board.place(1, PlayerId::One);
        stack(&mut board, 2, PlayerId::Two, 2);
        board.place(2, PlayerId::One);
        stack(&mut board, 3, PlayerId::Two, 3);
        let row = board.place(3, PlayerId::One).unwrap();
        assert_eq!(row, 2);
        assert!(board.winning_line(row, 3).is_some());
        assert!(board.winning_line(4, 1).is_some());
    }

    #[test]
    fn renders_as_text() {
        let mut board = Board::new(4, 4).unwrap();
        board.place(1, PlayerId::One);
        board.place(1, PlayerId::Two);
        assert_eq!(board.to_string(), "....\n....\n.2..\n.1..\n");
    }

    #[test]
    fn json_rejects_floating_piece() {
        let json = r#"{"height":4,"width":4,"rows":[
            [null,null,null,null],
            [null,null,null,null],
            [null,1,null,null],
            [null,null,null,null]]}"#;
        let err = serde_json::from_str::<Board>(json).unwrap_err();
        assert!(err.to_string().contains("floating"), "{err}");
    }

    #[test]
    fn json_rejects_ragged_rows() {
        let json = r#"{"height":4,"width":4,"rows":[[],[],[],[]]}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());
        let json = r#"{"height":4,"width":4,"rows":[]}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());
    }
}
