//! Grid module - owns the 2-D array of tokens
//!
//! The grid is `width x height` cells, each empty or holding one [`Token`].
//! Uses a flat vector in row-major order (`row * width + col`) for cache locality.
//! Coordinates: `(col, row)` where col runs left to right and row 0 is the
//! bottom row.
//!
//! Out-of-range `get`/`set` calls never panic: they return `None`/`false` and
//! log a warning, since they always indicate a caller bug.

use std::fmt;

use tracing::warn;

use crate::error::GridError;
use crate::token::{Token, TokenFactory};
use crate::types::{Position, TokenId, TokenKind, BOARD_HEIGHT, BOARD_WIDTH, MAX_BOARD_DIM};

/// Cell on the grid (None = empty, Some = occupied)
pub type Cell = Option<Token>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: u8, height: u8) -> Result<Self, GridError> {
        if width == 0 || height == 0 || width > MAX_BOARD_DIM || height > MAX_BOARD_DIM {
            return Err(GridError::InvalidDimensions {
                width: width as usize,
                height: height as usize,
                max: MAX_BOARD_DIM,
            });
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        })
    }

    #[inline(always)]
    fn index(&self, col: i8, row: i8) -> Option<usize> {
        if col < 0 || col >= self.width as i8 || row < 0 || row >= self.height as i8 {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Check if `(col, row)` lies inside the grid
    pub fn is_valid(&self, col: i8, row: i8) -> bool {
        self.index(col, row).is_some()
    }

    /// Get cell at `(col, row)`.
    /// Returns None if out of bounds, `Some(None)` for an empty cell.
    pub fn get(&self, col: i8, row: i8) -> Option<Cell> {
        match self.index(col, row) {
            Some(idx) => Some(self.cells[idx]),
            None => {
                warn!(
                    col,
                    row,
                    width = self.width,
                    height = self.height,
                    "grid read outside bounds"
                );
                None
            }
        }
    }

    /// Set cell at `(col, row)`, rewriting the token's stored position.
    /// Returns false if out of bounds (nothing is written).
    ///
    /// A token is owned by at most one cell. Placing a token that already
    /// sits elsewhere panics in debug builds; release builds empty the old
    /// cell and log a warning.
    pub fn set(&mut self, col: i8, row: i8, cell: Cell) -> bool {
        match self.index(col, row) {
            Some(idx) => {
                if let Some(token) = cell {
                    self.release_duplicate(token.id, idx);
                }
                self.cells[idx] = cell.map(|mut token| {
                    token.position = Position::new(col, row);
                    token
                });
                true
            }
            None => {
                warn!(
                    col,
                    row,
                    width = self.width,
                    height = self.height,
                    "grid write outside bounds ignored"
                );
                false
            }
        }
    }

    fn release_duplicate(&mut self, id: TokenId, target: usize) {
        let stale = (0..self.cells.len())
            .find(|&idx| idx != target && self.cells[idx].is_some_and(|t| t.id == id));
        debug_assert!(stale.is_none(), "token {} is already on the grid", id);
        if let Some(idx) = stale {
            let from = self.cells[idx].map(|t| t.position);
            warn!(%id, ?from, "token placed twice, clearing its old cell");
            self.cells[idx] = None;
        }
    }

    /// Token at `pos`, or None for empty and out-of-range cells.
    ///
    /// Unlike [`Grid::get`] this does not warn: neighbour probes past the
    /// edge are expected during classification.
    pub fn token_at(&self, pos: Position) -> Option<Token> {
        self.index(pos.col, pos.row).and_then(|idx| self.cells[idx])
    }

    pub fn kind_at(&self, pos: Position) -> Option<TokenKind> {
        self.token_at(pos).map(|t| t.kind)
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, col: i8, row: i8) -> bool {
        matches!(self.index(col, row).map(|idx| self.cells[idx]), Some(Some(_)))
    }

    /// Check if position is empty (within bounds and unoccupied)
    pub fn is_empty_at(&self, col: i8, row: i8) -> bool {
        matches!(self.index(col, row).map(|idx| self.cells[idx]), Some(None))
    }

    /// Remove and return the token at `pos`
    pub fn take(&mut self, pos: Position) -> Option<Token> {
        match self.index(pos.col, pos.row) {
            Some(idx) => self.cells[idx].take(),
            None => {
                warn!(%pos, "grid take outside bounds ignored");
                None
            }
        }
    }

    /// Exchange the contents of two cells, updating both tokens' positions.
    /// Returns false (and changes nothing) if either cell is out of range.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a.col, a.row), self.index(b.col, b.row)) else {
            warn!(%a, %b, "grid swap outside bounds ignored");
            return false;
        };

        self.cells.swap(ia, ib);
        if let Some(token) = self.cells[ia].as_mut() {
            token.position = a;
        }
        if let Some(token) = self.cells[ib].as_mut() {
            token.position = b;
        }
        true
    }

    /// Locate a token by identity
    pub fn find(&self, id: TokenId) -> Option<Token> {
        self.cells.iter().flatten().find(|t| t.id == id).copied()
    }

    /// All cell positions in scan order: columns left to right, rows bottom to top
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let height = self.height as i8;
        (0..self.width as i8).flat_map(move |col| (0..height).map(move |row| Position::new(col, row)))
    }

    /// All tokens in scan order
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.positions().filter_map(|pos| self.token_at(pos))
    }

    pub fn token_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.len() - self.token_count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// True when some token sits above an empty cell in its column
    pub fn has_gaps(&self) -> bool {
        (0..self.width as i8).any(|col| {
            let mut seen_empty = false;
            for row in 0..self.height as i8 {
                if self.is_occupied(col, row) {
                    if seen_empty {
                        return true;
                    }
                } else {
                    seen_empty = true;
                }
            }
            false
        })
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Token kinds by row, top row first (the same orientation as [`fmt::Display`])
    pub fn kind_rows(&self) -> Vec<Vec<Option<TokenKind>>> {
        (0..self.height as i8)
            .rev()
            .map(|row| {
                (0..self.width as i8)
                    .map(|col| self.kind_at(Position::new(col, row)))
                    .collect()
            })
            .collect()
    }

    /// Build a grid from a text layout, one line per row with the top row first.
    ///
    /// Letters are token codes (`R B G Y P O`, case-insensitive); `.` marks an
    /// empty cell. Whitespace inside a line is ignored and blank lines are
    /// skipped. Ids are minted by `factory` in scan order.
    pub fn parse_with<F: TokenFactory + ?Sized>(
        layout: &str,
        factory: &mut F,
    ) -> Result<Self, GridError> {
        let lines: Vec<Vec<char>> = layout
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(GridError::EmptyLayout);
        };
        let width = first.len();
        let height = lines.len();
        if width > MAX_BOARD_DIM as usize || height > MAX_BOARD_DIM as usize {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                max: MAX_BOARD_DIM,
            });
        }

        let mut kinds = vec![None; width * height];
        for (line_idx, line) in lines.iter().enumerate() {
            if line.len() != width {
                return Err(GridError::RaggedLayout {
                    row: line_idx,
                    expected: width,
                    found: line.len(),
                });
            }
            let row = height - 1 - line_idx;
            for (col, &code) in line.iter().enumerate() {
                kinds[row * width + col] = match code {
                    '.' | '_' => None,
                    c => Some(TokenKind::from_char(c).ok_or(GridError::UnknownCode {
                        code: c,
                        line: line_idx,
                        column: col,
                    })?),
                };
            }
        }

        let mut grid = Grid::new(width as u8, height as u8)?;
        let positions: Vec<Position> = grid.positions().collect();
        for pos in positions {
            let idx = pos.row as usize * width + pos.col as usize;
            if let Some(kind) = kinds[idx] {
                let token = factory.create(kind, pos);
                grid.set(pos.col, pos.row, Some(token));
            }
        }
        Ok(grid)
    }

    /// [`Grid::parse_with`] using sequential ids starting at 1
    pub fn parse(layout: &str) -> Result<Self, GridError> {
        let mut factory = crate::token::SequentialTokenFactory::new();
        Self::parse_with(layout, &mut factory)
    }

    /// Highest token id currently on the grid
    pub fn max_token_id(&self) -> Option<TokenId> {
        self.cells.iter().flatten().map(|t| t.id).max()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            cells: vec![None; BOARD_WIDTH as usize * BOARD_HEIGHT as usize],
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height as i8).rev() {
            for col in 0..self.width as i8 {
                let c = self
                    .kind_at(Position::new(col, row))
                    .map(|k| k.as_char())
                    .unwrap_or('.');
                write!(f, "{}", c)?;
            }
            if row > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::new(8, 6).unwrap();
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(7, 0), Some(7));
        assert_eq!(grid.index(0, 1), Some(8));
        assert_eq!(grid.index(7, 5), Some(47));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(8, 0), None);
        assert_eq!(grid.index(0, 6), None);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Grid::new(0, 4),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(Grid::new(MAX_BOARD_DIM + 1, 4).is_err());
        assert!(Grid::new(MAX_BOARD_DIM, MAX_BOARD_DIM).is_ok());
    }

    #[test]
    fn test_set_rewrites_position() {
        let mut grid = Grid::default();
        let token = Token::new(TokenId(5), TokenKind::Red, Position::new(0, 0));
        assert!(grid.set(3, 4, Some(token)));
        let stored = grid.get(3, 4).unwrap().unwrap();
        assert_eq!(stored.position, Position::new(3, 4));
        assert_eq!(grid.cells[4 * 8 + 3].unwrap().id, TokenId(5));
    }

    #[test]
    fn test_set_same_cell_twice_is_allowed() {
        let mut grid = Grid::new(3, 1).unwrap();
        let token = Token::new(TokenId(1), TokenKind::Red, Position::new(0, 0));
        assert!(grid.set(1, 0, Some(token)));
        assert!(grid.set(1, 0, Some(token)));
        assert_eq!(grid.token_count(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already on the grid")]
    fn test_set_duplicate_token_panics_in_debug() {
        let mut grid = Grid::new(3, 1).unwrap();
        let token = Token::new(TokenId(1), TokenKind::Red, Position::new(0, 0));
        grid.set(0, 0, Some(token));
        grid.set(2, 0, Some(token));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_set_duplicate_token_moves_it() {
        let mut grid = Grid::new(3, 1).unwrap();
        let token = Token::new(TokenId(1), TokenKind::Red, Position::new(0, 0));
        grid.set(0, 0, Some(token));
        grid.set(2, 0, Some(token));
        let ids: Vec<TokenId> = grid.tokens().map(|t| t.id).collect();
        assert_eq!(ids, vec![TokenId(1)]);
        assert_eq!(grid.find(TokenId(1)).unwrap().position, Position::new(2, 0));
    }

    #[test]
    fn test_swap_updates_both_positions() {
        let mut grid = Grid::parse("RB").unwrap();
        let a = Position::new(0, 0);
        let b = Position::new(1, 0);
        assert!(grid.swap(a, b));
        assert_eq!(grid.token_at(a).unwrap().kind, TokenKind::Blue);
        assert_eq!(grid.token_at(a).unwrap().position, a);
        assert_eq!(grid.token_at(b).unwrap().kind, TokenKind::Red);
        assert_eq!(grid.token_at(b).unwrap().position, b);
    }

    #[test]
    fn test_swap_out_of_bounds_is_noop() {
        let mut grid = Grid::parse("RB").unwrap();
        let before = grid.clone();
        assert!(!grid.swap(Position::new(0, 0), Position::new(2, 0)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_parse_orientation() {
        let grid = Grid::parse(
            "
            R.
            GB
            ",
        )
        .unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.kind_at(Position::new(0, 1)), Some(TokenKind::Red));
        assert_eq!(grid.kind_at(Position::new(1, 1)), None);
        assert_eq!(grid.kind_at(Position::new(0, 0)), Some(TokenKind::Green));
        assert_eq!(grid.kind_at(Position::new(1, 0)), Some(TokenKind::Blue));
        // Ids follow scan order: column 0 bottom-up, then column 1.
        assert_eq!(grid.token_at(Position::new(0, 0)).unwrap().id, TokenId(1));
        assert_eq!(grid.token_at(Position::new(0, 1)).unwrap().id, TokenId(2));
        assert_eq!(grid.token_at(Position::new(1, 0)).unwrap().id, TokenId(3));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Grid::parse("  \n "), Err(GridError::EmptyLayout));
        assert!(matches!(
            Grid::parse("RG\nR"),
            Err(GridError::RaggedLayout { row: 1, .. })
        ));
        assert!(matches!(
            Grid::parse("RX"),
            Err(GridError::UnknownCode { code: 'X', .. })
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        let layout = "RG.\nBYO\nPPR";
        let grid = Grid::parse(layout).unwrap();
        assert_eq!(grid.to_string(), layout);
    }

    #[test]
    fn test_has_gaps() {
        assert!(!Grid::parse("..\nRG").unwrap().has_gaps());
        assert!(Grid::parse("R.\n.G").unwrap().has_gaps());
        assert!(!Grid::parse("..\n..").unwrap().has_gaps());
    }
}
