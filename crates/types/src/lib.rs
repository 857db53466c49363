//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the match engine.
//! All types are plain data with no game logic, making them usable in any
//! context (classification, turn sequencing, hint search, snapshots).
//!
//! # Board Coordinates
//!
//! Cells are addressed as `(col, row)`:
//!
//! - **col**: 0 is the leftmost column
//! - **row**: 0 is the **bottom** row; gravity pulls tokens towards row 0
//! - **Default size**: 8 columns x 8 rows
//!
//! # Turn Timing Constants
//!
//! Timing values are in milliseconds and stand in for presentation time
//! (swap tween, clear effect, fall tween). No game logic runs while a timer
//! is pending.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `SWAP_DELAY_MS` | 300 | Wait after exchanging two tokens |
//! | `MATCH_CHECK_DELAY_MS` | 500 | Wait before each classification pass |
//! | `CLEAR_DELAY_MS` | 500 | Wait after clearing a selection |
//! | `FALL_DELAY_MS` | 300 | Wait after compaction and refill |
//!
//! # Examples
//!
//! ```
//! use match_cascade_types::{Position, ShapeKind, TokenKind};
//!
//! let kind = TokenKind::from_char('g').unwrap();
//! assert_eq!(kind, TokenKind::Green);
//!
//! let a = Position::new(3, 4);
//! assert!(a.is_adjacent(Position::new(3, 5)));
//! assert!(!a.is_adjacent(Position::new(4, 5)));
//!
//! assert!(ShapeKind::Line5.shape_bonus() > ShapeKind::TShape.shape_bonus());
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells (8 columns)
pub const BOARD_WIDTH: u8 = 8;

/// Default board height in cells (8 rows)
pub const BOARD_HEIGHT: u8 = 8;

/// Largest accepted board dimension on either axis
pub const MAX_BOARD_DIM: u8 = 64;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Wait after two tokens exchange places
pub const SWAP_DELAY_MS: u32 = 300;

/// Wait before each classification pass
pub const MATCH_CHECK_DELAY_MS: u32 = 500;

/// Wait after a selection has been cleared from the board
pub const CLEAR_DELAY_MS: u32 = 500;

/// Wait after compaction and refill
pub const FALL_DELAY_MS: u32 = 300;

/// Points per cleared token
pub const BASE_SCORE_PER_TOKEN: u32 = 100;

/// Points per token beyond the third in one match
pub const EXTRA_TOKEN_BONUS: u32 = 50;

/// Shortest run that counts as a match
pub const MIN_MATCH_LEN: u8 = 3;

/// Priority weight of each covered token (`priority = tokens * 10 + bonus`)
pub const PRIORITY_PER_TOKEN: u32 = 10;

/// Upper bound on resolution passes when settling a turn synchronously
pub const MAX_CASCADE_PASSES: u32 = 64;

/// The six token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl TokenKind {
    /// Every kind, in declaration order
    pub const ALL: [TokenKind; 6] = [
        TokenKind::Red,
        TokenKind::Blue,
        TokenKind::Green,
        TokenKind::Yellow,
        TokenKind::Purple,
        TokenKind::Orange,
    ];

    /// Number of kinds
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        match self {
            TokenKind::Red => 0,
            TokenKind::Blue => 1,
            TokenKind::Green => 2,
            TokenKind::Yellow => 3,
            TokenKind::Purple => 4,
            TokenKind::Orange => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse kind from its single-letter code (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use match_cascade_types::TokenKind;
    ///
    /// assert_eq!(TokenKind::from_char('R'), Some(TokenKind::Red));
    /// assert_eq!(TokenKind::from_char('o'), Some(TokenKind::Orange));
    /// assert_eq!(TokenKind::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(TokenKind::Red),
            'B' => Some(TokenKind::Blue),
            'G' => Some(TokenKind::Green),
            'Y' => Some(TokenKind::Yellow),
            'P' => Some(TokenKind::Purple),
            'O' => Some(TokenKind::Orange),
            _ => None,
        }
    }

    /// Single uppercase letter used in text layouts
    pub fn as_char(self) -> char {
        match self {
            TokenKind::Red => 'R',
            TokenKind::Blue => 'B',
            TokenKind::Green => 'G',
            TokenKind::Yellow => 'Y',
            TokenKind::Purple => 'P',
            TokenKind::Orange => 'O',
        }
    }

    /// Parse kind from its name (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(TokenKind::Red),
            "blue" => Some(TokenKind::Blue),
            "green" => Some(TokenKind::Green),
            "yellow" => Some(TokenKind::Yellow),
            "purple" => Some(TokenKind::Purple),
            "orange" => Some(TokenKind::Orange),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Red => "red",
            TokenKind::Blue => "blue",
            TokenKind::Green => "green",
            TokenKind::Yellow => "yellow",
            TokenKind::Purple => "purple",
            TokenKind::Orange => "orange",
        }
    }
}

/// Stable identity of a token for its whole lifetime on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u32);

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A `(col, row)` cell address; row 0 is the bottom row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub col: i8,
    pub row: i8,
}

impl Position {
    pub const fn new(col: i8, row: i8) -> Self {
        Self { col, row }
    }

    /// Position shifted by `(dc, dr)`; may leave the board
    pub fn offset(self, dc: i8, dr: i8) -> Self {
        Self {
            col: self.col.saturating_add(dc),
            row: self.row.saturating_add(dr),
        }
    }

    /// 4-directional adjacency: exactly one axis differs, by exactly 1
    pub fn is_adjacent(self, other: Position) -> bool {
        let dc = (self.col as i16 - other.col as i16).abs();
        let dr = (self.row as i16 - other.row as i16).abs();
        (dc == 1 && dr == 0) || (dc == 0 && dr == 1)
    }
}

impl From<(i8, i8)> for Position {
    fn from((col, row): (i8, i8)) -> Self {
        Self::new(col, row)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Line orientation of a straight match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

/// Matchable shapes, declared in strictly descending priority order
///
/// - **Line5**: five or more in a straight line
/// - **TShape**: T junction or full cross, at least five cells
/// - **LShape**: two perpendicular runs of three or more meeting at a corner
/// - **SquarePlusOne**: 2x2 block plus one same-kind perimeter neighbour
/// - **Square**: bare 2x2 block
/// - **Line4**: exactly four in a straight line (rocket)
/// - **Line3**: exactly three in a straight line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Line5,
    TShape,
    LShape,
    SquarePlusOne,
    Square,
    Line4,
    Line3,
}

impl ShapeKind {
    /// Every shape, highest priority first
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Line5,
        ShapeKind::TShape,
        ShapeKind::LShape,
        ShapeKind::SquarePlusOne,
        ShapeKind::Square,
        ShapeKind::Line4,
        ShapeKind::Line3,
    ];

    /// Shape bonus added to both priority and score
    pub fn shape_bonus(self) -> u32 {
        match self {
            ShapeKind::Line5 => 1000,
            ShapeKind::TShape => 800,
            ShapeKind::LShape => 700,
            ShapeKind::SquarePlusOne => 650,
            ShapeKind::Square => 600,
            ShapeKind::Line4 => 400,
            ShapeKind::Line3 => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Line5 => "line5",
            ShapeKind::TShape => "t_shape",
            ShapeKind::LShape => "l_shape",
            ShapeKind::SquarePlusOne => "square_plus_one",
            ShapeKind::Square => "square",
            ShapeKind::Line4 => "line4",
            ShapeKind::Line3 => "line3",
        }
    }
}

/// Externally visible phase of a turn
///
/// The cycle is Idle → Swapping → Matching → (Falling → Matching)* → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    /// Waiting for a swap request
    Idle,
    /// Two tokens have exchanged places; waiting for the swap to settle
    Swapping,
    /// Classifying, resolving and clearing matches
    Matching,
    /// Compacting columns and refilling
    Falling,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Swapping => "swapping",
            TurnPhase::Matching => "matching",
            TurnPhase::Falling => "falling",
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
