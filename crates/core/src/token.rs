//! Tokens and the factory collaborator that mints them.

use serde::Serialize;

use crate::types::{Position, TokenId, TokenKind};

/// A typed game piece occupying one grid cell.
///
/// `position` always mirrors the key of the cell holding the token; the grid
/// rewrites it on every placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub id: TokenId,
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(id: TokenId, kind: TokenKind, position: Position) -> Self {
        Self { id, kind, position }
    }
}

/// Creates tokens for the initial fill and for refills after gravity.
///
/// Rendering and pooling concerns live behind this trait; the engine only
/// requires that every returned token carries a fresh, unique id.
pub trait TokenFactory {
    fn create(&mut self, kind: TokenKind, position: Position) -> Token;
}

/// Default factory: monotonically increasing ids starting at 1.
#[derive(Debug, Clone, Default)]
pub struct SequentialTokenFactory {
    next_id: u32,
}

impl SequentialTokenFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after `last`, for grids built elsewhere
    pub fn starting_after(last: TokenId) -> Self {
        Self { next_id: last.0 }
    }

    /// Number of tokens minted so far
    pub fn issued(&self) -> u32 {
        self.next_id
    }
}

impl TokenFactory for SequentialTokenFactory {
    fn create(&mut self, kind: TokenKind, position: Position) -> Token {
        self.next_id = self.next_id.wrapping_add(1);
        Token::new(TokenId(self.next_id), kind, position)
    }
}

impl<F: TokenFactory + ?Sized> TokenFactory for Box<F> {
    fn create(&mut self, kind: TokenKind, position: Position) -> Token {
        (**self).create(kind, position)
    }
}
