//! Gravity module - column compaction and refill
//!
//! Compaction is stable: surviving tokens in a column keep their relative
//! order and only ever move down. Refill then scans the whole grid in scan
//! order and fills every empty cell with a freshly minted token.

use serde::Serialize;
use tracing::debug;

use crate::grid::Grid;
use crate::rng::RandomSource;
use crate::token::{Token, TokenFactory};
use crate::types::Position;

/// A surviving token that changed row during compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenFall {
    pub token: Token,
    pub from: Position,
    pub to: Position,
}

/// Outcome of one gravity step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GravityReport {
    pub falls: Vec<TokenFall>,
    pub spawned: Vec<Token>,
}

impl GravityReport {
    /// Whether any surviving token changed row
    pub fn moved(&self) -> bool {
        !self.falls.is_empty()
    }
}

/// Pull every token in each column down over the gaps below it.
///
/// Uses a write cursor per column (bottom to top), moving each token to the
/// lowest free row. Returns the moves in scan order.
pub fn compact(grid: &mut Grid) -> Vec<TokenFall> {
    let mut falls = Vec::new();
    let height = grid.height() as i8;

    for col in 0..grid.width() as i8 {
        let mut write_row = 0i8;
        for read_row in 0..height {
            if !grid.is_occupied(col, read_row) {
                continue;
            }
            if write_row != read_row {
                let from = Position::new(col, read_row);
                let to = Position::new(col, write_row);
                // The destination is always empty, so the swap is a move.
                grid.swap(from, to);
                if let Some(token) = grid.token_at(to) {
                    falls.push(TokenFall { token, from, to });
                }
            }
            write_row += 1;
        }
    }
    falls
}

/// Fill every empty cell with a new token of a randomly drawn kind.
pub fn refill<F, R>(grid: &mut Grid, factory: &mut F, rng: &mut R) -> Vec<Token>
where
    F: TokenFactory + ?Sized,
    R: RandomSource + ?Sized,
{
    let empty: Vec<Position> = grid
        .positions()
        .filter(|&pos| grid.is_empty_at(pos.col, pos.row))
        .collect();

    let mut spawned = Vec::with_capacity(empty.len());
    for pos in empty {
        let token = factory.create(rng.next_kind(), pos);
        if grid.set(pos.col, pos.row, Some(token)) {
            // `set` normalises the position; report what the grid now holds.
            if let Some(placed) = grid.token_at(pos) {
                spawned.push(placed);
            }
        }
    }
    spawned
}

/// Compact every column, then refill. Leaves the grid full.
pub fn apply_gravity<F, R>(grid: &mut Grid, factory: &mut F, rng: &mut R) -> GravityReport
where
    F: TokenFactory + ?Sized,
    R: RandomSource + ?Sized,
{
    let falls = compact(grid);
    let spawned = refill(grid, factory, rng);
    debug!(
        fell = falls.len(),
        spawned = spawned.len(),
        "gravity applied"
    );
    GravityReport { falls, spawned }
}
