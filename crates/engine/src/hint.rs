use match_cascade_core::{
    classify, resolve, Grid, MatchSelection, ScoreRules, SwapRejection, Token, TurnStateMachine,
};
use match_cascade_types::{Position, ShapeKind, TokenId};
use thiserror::Error;
use tracing::debug;

/// A swap that would produce at least one match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapHint {
    pub a: TokenId,
    pub b: TokenId,
    pub from: Position,
    pub to: Position,
    /// Score of the first resolution pass; cascades are not predicted
    pub score: u32,
    pub matched_tokens: usize,
    /// Highest-priority shape in the preview selection
    pub shape: ShapeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HintError {
    #[error("no swap on the board produces a match")]
    NoLegalMove,

    #[error("swap rejected: {0}")]
    Rejected(#[from] SwapRejection),
}

impl HintError {
    pub fn code(self) -> &'static str {
        match self {
            HintError::NoLegalMove => "no_legal_move",
            HintError::Rejected(reason) => reason.code(),
        }
    }
}

/// Every matching swap with default scoring, in scan order
pub fn find_swaps(grid: &Grid) -> Vec<SwapHint> {
    find_swaps_with(grid, &ScoreRules::default())
}

/// Every adjacent pair (right and upper neighbour of each cell, scan order)
/// whose swap produces a match. The grid itself is not touched.
pub fn find_swaps_with(grid: &Grid, rules: &ScoreRules) -> Vec<SwapHint> {
    let mut scratch = grid.clone();
    let mut hints = Vec::new();

    for from in grid.positions() {
        for (dc, dr) in [(1, 0), (0, 1)] {
            let to = from.offset(dc, dr);
            if let Some(hint) = preview(&mut scratch, from, to, rules) {
                hints.push(hint);
            }
        }
    }
    hints
}

fn preview(scratch: &mut Grid, from: Position, to: Position, rules: &ScoreRules) -> Option<SwapHint> {
    let (a, b, selection) = created_matches(scratch, from, to)?;
    let top = selection.iter().next()?;
    Some(SwapHint {
        a: a.id,
        b: b.id,
        from,
        to,
        score: rules.selection_score(&selection),
        matched_tokens: selection.token_count(),
        shape: top.shape,
    })
}

/// Swap, keep only the matches that include one of the two moved tokens,
/// then swap back. Matches already on the board do not count.
fn created_matches(
    scratch: &mut Grid,
    from: Position,
    to: Position,
) -> Option<(Token, Token, MatchSelection)> {
    let a = scratch.token_at(from)?;
    let b = scratch.token_at(to)?;
    if a.kind == b.kind {
        return None;
    }

    scratch.swap(from, to);
    let involved = classify(scratch)
        .into_iter()
        .filter(|c| c.contains(a.id) || c.contains(b.id))
        .collect();
    scratch.swap(from, to);

    let selection = resolve(involved);
    if selection.is_empty() {
        None
    } else {
        Some((a, b, selection))
    }
}

pub fn best_swap(grid: &Grid) -> Option<SwapHint> {
    best_swap_with(grid, &ScoreRules::default())
}

/// Highest preview score; the earliest in scan order wins ties
pub fn best_swap_with(grid: &Grid, rules: &ScoreRules) -> Option<SwapHint> {
    find_swaps_with(grid, rules)
        .into_iter()
        .fold(None, |best: Option<SwapHint>, hint| match best {
            Some(b) if b.score >= hint.score => Some(b),
            _ => Some(hint),
        })
}

/// False when the board is deadlocked
pub fn has_legal_move(grid: &Grid) -> bool {
    let mut scratch = grid.clone();
    grid.positions().any(|from| {
        [(1, 0), (0, 1)]
            .into_iter()
            .any(|(dc, dr)| created_matches(&mut scratch, from, from.offset(dc, dr)).is_some())
    })
}

/// Request the best swap on the machine's board.
pub fn apply_best_swap(machine: &mut TurnStateMachine) -> Result<SwapHint, HintError> {
    let rules = machine.config().scoring;
    let hint = best_swap_with(machine.grid(), &rules).ok_or(HintError::NoLegalMove)?;
    machine.request_swap(hint.a, hint.b)?;
    debug!(from = %hint.from, to = %hint.to, score = hint.score, "applied hinted swap");
    Ok(hint)
}
