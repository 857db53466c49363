//! Shape classification - every matchable shape anchored at each occupied cell
//!
//! Each occupied cell is used as a seed, in scan order (columns left to right,
//! rows bottom to top). From the seed four one-directional runs of the seed's
//! kind are measured (each run counts the seed itself), merged into a
//! horizontal and a vertical line, and tested against the shapes in
//! descending priority:
//!
//! | Shape | Test | Bonus |
//! |-------|------|-------|
//! | Line5 | a merged line of 5 or more | 1000 |
//! | TShape | both lines >= 3 (cross), or a line >= 3 plus a one-cell stub, >= 5 cells | 800 |
//! | LShape | two perpendicular runs >= 3 meeting at the seed | 700 |
//! | SquarePlusOne | 2x2 block with the seed lower-left, plus a perimeter neighbour | 650 |
//! | Square | bare 2x2 block | 600 |
//! | Line4 | a merged line of exactly 4 | 400 |
//! | Line3 | a merged line of 3 | 0 |
//!
//! The first shape that matches becomes the seed's only candidate. Candidates
//! from neighbouring seeds overlap freely; [`crate::resolve`] removes overlap.
//!
//! When the seed is the corner of two perpendicular runs of three or more (an
//! endpoint of both lines) the arrangement is an L, so the cross/T test skips it.

use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::trace;

use crate::grid::Grid;
use crate::token::Token;
use crate::types::{Axis, Position, ShapeKind, TokenId, TokenKind, MIN_MATCH_LEN, PRIORITY_PER_TOKEN};

/// Perimeter of the 2x2 block whose lower-left cell is the seed, in scan order:
/// left side, right side, below, above.
const SQUARE_PERIMETER: [(i8, i8); 8] = [
    (-1, 0),
    (-1, 1),
    (2, 0),
    (2, 1),
    (0, -1),
    (1, -1),
    (0, 2),
    (1, 2),
];

/// Shortest line that counts as a Line5
const LINE5_LEN: u8 = 5;

/// Exact length of a Line4
const LINE4_LEN: u8 = 4;

/// Fewest distinct cells in a T or L
const MIN_BENT_CELLS: u8 = 5;

/// A provisional match found from one seed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub shape: ShapeKind,
    /// Line orientation for straight shapes
    pub axis: Option<Axis>,
    pub kind: TokenKind,
    /// Seed cell the shape was found from
    pub anchor: Position,
    /// Covered tokens; each appears exactly once
    pub members: Vec<Token>,
    pub priority: u32,
}

impl MatchCandidate {
    fn new(
        shape: ShapeKind,
        axis: Option<Axis>,
        kind: TokenKind,
        anchor: Position,
        members: Vec<Token>,
    ) -> Self {
        let priority = priority_for(shape, members.len());
        Self {
            shape,
            axis,
            kind,
            anchor,
            members,
            priority,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn token_ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.members.iter().map(|t| t.id)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.members.iter().map(|t| t.position)
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.members.iter().any(|t| t.id == id)
    }
}

impl std::fmt::Display for MatchCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x{} {} (priority {}) at [",
            self.shape.as_str(),
            self.members.len(),
            self.kind.as_str(),
            self.priority
        )?;
        for (i, pos) in self.positions().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pos)?;
        }
        write!(f, "]")
    }
}

/// `tokens * 10 + shape bonus`
pub fn priority_for(shape: ShapeKind, token_count: usize) -> u32 {
    (token_count as u32)
        .saturating_mul(PRIORITY_PER_TOKEN)
        .saturating_add(shape.shape_bonus())
}

/// One-directional run lengths from a seed, each including the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Runs {
    up: u8,
    down: u8,
    left: u8,
    right: u8,
}

impl Runs {
    fn measure(grid: &Grid, seed: Position, kind: TokenKind) -> Self {
        Self {
            up: run_length(grid, seed, kind, 0, 1),
            down: run_length(grid, seed, kind, 0, -1),
            left: run_length(grid, seed, kind, -1, 0),
            right: run_length(grid, seed, kind, 1, 0),
        }
    }

    fn horizontal(&self) -> u8 {
        self.left + self.right - 1
    }

    fn vertical(&self) -> u8 {
        self.up + self.down - 1
    }

    /// The seed ends both the horizontal and the vertical line
    fn is_corner(&self) -> bool {
        (self.left == 1 || self.right == 1) && (self.up == 1 || self.down == 1)
    }
}

fn run_length(grid: &Grid, seed: Position, kind: TokenKind, dc: i8, dr: i8) -> u8 {
    let mut len = 1u8;
    let mut pos = seed.offset(dc, dr);
    while grid.kind_at(pos) == Some(kind) {
        len = len.saturating_add(1);
        pos = pos.offset(dc, dr);
    }
    len
}

/// Ordered set of covered cells; a cell reached twice is kept once.
struct Cover {
    cells: Vec<Position>,
}

impl Cover {
    fn new() -> Self {
        Self {
            cells: Vec::with_capacity(8),
        }
    }

    fn push(&mut self, pos: Position) {
        if !self.cells.contains(&pos) {
            self.cells.push(pos);
        }
    }

    /// `len` cells from `start` stepping by `(dc, dr)`; `start` included
    fn push_run(&mut self, start: Position, dc: i8, dr: i8, len: u8) {
        let mut pos = start;
        for _ in 0..len {
            self.push(pos);
            pos = pos.offset(dc, dr);
        }
    }

    fn push_line(&mut self, seed: Position, runs: &Runs, axis: Axis) {
        match axis {
            Axis::Horizontal => {
                let start = seed.offset(-(runs.left as i8 - 1), 0);
                self.push_run(start, 1, 0, runs.horizontal());
            }
            Axis::Vertical => {
                let start = seed.offset(0, -(runs.down as i8 - 1));
                self.push_run(start, 0, 1, runs.vertical());
            }
        }
    }

    fn into_tokens(self, grid: &Grid) -> Vec<Token> {
        self.cells
            .into_iter()
            .filter_map(|pos| grid.token_at(pos))
            .collect()
    }
}

/// Classify every occupied cell and collect all seed-level candidates.
///
/// Overlapping candidates from different seeds are expected. An empty grid
/// yields an empty list.
pub fn classify(grid: &Grid) -> Vec<MatchCandidate> {
    let candidates: Vec<MatchCandidate> = grid
        .positions()
        .filter_map(|pos| classify_seed(grid, pos))
        .collect();
    trace!(count = candidates.len(), "classified grid");
    candidates
}

/// Classify the single shape anchored at `seed`, if any.
pub fn classify_seed(grid: &Grid, seed: Position) -> Option<MatchCandidate> {
    let kind = grid.kind_at(seed)?;
    let runs = Runs::measure(grid, seed, kind);
    let h = runs.horizontal();
    let v = runs.vertical();

    if h < MIN_MATCH_LEN && v < MIN_MATCH_LEN {
        return square(grid, seed, kind);
    }

    let line = |axis: Axis, shape: ShapeKind| {
        let mut cover = Cover::new();
        cover.push_line(seed, &runs, axis);
        MatchCandidate::new(shape, Some(axis), kind, seed, cover.into_tokens(grid))
    };

    // Line5
    if h >= LINE5_LEN {
        return Some(line(Axis::Horizontal, ShapeKind::Line5));
    }
    if v >= LINE5_LEN {
        return Some(line(Axis::Vertical, ShapeKind::Line5));
    }

    // Cross / T
    let l_candidate = l_shape(grid, seed, kind, &runs);
    if !(runs.is_corner() && l_candidate.is_some()) {
        if let Some(candidate) = t_shape(grid, seed, kind, &runs) {
            return Some(candidate);
        }
    }

    // L
    if let Some(candidate) = l_candidate {
        return Some(candidate);
    }

    // Square+1 / Square
    if let Some(candidate) = square(grid, seed, kind) {
        return Some(candidate);
    }

    // Line4 / Line3
    if h == LINE4_LEN {
        return Some(line(Axis::Horizontal, ShapeKind::Line4));
    }
    if v == LINE4_LEN {
        return Some(line(Axis::Vertical, ShapeKind::Line4));
    }
    if h >= MIN_MATCH_LEN {
        return Some(line(Axis::Horizontal, ShapeKind::Line3));
    }
    if v >= MIN_MATCH_LEN {
        return Some(line(Axis::Vertical, ShapeKind::Line3));
    }
    None
}

fn t_shape(grid: &Grid, seed: Position, kind: TokenKind, runs: &Runs) -> Option<MatchCandidate> {
    let h = runs.horizontal();
    let v = runs.vertical();

    let mut cover = Cover::new();
    if h >= MIN_MATCH_LEN && v >= MIN_MATCH_LEN {
        // Cross, or a T whose junction is the seed.
        cover.push_line(seed, runs, Axis::Horizontal);
        cover.push_line(seed, runs, Axis::Vertical);
    } else if h >= MIN_MATCH_LEN {
        let (dr, stub) = single_stub(runs.up, runs.down)?;
        if h + stub - 1 < MIN_BENT_CELLS {
            return None;
        }
        cover.push_line(seed, runs, Axis::Horizontal);
        cover.push_run(seed, 0, dr, stub);
    } else if v >= MIN_MATCH_LEN {
        let (dc, stub) = single_stub(runs.right, runs.left)?;
        if v + stub - 1 < MIN_BENT_CELLS {
            return None;
        }
        cover.push_line(seed, runs, Axis::Vertical);
        cover.push_run(seed, dc, 0, stub);
    } else {
        return None;
    }

    Some(MatchCandidate::new(
        ShapeKind::TShape,
        None,
        kind,
        seed,
        cover.into_tokens(grid),
    ))
}

/// Exactly one of two opposite runs reaches 2 while the other stays below 2.
/// Returns the step towards the stub (`+1` for the first run) and its length.
fn single_stub(positive: u8, negative: u8) -> Option<(i8, u8)> {
    match (positive >= 2, negative >= 2) {
        (true, false) => Some((1, positive)),
        (false, true) => Some((-1, negative)),
        _ => None,
    }
}

fn l_shape(grid: &Grid, seed: Position, kind: TokenKind, runs: &Runs) -> Option<MatchCandidate> {
    let pairs: [((i8, i8, u8), (i8, i8, u8)); 4] = [
        ((1, 0, runs.right), (0, 1, runs.up)),
        ((1, 0, runs.right), (0, -1, runs.down)),
        ((-1, 0, runs.left), (0, 1, runs.up)),
        ((-1, 0, runs.left), (0, -1, runs.down)),
    ];

    for ((hc, hr, h_len), (vc, vr, v_len)) in pairs {
        if h_len < MIN_MATCH_LEN || v_len < MIN_MATCH_LEN || h_len + v_len - 1 < MIN_BENT_CELLS {
            continue;
        }
        let mut cover = Cover::new();
        cover.push_run(seed, hc, hr, h_len);
        cover.push_run(seed, vc, vr, v_len);
        return Some(MatchCandidate::new(
            ShapeKind::LShape,
            None,
            kind,
            seed,
            cover.into_tokens(grid),
        ));
    }
    None
}

fn square(grid: &Grid, seed: Position, kind: TokenKind) -> Option<MatchCandidate> {
    let block = [seed, seed.offset(1, 0), seed.offset(0, 1), seed.offset(1, 1)];
    if !block.iter().all(|&pos| grid.kind_at(pos) == Some(kind)) {
        return None;
    }

    let neighbours: ArrayVec<Position, 8> = SQUARE_PERIMETER
        .iter()
        .map(|&(dc, dr)| seed.offset(dc, dr))
        .filter(|&pos| grid.kind_at(pos) == Some(kind))
        .collect();

    let mut cover = Cover::new();
    for pos in block {
        cover.push(pos);
    }

    // Only the first perimeter neighbour in scan order joins the shape; any
    // further same-kind neighbours are left for other seeds.
    let shape = match neighbours.first() {
        Some(&extra) => {
            if neighbours.len() > 1 {
                trace!(%seed, extra = neighbours.len() - 1, "square+1 ignoring extra neighbours");
            }
            cover.push(extra);
            ShapeKind::SquarePlusOne
        }
        None => ShapeKind::Square,
    };

    Some(MatchCandidate::new(
        shape,
        None,
        kind,
        seed,
        cover.into_tokens(grid),
    ))
}
