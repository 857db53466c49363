//! Conflict resolution - choosing a disjoint set of matches
//!
//! Candidates are taken greedily by descending priority. A candidate is kept
//! only if none of its tokens were claimed by a kept candidate; rejected
//! candidates are never partially applied. Equal priorities keep their scan
//! order (the sort is stable).

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{classify, MatchCandidate};
use crate::grid::Grid;
use crate::types::{Position, TokenId};

/// The disjoint candidates chosen for clearing, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchSelection(Vec<MatchCandidate>);

impl MatchSelection {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchCandidate> {
        self.0.iter()
    }

    /// Total tokens covered; no token is counted twice
    pub fn token_count(&self) -> usize {
        self.0.iter().map(MatchCandidate::len).sum()
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.0.iter().any(|c| c.contains(id))
    }

    /// The match a token belongs to, if any
    pub fn candidate_for(&self, id: TokenId) -> Option<&MatchCandidate> {
        self.0.iter().find(|c| c.contains(id))
    }

    pub fn token_ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.0.iter().flat_map(MatchCandidate::token_ids)
    }

    pub fn into_inner(self) -> Vec<MatchCandidate> {
        self.0
    }
}

impl<'a> IntoIterator for &'a MatchSelection {
    type Item = &'a MatchCandidate;
    type IntoIter = std::slice::Iter<'a, MatchCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for MatchSelection {
    type Item = MatchCandidate;
    type IntoIter = std::vec::IntoIter<MatchCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Greedy, priority-ordered selection of non-overlapping candidates.
pub fn resolve(mut candidates: Vec<MatchCandidate>) -> MatchSelection {
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut used: HashSet<TokenId> = HashSet::new();
    let mut selected = Vec::new();

    for candidate in candidates {
        let unique = has_unique_members(&candidate);
        debug_assert!(unique, "candidate lists a token twice: {}", candidate);
        if !unique {
            warn!(%candidate, "skipping candidate with duplicated members");
            continue;
        }
        if candidate.token_ids().any(|id| used.contains(&id)) {
            continue;
        }
        used.extend(candidate.token_ids());
        selected.push(candidate);
    }

    debug!(
        matches = selected.len(),
        tokens = used.len(),
        "resolved match selection"
    );
    MatchSelection(selected)
}

fn has_unique_members(candidate: &MatchCandidate) -> bool {
    let mut seen = HashSet::with_capacity(candidate.len());
    candidate.token_ids().all(|id| seen.insert(id))
}

/// Classify and resolve in one step.
pub fn find_matches(grid: &Grid) -> MatchSelection {
    resolve(classify(grid))
}

/// True when the grid holds at least one matchable shape.
pub fn has_matches(grid: &Grid) -> bool {
    grid.positions()
        .any(|pos| crate::classify::classify_seed(grid, pos).is_some())
}

/// Tokens that would clear if the grid were resolved now
pub fn matched_token_count(grid: &Grid) -> usize {
    find_matches(grid).token_count()
}

/// The selected match containing `id`, if the token would clear now.
pub fn match_for_token(grid: &Grid, id: TokenId) -> Option<MatchCandidate> {
    find_matches(grid).into_iter().find(|c| c.contains(id))
}

/// Try a swap on the grid and undo it, reporting whether it produced a match.
///
/// The grid is left exactly as it was. Out-of-range or non-adjacent
/// positions never match.
pub fn swap_would_match(grid: &mut Grid, a: Position, b: Position) -> bool {
    if !a.is_adjacent(b) || !grid.is_valid(a.col, a.row) || !grid.is_valid(b.col, b.row) {
        return false;
    }
    grid.swap(a, b);
    let matched = has_matches(grid);
    grid.swap(a, b);
    matched
}
