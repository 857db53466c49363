//! Scoring module - points for a resolved match selection
//!
//! Each selected match scores
//! `tokens * base + max(0, tokens - 3) * extra + shape bonus`,
//! and a selection scores the sum of its matches. The shape bonus is the same
//! table used for priority ([`ShapeKind::shape_bonus`]).

use serde::{Deserialize, Serialize};

use crate::classify::MatchCandidate;
use crate::resolve::MatchSelection;
use crate::types::{ShapeKind, BASE_SCORE_PER_TOKEN, EXTRA_TOKEN_BONUS, MIN_MATCH_LEN};

/// Configurable point values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    /// Points for every cleared token
    pub base_per_token: u32,
    /// Points for each token beyond the third
    pub extra_token_bonus: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            base_per_token: BASE_SCORE_PER_TOKEN,
            extra_token_bonus: EXTRA_TOKEN_BONUS,
        }
    }
}

/// Score calculation result for one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub extra: u32,
    pub shape: u32,
    pub total: u32,
}

impl ScoreRules {
    /// Score for `token_count` tokens cleared as `shape`
    pub fn score(&self, shape: ShapeKind, token_count: usize) -> ScoreBreakdown {
        let count = token_count as u32;
        let base = count.saturating_mul(self.base_per_token);
        let extra = count
            .saturating_sub(MIN_MATCH_LEN as u32)
            .saturating_mul(self.extra_token_bonus);
        let shape = shape.shape_bonus();
        ScoreBreakdown {
            base,
            extra,
            shape,
            total: base.saturating_add(extra).saturating_add(shape),
        }
    }

    pub fn candidate_score(&self, candidate: &MatchCandidate) -> ScoreBreakdown {
        self.score(candidate.shape, candidate.len())
    }

    /// Sum of every match in the selection; empty selections score 0
    pub fn selection_score(&self, selection: &MatchSelection) -> u32 {
        selection
            .iter()
            .map(|c| self.candidate_score(c).total)
            .fold(0u32, u32::saturating_add)
    }
}

/// Selection score with the default rules
pub fn selection_score(selection: &MatchSelection) -> u32 {
    ScoreRules::default().selection_score(selection)
}
