use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::TurnPhase;

/// Serializable view of a session, for logging and the `--json` runner output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub phase: TurnPhase,
    pub running: bool,
    pub paused: bool,
    pub score: u32,
    pub moves: u32,
    pub cascade_depth: u32,
    pub pending_ms: u32,
    pub width: u8,
    pub height: u8,
    /// One string per row, top row first; `.` marks an empty cell
    pub board: Vec<String>,
}

impl TurnSnapshot {
    pub fn board_rows(grid: &Grid) -> Vec<String> {
        grid.kind_rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|kind| kind.map_or('.', |k| k.as_char()))
                    .collect()
            })
            .collect()
    }

    pub fn playable(&self) -> bool {
        self.running && !self.paused && self.phase == TurnPhase::Idle
    }
}
