//! Error types for the match engine.
//!
//! Out-of-range grid access is not an error at the `get`/`set` boundary (those
//! return `None`/`false`), but the fallible constructors and parsers report
//! through [`GridError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Position, TokenId, TurnPhase};

/// Errors raised while building or parsing a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions {width}x{height} outside 1..={max}")]
    InvalidDimensions { width: usize, height: usize, max: u8 },

    #[error("cell {position} outside {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: u8,
        height: u8,
    },

    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown token code {code:?} at line {line}, column {column}")]
    UnknownCode { code: char, line: usize, column: usize },

    #[error("layout is empty")]
    EmptyLayout,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON config: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {value}")]
    InvalidEnv { field: &'static str, value: String },

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Raised when the turn state machine is assembled without a required collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a swap request was refused. Refusals never change state or the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapRejection {
    #[error("swap requests are only accepted while idle (current phase: {phase})")]
    Busy { phase: TurnPhase },

    #[error("session is not running")]
    Stopped,

    #[error("session is paused")]
    Paused,

    #[error("cannot swap token {0} with itself")]
    SameToken(TokenId),

    #[error("token {0} is not on the board")]
    UnknownToken(TokenId),

    #[error("tokens at {a} and {b} are not adjacent")]
    NotAdjacent { a: Position, b: Position },
}

impl SwapRejection {
    /// Short machine-readable code
    pub fn code(self) -> &'static str {
        match self {
            SwapRejection::Busy { .. } => "busy",
            SwapRejection::Stopped => "stopped",
            SwapRejection::Paused => "paused",
            SwapRejection::SameToken(_) => "same_token",
            SwapRejection::UnknownToken(_) => "unknown_token",
            SwapRejection::NotAdjacent { .. } => "not_adjacent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_error_display() {
        let err = GridError::OutOfBounds {
            position: Position::new(8, -1),
            width: 8,
            height: 8,
        };
        assert_eq!(err.to_string(), "cell (8, -1) outside 8x8 grid");
    }

    #[test]
    fn build_error_display() {
        let err = BuildError::MissingCollaborator("token factory");
        assert_eq!(
            err.to_string(),
            "missing required collaborator: token factory"
        );
    }

    #[test]
    fn swap_rejection_codes() {
        let busy = SwapRejection::Busy {
            phase: TurnPhase::Falling,
        };
        assert_eq!(busy.code(), "busy");
        assert_eq!(
            busy.to_string(),
            "swap requests are only accepted while idle (current phase: falling)"
        );
        assert_eq!(SwapRejection::UnknownToken(TokenId(7)).code(), "unknown_token");
        assert_eq!(
            SwapRejection::NotAdjacent {
                a: Position::new(0, 0),
                b: Position::new(2, 0),
            }
            .to_string(),
            "tokens at (0, 0) and (2, 0) are not adjacent"
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Validation("width must be > 0".to_string());
        assert_eq!(err.to_string(), "config validation error: width must be > 0");
    }
}
