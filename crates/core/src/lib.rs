//! Core game logic module - pure, deterministic, and testable
//!
//! This crate holds every rule of the match engine: the grid, shape
//! classification, conflict resolution, scoring, gravity, and the turn state
//! machine that sequences them. It has no rendering, input or I/O concerns
//! beyond reading a config file, making it:
//!
//! - **Deterministic**: same seed and swaps produce identical sessions
//! - **Testable**: collaborators (token factory, randomness) are injected
//! - **Portable**: runs headless, in a terminal, or behind any front end
//!
//! # Module Structure
//!
//! - [`grid`]: width x height token storage with bounds-checked access
//! - [`classify`]: per-seed shape classification (Line5, T, L, squares, lines)
//! - [`resolve`]: greedy priority-ordered selection of disjoint matches
//! - [`scoring`]: points for a resolved selection
//! - [`gravity`]: stable column compaction and refill
//! - [`turn`]: tick-driven turn state machine with queued notifications
//! - [`config`]: JSON / environment configuration
//! - [`rng`]: seeded LCG and scripted kind sources
//!
//! # Resolution Pass
//!
//! ```text
//! classify(grid) -> candidates -> resolve -> selection -> score + clear
//!                                                         -> gravity -> repeat
//! ```
//!
//! # Example
//!
//! ```
//! use match_cascade_core::{GameConfig, Grid, TurnStateMachine, TurnPhase};
//!
//! let grid = Grid::parse(
//!     "
//!     GYBY
//!     BGYG
//!     RRBR
//!     ",
//! )
//! .unwrap();
//! let a = grid.token_at((2, 0).into()).unwrap().id;
//! let b = grid.token_at((3, 0).into()).unwrap().id;
//!
//! let mut turn = TurnStateMachine::from_grid(grid, GameConfig::default()).unwrap();
//! turn.start();
//! turn.request_swap(a, b).unwrap();
//! assert_eq!(turn.phase(), TurnPhase::Swapping);
//!
//! turn.settle();
//! assert_eq!(turn.phase(), TurnPhase::Idle);
//! assert!(turn.score() >= 300);
//! ```

pub use match_cascade_types as types;

pub mod classify;
pub mod config;
pub mod error;
pub mod gravity;
pub mod grid;
pub mod resolve;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod token;
pub mod turn;

pub use classify::{classify, classify_seed, priority_for, MatchCandidate};
pub use config::{GameConfig, GameConfigBuilder};
pub use error::{BuildError, ConfigError, GridError, SwapRejection};
pub use gravity::{apply_gravity, compact, refill, GravityReport, TokenFall};
pub use grid::{Cell, Grid};
pub use resolve::{
    find_matches, has_matches, match_for_token, matched_token_count, resolve, swap_would_match,
    MatchSelection,
};
pub use rng::{KindSequence, RandomSource, SimpleRng};
pub use scoring::{selection_score, ScoreBreakdown, ScoreRules};
pub use snapshot::TurnSnapshot;
pub use token::{SequentialTokenFactory, Token, TokenFactory};
pub use turn::{TurnEvent, TurnStateMachine, TurnStateMachineBuilder, EVENT_QUEUE_CAPACITY};
pub use types::{Axis, Position, ShapeKind, TokenId, TokenKind, TurnPhase};
