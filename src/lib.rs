//! Match Cascade (workspace facade crate).
//!
//! Re-exports the workspace crates as `match_cascade::{core, engine, types}`
//! and hosts the headless autoplay runner used by the default binary.

pub use match_cascade_core as core;
pub use match_cascade_engine as engine;
pub use match_cascade_types as types;

pub mod runner;
