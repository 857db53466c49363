//! Engine helpers built on top of the core rules.
//!
//! - [`hint`]: legal-move search, best swap, and deadlock detection

pub mod hint;

pub use hint::{
    apply_best_swap, best_swap, best_swap_with, find_swaps, find_swaps_with, has_legal_move,
    HintError, SwapHint,
};
