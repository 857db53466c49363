//! RNG module - token kind generation for refills
//!
//! Provides a simple LCG for deterministic, seedable play and a scripted
//! source for tests that need an exact refill sequence.

use crate::types::TokenKind;

/// Uniform choice among the token kinds.
///
/// Injected into the turn state machine so tests can script refills.
pub trait RandomSource {
    fn next_kind(&mut self) -> TokenKind;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_kind(&mut self) -> TokenKind {
        (**self).next_kind()
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current internal state (for restarting with the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RandomSource for SimpleRng {
    fn next_kind(&mut self) -> TokenKind {
        let idx = self.next_range(TokenKind::COUNT as u32) as usize;
        TokenKind::ALL[idx]
    }
}

/// Scripted source that replays a fixed kind sequence, wrapping around.
#[derive(Debug, Clone)]
pub struct KindSequence {
    kinds: Vec<TokenKind>,
    cursor: usize,
}

impl KindSequence {
    /// An empty list falls back to the full kind cycle
    pub fn new(kinds: Vec<TokenKind>) -> Self {
        let kinds = if kinds.is_empty() {
            TokenKind::ALL.to_vec()
        } else {
            kinds
        };
        Self { kinds, cursor: 0 }
    }

    /// Parse from letter codes, e.g. `"RGBY"`; unknown letters are skipped
    pub fn from_codes(codes: &str) -> Self {
        Self::new(codes.chars().filter_map(TokenKind::from_char).collect())
    }

    /// Number of kinds handed out so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for KindSequence {
    fn next_kind(&mut self) -> TokenKind {
        let kind = self.kinds[self.cursor % self.kinds.len()];
        self.cursor += 1;
        kind
    }
}
