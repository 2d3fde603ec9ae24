//! Deterministic pseudo-random generation for the simulation core.
//!
//! The generator is a PCG variant with 64-bit state and 32-bit output
//! (xorshift-high followed by a state-dependent random rotation). Every
//! simulation context owns its own instance, so runs with the same seed
//! reproduce the same draw sequence exactly, and independent contexts
//! never perturb each other's streams.

use rand::Rng;

/// State advance multiplier (the PCG default LCG constants).
const MULTIPLIER: u64 = 6364136223846793005;
/// State advance increment.
const INCREMENT: u64 = 1442695040888963407;

/// Deterministic 32-bit generator with 64-bit state.
///
/// Not cryptographic. A single logical stream belongs to one
/// simulation context; sharing one instance across threads is not
/// supported (every draw takes `&mut self`).
#[derive(Debug, Clone)]
pub struct Pcg32 {
    state: u64,
    /// High half of the last 32-bit draw, pending for [`Pcg32::draw16`].
    spare: Option<u16>,
}

impl Pcg32 {
    /// Create a generator whose raw state is `seed`.
    ///
    /// The seed is installed verbatim, so the same seed always yields
    /// the same draw sequence.
    pub fn new(seed: u64) -> Self {
        Self { state: seed, spare: None }
    }

    /// Create a generator seeded from the process entropy source.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    /// Next 32-bit draw.
    ///
    /// The output is derived from the pre-advance state: an xorshift
    /// step followed by a rotation whose amount comes from the top
    /// state bits.
    #[inline]
    pub fn draw32(&mut self) -> u32 {
        let state = self.state;
        self.state = state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        let value = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        value.rotate_right(rot)
    }

    /// Uniform draw over `[0, bound)` using rejection sampling, which
    /// avoids modulo bias.
    ///
    /// `bound` must be nonzero. This is a caller precondition, checked
    /// only in debug builds.
    #[inline]
    pub fn draw32_bounded(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0, "draw32_bounded requires a nonzero bound");
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.draw32();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    /// Next 16-bit draw.
    ///
    /// Two successive 16-bit draws consume one 32-bit draw: the low
    /// half is returned first and the high half is cached for the next
    /// call. Interleaved [`Pcg32::draw32`] calls leave the cache
    /// untouched.
    #[inline]
    pub fn draw16(&mut self) -> u16 {
        if let Some(high) = self.spare.take() {
            return high;
        }
        let r = self.draw32();
        self.spare = Some((r >> 16) as u16);
        r as u16
    }
}
