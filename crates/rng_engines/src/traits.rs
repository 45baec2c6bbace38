//! Engine capability traits.

use rand_core::RngCore;
use rng_core::RngError;

use crate::distributions::UnitFloat;

/// A seeded, reproducible pseudo-random engine producing 32-bit words.
///
/// Implementors are `rand_core::RngCore`, so any `rand_distr` distribution
/// can sample from them directly.
///
/// # Offsets
///
/// Offsets count 32-bit outputs. `discard(n)` must leave the engine in
/// exactly the state reached by `n` calls to `next_u32`.
pub trait PseudoEngine: RngCore + Clone + Send {
    /// Creates an engine initialised from `seed`.
    fn seeded(seed: u64) -> Self;

    /// Advances the engine by `n` 32-bit outputs.
    fn discard(&mut self, n: u64);

    /// Fills `out` with consecutive 32-bit outputs.
    #[inline]
    fn fill_u32(&mut self, out: &mut [u32]) {
        for value in out.iter_mut() {
            *value = self.next_u32();
        }
    }
}

/// Native output word of a quasi-random engine.
pub trait QuasiWord: Copy + Default + Send + Sync + 'static {
    /// Number of significant bits.
    const BITS: u32;

    /// Truncates a 64-bit value to this word.
    fn from_u64_truncated(value: u64) -> Self;

    /// Widens to 64 bits.
    fn to_u64(self) -> u64;

    /// Converts to a uniform value in `(0, 1]`.
    fn to_unit<F: UnitFloat>(self) -> F;
}

impl QuasiWord for u32 {
    const BITS: u32 = 32;

    #[inline]
    fn from_u64_truncated(value: u64) -> Self {
        value as u32
    }

    #[inline]
    fn to_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn to_unit<F: UnitFloat>(self) -> F {
        F::unit_from_u32(self)
    }
}

impl QuasiWord for u64 {
    const BITS: u32 = 64;

    #[inline]
    fn from_u64_truncated(value: u64) -> Self {
        value
    }

    #[inline]
    fn to_u64(self) -> u64 {
        self
    }

    #[inline]
    fn to_unit<F: UnitFloat>(self) -> F {
        F::unit_from_u64(self)
    }
}

/// A low-discrepancy sequence over a configurable number of dimensions.
///
/// Output is dimension-major: filling `k * D` values writes `k` consecutive
/// points of dimension 0, then `k` points of dimension 1, and so on.
pub trait QuasiEngine: Send {
    /// Native output word.
    type Word: QuasiWord;

    /// Returns the dimension count.
    fn dimensions(&self) -> u32;

    /// Sets the dimension count and rewinds to point 0.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::OutOfRange`] if `dimensions` is zero or exceeds
    /// the bundled direction numbers.
    fn set_dimensions(&mut self, dimensions: u32) -> Result<(), RngError>;

    /// Returns the index of the next point.
    fn index(&self) -> u64;

    /// Positions the sequence at point `index`.
    fn skip_to(&mut self, index: u64);

    /// Fills `out` in dimension-major order and advances by
    /// `out.len() / dimensions()` points.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::LengthNotMultiple`] if `out.len()` is not a
    /// multiple of the dimension count; nothing is written in that case.
    fn fill(&mut self, out: &mut [Self::Word]) -> Result<(), RngError>;
}
