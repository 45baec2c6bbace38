//! Sobol low-discrepancy sequences.
//!
//! Points are generated in Gray-code order with Joe–Kuo direction numbers,
//! so point `i` of dimension `d` is the XOR of the direction vectors
//! selected by the set bits of `i ^ (i >> 1)`. Computing each point directly
//! from its index makes `skip_to` free.
//!
//! Scrambled variants XOR every point of a dimension with a fixed
//! per-dimension constant; the sequence stays a (t, s)-sequence in base 2.

mod direction_numbers;

use std::marker::PhantomData;

use rng_core::RngError;

use crate::seeding::SplitMix64;
use crate::traits::{QuasiEngine, QuasiWord};
use direction_numbers::JOE_KUO;

/// Highest dimension count with bundled direction numbers.
pub const MAX_DIMENSIONS: u32 = JOE_KUO.len() as u32 + 1;

/// Fixed seed of the per-dimension scramble constants.
const SCRAMBLE_SEED: u64 = 0x5C4A_3B1E_D0F9_8A27;

/// Direction vectors of one dimension, left-aligned to the word width.
type Directions = [u64; 64];

/// Sobol sequence over `W`-bit words.
///
/// # Examples
///
/// ```rust
/// use rng_engines::{QuasiEngine, Sobol32Engine};
///
/// let mut sobol = Sobol32Engine::new(false);
/// let mut points = [0u32; 4];
/// sobol.fill(&mut points).unwrap();
/// assert_eq!(points, [0, 1 << 31, 3 << 30, 1 << 30]);
/// ```
#[derive(Debug, Clone)]
pub struct SobolEngine<W: QuasiWord> {
    directions: Vec<Directions>,
    scramble: Option<Vec<u64>>,
    index: u64,
    _word: PhantomData<W>,
}

/// 32-bit Sobol sequence.
pub type Sobol32Engine = SobolEngine<u32>;

/// 64-bit Sobol sequence.
pub type Sobol64Engine = SobolEngine<u64>;

impl<W: QuasiWord> SobolEngine<W> {
    /// Creates a one-dimensional sequence positioned at point 0.
    pub fn new(scrambled: bool) -> Self {
        let mut engine = Self {
            directions: Vec::new(),
            scramble: None,
            index: 0,
            _word: PhantomData,
        };
        engine.configure(1, scrambled);
        engine
    }

    /// Returns `true` for the scrambled variant.
    pub fn is_scrambled(&self) -> bool {
        self.scramble.is_some()
    }

    fn configure(&mut self, dimensions: u32, scrambled: bool) {
        self.directions = (0..dimensions).map(direction_vectors::<W>).collect();
        self.scramble = scrambled.then(|| {
            let mut expander = SplitMix64::new(SCRAMBLE_SEED);
            (0..dimensions)
                .map(|_| expander.next_u64() & word_mask::<W>())
                .collect()
        });
        self.index = 0;
    }

    /// Computes the value of point `index` in dimension `dimension`.
    #[inline]
    pub fn point(&self, index: u64, dimension: usize) -> W {
        let directions = &self.directions[dimension];
        let mut gray = index ^ (index >> 1);
        let mut value = 0u64;
        let mut bit = 0usize;
        while gray != 0 && bit < W::BITS as usize {
            if gray & 1 == 1 {
                value ^= directions[bit];
            }
            gray >>= 1;
            bit += 1;
        }
        if let Some(scramble) = &self.scramble {
            value ^= scramble[dimension];
        }
        W::from_u64_truncated(value)
    }
}

impl<W: QuasiWord> QuasiEngine for SobolEngine<W> {
    type Word = W;

    fn dimensions(&self) -> u32 {
        self.directions.len() as u32
    }

    fn set_dimensions(&mut self, dimensions: u32) -> Result<(), RngError> {
        if dimensions == 0 || dimensions > MAX_DIMENSIONS {
            return Err(RngError::OutOfRange(format!(
                "dimensions must be in 1..={}, got {}",
                MAX_DIMENSIONS, dimensions
            )));
        }
        let scrambled = self.is_scrambled();
        self.configure(dimensions, scrambled);
        Ok(())
    }

    fn index(&self) -> u64 {
        self.index
    }

    fn skip_to(&mut self, index: u64) {
        self.index = index;
    }

    fn fill(&mut self, out: &mut [W]) -> Result<(), RngError> {
        let dimensions = self.dimensions();
        if out.len() % dimensions as usize != 0 {
            return Err(RngError::LengthNotMultiple {
                length: out.len(),
                dimensions,
            });
        }
        let points = out.len() / dimensions as usize;
        if points == 0 {
            return Ok(());
        }
        for (dimension, chunk) in out.chunks_exact_mut(points).enumerate() {
            for (i, value) in chunk.iter_mut().enumerate() {
                *value = self.point(self.index.wrapping_add(i as u64), dimension);
            }
        }
        self.index = self.index.wrapping_add(points as u64);
        Ok(())
    }
}

#[inline]
fn word_mask<W: QuasiWord>() -> u64 {
    if W::BITS >= 64 {
        u64::MAX
    } else {
        (1u64 << W::BITS) - 1
    }
}

/// Builds the direction vectors of a dimension, left-aligned to `W::BITS`.
fn direction_vectors<W: QuasiWord>(dimension: u32) -> Directions {
    let bits = W::BITS as usize;
    let mut v = [0u64; 64];

    if dimension == 0 {
        for (k, slot) in v.iter_mut().enumerate().take(bits) {
            *slot = 1u64 << (bits - 1 - k);
        }
        return v;
    }

    let poly = &JOE_KUO[dimension as usize - 1];
    let s = poly.degree as usize;
    for (k, &m) in poly.initial.iter().enumerate() {
        v[k] = m << (bits - 1 - k);
    }
    for k in s..bits {
        let mut value = v[k - s] ^ (v[k - s] >> s);
        for j in 1..s {
            if (poly.coefficients >> (s - 1 - j)) & 1 == 1 {
                value ^= v[k - j];
            }
        }
        v[k] = value;
    }
    v
}
