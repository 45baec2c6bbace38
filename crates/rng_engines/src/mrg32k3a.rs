//! MRG32k3a pseudo-random engine.
//!
//! L'Ecuyer's combined multiple recursive generator: two order-3 recurrences
//! modulo `m1 = 2^32 - 209` and `m2 = 2^32 - 22853`, combined by
//! subtraction. The combined value lies in `[1, m1]` and is rescaled onto
//! the full 32-bit range before it is emitted.
//!
//! Skip-ahead uses modular powers of the two 3x3 transition matrices.

use crate::seeding::SplitMix64;
use crate::traits::PseudoEngine;

const M1: i64 = 4_294_967_087;
const M2: i64 = 4_294_944_443;
const A12: i64 = 1_403_580;
const A13N: i64 = 810_728;
const A21: i64 = 527_612;
const A23N: i64 = 1_370_589;

/// State of every component when seeded with 0.
const DEFAULT_STATE: i64 = 12_345;

type Matrix = [[u64; 3]; 3];

const A1: Matrix = [
    [0, 1, 0],
    [0, 0, 1],
    [(M1 - A13N) as u64, A12 as u64, 0],
];

const A2: Matrix = [
    [0, 1, 0],
    [0, 0, 1],
    [(M2 - A23N) as u64, 0, A21 as u64],
];

/// MRG32k3a engine state. Index 0 of each component is the oldest value.
///
/// # Examples
///
/// ```rust
/// use rand_core::RngCore;
/// use rng_engines::{Mrg32k3aEngine, PseudoEngine};
///
/// let mut rng = Mrg32k3aEngine::seeded(0);
/// assert_eq!(rng.next_u32(), 545_508_614);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mrg32k3aEngine {
    s1: [i64; 3],
    s2: [i64; 3],
}

impl Mrg32k3aEngine {
    #[inline]
    fn next_word(&mut self) -> u32 {
        scale_to_word(self.next_raw())
    }

    /// Advances both recurrences and returns the combined value in `[1, m1]`.
    #[inline]
    fn next_raw(&mut self) -> i64 {
        let p1 = (A12 * self.s1[1] - A13N * self.s1[0]).rem_euclid(M1);
        self.s1 = [self.s1[1], self.s1[2], p1];

        let p2 = (A21 * self.s2[2] - A23N * self.s2[0]).rem_euclid(M2);
        self.s2 = [self.s2[1], self.s2[2], p2];

        if p1 > p2 {
            p1 - p2
        } else {
            p1 - p2 + M1
        }
    }
}

/// Maps `[1, m1]` linearly onto `[0, u32::MAX]`.
#[inline]
fn scale_to_word(raw: i64) -> u32 {
    ((raw - 1) as u64 * u32::MAX as u64 / (M1 - 1) as u64) as u32
}

impl_rng_core!(Mrg32k3aEngine);

impl PseudoEngine for Mrg32k3aEngine {
    fn seeded(seed: u64) -> Self {
        if seed == 0 {
            return Self {
                s1: [DEFAULT_STATE; 3],
                s2: [DEFAULT_STATE; 3],
            };
        }

        let mut expander = SplitMix64::new(seed);
        let mut component = |modulus: i64| {
            let mut state = [0i64; 3];
            for value in state.iter_mut() {
                *value = 1 + (expander.next_u64() % (modulus as u64 - 1)) as i64;
            }
            state
        };
        let s1 = component(M1);
        let s2 = component(M2);
        Self { s1, s2 }
    }

    fn discard(&mut self, n: u64) {
        if n == 0 {
            return;
        }
        self.s1 = apply(&pow(&A1, n, M1 as u64), &self.s1, M1 as u64);
        self.s2 = apply(&pow(&A2, n, M2 as u64), &self.s2, M2 as u64);
    }
}

fn multiply(a: &Matrix, b: &Matrix, modulus: u64) -> Matrix {
    let mut out = [[0u64; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let mut acc: u128 = 0;
            for k in 0..3 {
                acc += a[i][k] as u128 * b[k][j] as u128;
            }
            *cell = (acc % modulus as u128) as u64;
        }
    }
    out
}

fn pow(base: &Matrix, mut exponent: u64, modulus: u64) -> Matrix {
    let mut result: Matrix = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];
    let mut square = *base;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = multiply(&result, &square, modulus);
        }
        exponent >>= 1;
        if exponent > 0 {
            square = multiply(&square, &square, modulus);
        }
    }
    result
}

fn apply(matrix: &Matrix, state: &[i64; 3], modulus: u64) -> [i64; 3] {
    let mut out = [0i64; 3];
    for (i, value) in out.iter_mut().enumerate() {
        let mut acc: u128 = 0;
        for k in 0..3 {
            acc += matrix[i][k] as u128 * state[k] as u128;
        }
        *value = (acc % modulus as u128) as i64;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::RngCore;

    #[test]
    fn test_reference_first_output() {
        let mut rng = Mrg32k3aEngine::seeded(0);
        assert_eq!(rng.next_raw(), 545_508_589);
    }

    #[test]
    fn test_raw_outputs_within_modulus() {
        let mut rng = Mrg32k3aEngine::seeded(42);
        for _ in 0..10_000 {
            let v = rng.next_raw();
            assert!(v >= 1 && v <= M1);
        }
    }

    #[test]
    fn test_emitted_words_span_full_range() {
        assert_eq!(scale_to_word(1), 0);
        assert_eq!(scale_to_word(M1), u32::MAX);
        assert_eq!(scale_to_word(545_508_589), 545_508_614);

        let mut previous = 0;
        for raw in (1..=M1).step_by(104_729) {
            let word = scale_to_word(raw);
            assert!(word >= previous);
            previous = word;
        }
    }

    #[test]
    fn test_emitted_word_is_scaled_raw() {
        let mut words = Mrg32k3aEngine::seeded(42);
        let mut raw = words.clone();
        for _ in 0..1_000 {
            assert_eq!(words.next_u32(), scale_to_word(raw.next_raw()));
        }
    }

    #[test]
    fn test_seeded_state_is_valid() {
        for seed in [1u64, 2, u64::MAX, 0xDEAD_BEEF] {
            let rng = Mrg32k3aEngine::seeded(seed);
            assert!(rng.s1.iter().all(|&v| v > 0 && v < M1));
            assert!(rng.s2.iter().all(|&v| v > 0 && v < M2));
        }
    }

    #[test]
    fn test_single_step_matrix_matches_recurrence() {
        let mut stepped = Mrg32k3aEngine::seeded(17);
        let mut jumped = stepped.clone();
        stepped.next_u32();
        jumped.discard(1);
        assert_eq!(stepped, jumped);
    }

    #[test]
    fn test_discard_matches_stepping() {
        let mut stepped = Mrg32k3aEngine::seeded(17);
        for _ in 0..12_345 {
            stepped.next_u32();
        }
        let mut jumped = Mrg32k3aEngine::seeded(17);
        jumped.discard(12_345);
        assert_eq!(stepped.next_u32(), jumped.next_u32());
    }
}
