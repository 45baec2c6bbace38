//! XORWOW pseudo-random engine.
//!
//! Marsaglia's xorshift over five 32-bit words, combined with a Weyl
//! sequence (increment 362437). Seeding uses the scrambling constants of the
//! reference GPU implementation so that a 64-bit seed spreads over all six
//! state words.
//!
//! The xorshift transition is linear over GF(2), so [`XorwowEngine::discard`]
//! jumps ahead with powers of the 160x160 transition matrix in logarithmic
//! time; the Weyl counter is advanced arithmetically.

use crate::traits::PseudoEngine;

const WEYL_INCREMENT: u32 = 362_437;

/// Below this distance stepping is cheaper than building the jump matrix.
const JUMP_THRESHOLD: u64 = 1 << 10;

/// State bits of the xorshift part.
const STATE_BITS: usize = 160;

/// A 160-bit vector; bit `j` lives in word `j / 32` at position `j % 32`.
type BitVector = [u32; 5];

/// Column-major GF(2) matrix: column `j` is the image of basis vector `j`.
type JumpMatrix = [BitVector; STATE_BITS];

/// XORWOW engine state.
///
/// # Examples
///
/// ```rust
/// use rand_core::RngCore;
/// use rng_engines::{PseudoEngine, XorwowEngine};
///
/// let mut rng = XorwowEngine::seeded(0);
/// let first = rng.next_u32();
///
/// let mut again = XorwowEngine::seeded(0);
/// assert_eq!(again.next_u32(), first);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorwowEngine {
    x: BitVector,
    d: u32,
}

impl XorwowEngine {
    #[inline]
    fn next_word(&mut self) -> u32 {
        self.d = self.d.wrapping_add(WEYL_INCREMENT);
        xorshift(&mut self.x).wrapping_add(self.d)
    }
}

impl_rng_core!(XorwowEngine);

impl PseudoEngine for XorwowEngine {
    fn seeded(seed: u64) -> Self {
        let s0 = (seed as u32) ^ 0xAAD2_6B49;
        let s1 = ((seed >> 32) as u32) ^ 0xF7DC_EFDD;
        let t0 = 1_099_087_573u32.wrapping_mul(s0);
        let t1 = 2_591_861_531u32.wrapping_mul(s1);

        Self {
            x: [
                123_456_789u32.wrapping_add(t0),
                362_436_069 ^ t0,
                521_288_629u32.wrapping_add(t1),
                88_675_123 ^ t1,
                5_783_321u32.wrapping_add(t0),
            ],
            d: 6_615_241u32.wrapping_add(t1).wrapping_add(t0),
        }
    }

    fn discard(&mut self, n: u64) {
        self.d = self
            .d
            .wrapping_add(WEYL_INCREMENT.wrapping_mul(n as u32));

        if n < JUMP_THRESHOLD {
            for _ in 0..n {
                xorshift(&mut self.x);
            }
            return;
        }

        let mut power = transition_matrix();
        let mut remaining = n;
        loop {
            if remaining & 1 == 1 {
                self.x = apply(&power, &self.x);
            }
            remaining >>= 1;
            if remaining == 0 {
                break;
            }
            power = square(&power);
        }
    }
}

/// One xorshift step; returns the new last word.
#[inline]
fn xorshift(x: &mut BitVector) -> u32 {
    let t = x[0] ^ (x[0] >> 2);
    x[0] = x[1];
    x[1] = x[2];
    x[2] = x[3];
    x[3] = x[4];
    x[4] = (x[4] ^ (x[4] << 4)) ^ (t ^ (t << 1));
    x[4]
}

fn transition_matrix() -> JumpMatrix {
    let mut matrix = [[0u32; 5]; STATE_BITS];
    for (j, column) in matrix.iter_mut().enumerate() {
        let mut basis = [0u32; 5];
        basis[j / 32] = 1 << (j % 32);
        xorshift(&mut basis);
        *column = basis;
    }
    matrix
}

fn apply(matrix: &JumpMatrix, v: &BitVector) -> BitVector {
    let mut out = [0u32; 5];
    for (j, column) in matrix.iter().enumerate() {
        if (v[j / 32] >> (j % 32)) & 1 == 1 {
            for (o, c) in out.iter_mut().zip(column) {
                *o ^= c;
            }
        }
    }
    out
}

fn square(matrix: &JumpMatrix) -> JumpMatrix {
    let mut out = [[0u32; 5]; STATE_BITS];
    for (column, source) in out.iter_mut().zip(matrix.iter()) {
        *column = apply(matrix, source);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::RngCore;

    #[test]
    fn test_seeds_differ() {
        let mut a = XorwowEngine::seeded(1);
        let mut b = XorwowEngine::seeded(2);
        let same = (0..64).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 4);
    }

    #[test]
    fn test_high_seed_bits_matter() {
        assert_ne!(XorwowEngine::seeded(1), XorwowEngine::seeded(1 | (1 << 40)));
    }

    #[test]
    fn test_short_discard_matches_stepping() {
        let mut stepped = XorwowEngine::seeded(99);
        for _ in 0..100 {
            stepped.next_u32();
        }
        let mut jumped = XorwowEngine::seeded(99);
        jumped.discard(100);
        assert_eq!(stepped, jumped);
    }

    #[test]
    fn test_matrix_jump_matches_stepping() {
        let n = 5_000u64;
        let mut stepped = XorwowEngine::seeded(7);
        for _ in 0..n {
            stepped.next_u32();
        }
        let mut jumped = XorwowEngine::seeded(7);
        jumped.discard(n);
        assert_eq!(stepped, jumped);
        assert_eq!(stepped.next_u32(), jumped.next_u32());
    }

    #[test]
    fn test_jumps_compose() {
        let mut once = XorwowEngine::seeded(3);
        once.discard(3_000_000);
        let mut twice = XorwowEngine::seeded(3);
        twice.discard(1_000_000);
        twice.discard(2_000_000);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_transition_matrix_is_xorshift() {
        let matrix = transition_matrix();
        let mut x = XorwowEngine::seeded(11).x;
        let expected = {
            let mut y = x;
            xorshift(&mut y);
            y
        };
        x = apply(&matrix, &x);
        assert_eq!(x, expected);
    }
}
