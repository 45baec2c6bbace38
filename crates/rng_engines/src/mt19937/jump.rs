//! Polynomial jump-ahead for MT19937.
//!
//! The one-word transition `T` has a characteristic polynomial `φ` of degree
//! 19937 over GF(2). Advancing by `n` words is `T^n = g(T)` with
//! `g = x^n mod φ`, evaluated against the state with Horner's rule, so a jump
//! costs at most 19937 steps and window XORs whatever the distance.
//!
//! `φ` is recovered once per process with Berlekamp–Massey from one bit of
//! the raw word sequence; it is irreducible, so any non-zero sequence gives
//! the full polynomial.

use std::sync::OnceLock;

use super::Mt19937Engine;

/// Dimension of the MT19937 state space.
const DEGREE: usize = 19_937;

/// Words holding a residue modulo `φ`, or `φ` itself.
const RESIDUE_WORDS: usize = DEGREE / 64 + 1;

/// Bits cleared per reduction pass.
const CHUNK_BITS: usize = 8;

struct JumpTables {
    /// `φ`, bit `j` is the coefficient of `x^j`.
    characteristic: Vec<u64>,
    /// Entry `v` is a multiple of `φ` whose bits `DEGREE..DEGREE + 8` equal `v`.
    reduction: Vec<Vec<u64>>,
}

static TABLES: OnceLock<JumpTables> = OnceLock::new();

fn tables() -> &'static JumpTables {
    TABLES.get_or_init(|| {
        let characteristic = characteristic_polynomial();
        let reduction = (0..1u32 << CHUNK_BITS)
            .map(|v| {
                let mut multiple = vec![0u64; RESIDUE_WORDS];
                for b in (0..CHUNK_BITS).rev() {
                    if bit(&multiple, DEGREE + b) != ((v >> b) & 1 == 1) {
                        xor_shifted(&mut multiple, &characteristic, b);
                    }
                }
                multiple
            })
            .collect();
        JumpTables {
            characteristic,
            reduction,
        }
    })
}

/// Advances `engine` by `n` words.
pub(super) fn jump(engine: &mut Mt19937Engine, n: u64) {
    let g = power_of_x(n, tables());

    let mut acc = Mt19937Engine::zeroed();
    for i in (0..DEGREE).rev() {
        acc.step();
        if bit(&g, i) {
            acc.xor_window(engine);
        }
    }
    // The low 31 bits of the oldest word are not part of the state and are
    // never read again, so `acc` continues the sequence exactly.
    *engine = acc;
}

/// Berlekamp–Massey over bit 0 of `2 * DEGREE` raw words.
fn characteristic_polynomial() -> Vec<u64> {
    let len = 2 * DEGREE;
    let capacity = len / 64 + 2;

    // Bit `j` of `reversed` is term `len - 1 - j` of the sequence, so the
    // discrepancy is an aligned dot product against the connection polynomial.
    let mut reversed = vec![0u64; capacity];
    let mut source = Mt19937Engine::from_u32_seed(5489);
    for k in 0..len {
        if source.step() & 1 == 1 {
            set_bit(&mut reversed, len - 1 - k);
        }
    }

    let mut connection = vec![0u64; capacity];
    connection[0] = 1;
    let mut previous = connection.clone();
    let mut length = 0usize;
    let mut shift = 1usize;

    for n in 0..len {
        let discrepancy = dot(&connection, length + 1, &reversed, len - 1 - n);
        if !discrepancy {
            shift += 1;
        } else if 2 * length <= n {
            let saved = connection.clone();
            xor_shifted(&mut connection, &previous, shift);
            length = n + 1 - length;
            previous = saved;
            shift = 1;
        } else {
            xor_shifted(&mut connection, &previous, shift);
            shift += 1;
        }
    }
    debug_assert_eq!(length, DEGREE);

    // φ(x) = x^L C(1/x)
    let mut characteristic = vec![0u64; RESIDUE_WORDS];
    for j in 0..=length {
        if bit(&connection, length - j) {
            set_bit(&mut characteristic, j);
        }
    }
    characteristic
}

/// `x^n mod φ` by left-to-right square-and-multiply.
fn power_of_x(n: u64, tables: &JumpTables) -> Vec<u64> {
    let mut result = vec![0u64; RESIDUE_WORDS];
    result[0] = 1;
    for b in (0..64 - n.leading_zeros()).rev() {
        result = square(&result, tables);
        if (n >> b) & 1 == 1 {
            multiply_by_x(&mut result, &tables.characteristic);
        }
    }
    result
}

fn square(residue: &[u64], tables: &JumpTables) -> Vec<u64> {
    let mut wide = vec![0u64; 2 * RESIDUE_WORDS];
    for (i, &word) in residue.iter().enumerate() {
        wide[2 * i] = spread(word as u32);
        wide[2 * i + 1] = spread((word >> 32) as u32);
    }

    let top_chunk = (wide.len() * 64 - DEGREE) / CHUNK_BITS;
    for chunk in (0..=top_chunk).rev() {
        let offset = chunk * CHUNK_BITS;
        let v = (extract(&wide, DEGREE + offset) & ((1 << CHUNK_BITS) - 1)) as usize;
        if v != 0 {
            xor_shifted(&mut wide, &tables.reduction[v], offset);
        }
    }

    wide.truncate(RESIDUE_WORDS);
    wide
}

fn multiply_by_x(residue: &mut [u64], characteristic: &[u64]) {
    let mut carry = 0u64;
    for word in residue.iter_mut() {
        let next = *word >> 63;
        *word = (*word << 1) | carry;
        carry = next;
    }
    if bit(residue, DEGREE) {
        for (r, c) in residue.iter_mut().zip(characteristic) {
            *r ^= c;
        }
    }
}

/// Interleaves zero bits: bit `i` moves to bit `2i`.
#[inline]
fn spread(x: u32) -> u64 {
    let mut x = x as u64;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    (x | (x << 1)) & 0x5555_5555_5555_5555
}

#[inline]
fn bit(v: &[u64], i: usize) -> bool {
    v.get(i / 64).is_some_and(|w| (w >> (i % 64)) & 1 == 1)
}

#[inline]
fn set_bit(v: &mut [u64], i: usize) {
    v[i / 64] |= 1 << (i % 64);
}

/// The 64 bits of `v` starting at bit `start`; bits past the end read as 0.
#[inline]
fn extract(v: &[u64], start: usize) -> u64 {
    let (q, r) = (start / 64, start % 64);
    let low = v.get(q).copied().unwrap_or(0) >> r;
    if r == 0 {
        low
    } else {
        low | (v.get(q + 1).copied().unwrap_or(0) << (64 - r))
    }
}

/// `dst ^= src << shift`, dropping bits past the end of `dst`.
fn xor_shifted(dst: &mut [u64], src: &[u64], shift: usize) {
    let (q, r) = (shift / 64, shift % 64);
    for (i, &word) in src.iter().enumerate() {
        if word == 0 {
            continue;
        }
        let j = i + q;
        if j < dst.len() {
            dst[j] ^= word << r;
        }
        if r != 0 && j + 1 < dst.len() {
            dst[j + 1] ^= word >> (64 - r);
        }
    }
}

/// Parity of the first `bits` bits of `a` against `b` read from `offset`.
fn dot(a: &[u64], bits: usize, b: &[u64], offset: usize) -> bool {
    let mut acc = 0u64;
    for w in 0..bits.div_ceil(64) {
        let mut word = a[w];
        let remaining = bits - 64 * w;
        if remaining < 64 {
            word &= (1u64 << remaining) - 1;
        }
        acc ^= word & extract(b, offset + 64 * w);
    }
    acc.count_ones() & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PseudoEngine;
    use rand_core::RngCore;

    fn stepped(seed: u64, n: u64) -> Mt19937Engine {
        let mut engine = Mt19937Engine::seeded(seed);
        for _ in 0..n {
            engine.step();
        }
        engine
    }

    #[test]
    fn test_characteristic_polynomial_shape() {
        let phi = &tables().characteristic;
        assert!(bit(phi, 0));
        assert!(bit(phi, DEGREE));
        assert!((DEGREE + 1..RESIDUE_WORDS * 64).all(|i| !bit(phi, i)));
    }

    #[test]
    fn test_small_powers_are_monomials() {
        for n in [0u64, 1, 63, 64, 1_000, DEGREE as u64 - 1] {
            let g = power_of_x(n, tables());
            for i in 0..RESIDUE_WORDS * 64 {
                assert_eq!(bit(&g, i), i as u64 == n, "x^{} bit {}", n, i);
            }
        }
    }

    #[test]
    fn test_jump_matches_stepping() {
        for n in [1u64, 623, 624, 20_000, 54_321] {
            let mut jumped = Mt19937Engine::seeded(77);
            jump(&mut jumped, n);
            let mut expected = stepped(77, n);
            for _ in 0..1_300 {
                assert_eq!(jumped.next_u32(), expected.next_u32(), "n = {}", n);
            }
        }
    }

    #[test]
    fn test_discard_above_threshold_matches_stepping() {
        let n = super::super::JUMP_THRESHOLD + 12_345;
        let mut jumped = Mt19937Engine::seeded(3);
        jumped.discard(n);
        let mut expected = stepped(3, n);
        for _ in 0..16 {
            assert_eq!(jumped.next_u32(), expected.next_u32());
        }
    }

    #[test]
    fn test_distant_discard_composes() {
        let far = 1u64 << 40;

        let mut split = Mt19937Engine::seeded(11);
        split.discard(far);
        split.discard(far + 5);

        let mut whole = Mt19937Engine::seeded(11);
        whole.discard(2 * far + 5);

        let mut tail = Mt19937Engine::seeded(11);
        tail.discard(2 * far);
        for _ in 0..5 {
            tail.next_u32();
        }

        for _ in 0..32 {
            let expected = whole.next_u32();
            assert_eq!(split.next_u32(), expected);
            assert_eq!(tail.next_u32(), expected);
        }
    }

    #[test]
    fn test_full_offset_range() {
        let mut engine = Mt19937Engine::seeded(1);
        engine.discard(u64::MAX);
        let mut again = Mt19937Engine::seeded(1);
        again.discard(u64::MAX);
        assert_eq!(engine.next_u32(), again.next_u32());
    }
}
