//! Philox 4x32-10 counter-based engine.
//!
//! Philox was introduced in "Parallel Random Numbers: As Easy as 1, 2, 3"
//! (Salmon et al., 2011). The state is a 128-bit counter and a 64-bit key;
//! each counter value yields four 32-bit outputs, so skip-ahead is plain
//! counter arithmetic.

use crate::traits::PseudoEngine;

const PHILOX_M4X32_0: u32 = 0xD251_1F53;
const PHILOX_M4X32_1: u32 = 0xCD9E_8D57;
const PHILOX_W32_0: u32 = 0x9E37_79B9;
const PHILOX_W32_1: u32 = 0xBB67_AE85;

/// Philox 4x32-10 engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiloxEngine {
    counter: u128,
    key: [u32; 2],
    buffer: [u32; 4],
    /// Next unread position in `buffer`; 4 means empty.
    position: usize,
}

impl PhiloxEngine {
    #[inline]
    fn next_word(&mut self) -> u32 {
        if self.position >= 4 {
            self.refill();
        }
        let value = self.buffer[self.position];
        self.position += 1;
        value
    }

    fn refill(&mut self) {
        self.buffer = philox4x32_10(split_counter(self.counter), self.key);
        self.counter = self.counter.wrapping_add(1);
        self.position = 0;
    }
}

impl_rng_core!(PhiloxEngine);

impl PseudoEngine for PhiloxEngine {
    fn seeded(seed: u64) -> Self {
        Self {
            counter: 0,
            key: [seed as u32, (seed >> 32) as u32],
            buffer: [0; 4],
            position: 4,
        }
    }

    fn discard(&mut self, n: u64) {
        let buffered = (4 - self.position) as u64;
        if n <= buffered {
            self.position += n as usize;
            return;
        }
        let remaining = n - buffered;
        self.counter = self.counter.wrapping_add((remaining / 4) as u128);
        self.position = 4;
        let within = (remaining % 4) as usize;
        if within > 0 {
            self.refill();
            self.position = within;
        }
    }
}

#[inline]
fn split_counter(counter: u128) -> [u32; 4] {
    [
        counter as u32,
        (counter >> 32) as u32,
        (counter >> 64) as u32,
        (counter >> 96) as u32,
    ]
}

#[inline]
fn philox_round(ctr: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let product0 = ctr[0] as u64 * PHILOX_M4X32_0 as u64;
    let product1 = ctr[2] as u64 * PHILOX_M4X32_1 as u64;
    let (hi0, lo0) = ((product0 >> 32) as u32, product0 as u32);
    let (hi1, lo1) = ((product1 >> 32) as u32, product1 as u32);
    [hi1 ^ ctr[1] ^ key[0], lo1, hi0 ^ ctr[3] ^ key[1], lo0]
}

/// The Philox 4x32-10 bijection of one counter block under `key`.
///
/// # Examples
///
/// ```rust
/// use rng_engines::philox::philox4x32_10;
///
/// let out = philox4x32_10([0; 4], [0; 2]);
/// assert_eq!(out, [0x6627_e8d5, 0xe169_c58d, 0xbc57_ac4c, 0x9b00_dbd8]);
/// ```
pub fn philox4x32_10(counter: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let mut ctr = counter;
    let mut key = key;
    for round in 0..10 {
        ctr = philox_round(ctr, key);
        if round < 9 {
            key[0] = key[0].wrapping_add(PHILOX_W32_0);
            key[1] = key[1].wrapping_add(PHILOX_W32_1);
        }
    }
    ctr
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::RngCore;

    #[test]
    fn test_known_answer_vectors() {
        assert_eq!(
            philox4x32_10([0; 4], [0; 2]),
            [0x6627_e8d5, 0xe169_c58d, 0xbc57_ac4c, 0x9b00_dbd8]
        );
        assert_eq!(
            philox4x32_10([u32::MAX; 4], [u32::MAX; 2]),
            [0x408f_276d, 0x41c8_3b0e, 0xa20b_c7c6, 0x6d54_51fd]
        );
    }

    #[test]
    fn test_seed_zero_streams_first_block() {
        let mut rng = PhiloxEngine::seeded(0);
        let first: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        assert_eq!(first, vec![0x6627_e8d5, 0xe169_c58d, 0xbc57_ac4c, 0x9b00_dbd8]);
    }

    #[test]
    fn test_discard_within_and_across_blocks() {
        for n in [0u64, 1, 3, 4, 5, 17, 1_000_003] {
            let mut stepped = PhiloxEngine::seeded(77);
            for _ in 0..n {
                stepped.next_u32();
            }
            let mut jumped = PhiloxEngine::seeded(77);
            jumped.discard(n);
            assert_eq!(stepped.next_u32(), jumped.next_u32(), "offset {}", n);
        }
    }

    #[test]
    fn test_discard_after_partial_read() {
        let mut stepped = PhiloxEngine::seeded(5);
        let mut jumped = PhiloxEngine::seeded(5);
        stepped.next_u32();
        jumped.next_u32();
        for _ in 0..6 {
            stepped.next_u32();
        }
        jumped.discard(6);
        assert_eq!(stepped.next_u32(), jumped.next_u32());
    }
}
