//! MT19937 Mersenne Twister.
//!
//! A 64-bit seed is applied through `init_by_array` with its low and high
//! 32-bit halves. The state is kept as a rolling window of the last 624 raw
//! words, advanced one word per output, so a single step is the linear
//! transition that [`jump`] raises to arbitrary powers.

mod jump;

use crate::traits::PseudoEngine;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_B0DF;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7FFF_FFFF;

/// Below this distance stepping is cheaper than a polynomial jump.
const JUMP_THRESHOLD: u64 = 1 << 22;

/// MT19937 engine state.
#[derive(Clone)]
pub struct Mt19937Engine {
    /// Last `N` raw words; `mt[ptr]` is the oldest.
    mt: Box<[u32; N]>,
    ptr: usize,
}

impl std::fmt::Debug for Mt19937Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt19937Engine")
            .field("ptr", &self.ptr)
            .finish_non_exhaustive()
    }
}

impl Mt19937Engine {
    /// Creates an engine with the classic 32-bit `init_genrand` seeding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rand_core::RngCore;
    /// use rng_engines::Mt19937Engine;
    ///
    /// let mut rng = Mt19937Engine::from_u32_seed(5489);
    /// assert_eq!(rng.next_u32(), 3_499_211_612);
    /// ```
    pub fn from_u32_seed(seed: u32) -> Self {
        let mut mt = Box::new([0u32; N]);
        mt[0] = seed;
        for i in 1..N {
            mt[i] = 1_812_433_253u32
                .wrapping_mul(mt[i - 1] ^ (mt[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        Self { mt, ptr: 0 }
    }

    /// Creates an engine seeded with `init_by_array`.
    pub fn from_key(key: &[u32]) -> Self {
        let mut engine = Self::from_u32_seed(19_650_218);
        if key.is_empty() {
            return engine;
        }
        let mt = &mut engine.mt;

        let mut i = 1usize;
        let mut j = 0usize;
        for _ in 0..N.max(key.len()) {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(1_566_083_941)).wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
        }
        mt[0] = UPPER_MASK;
        engine
    }

    /// All-zero window, the additive identity for [`jump`].
    fn zeroed() -> Self {
        Self {
            mt: Box::new([0u32; N]),
            ptr: 0,
        }
    }

    /// Replaces the oldest word with the next raw word and returns it.
    #[inline]
    fn step(&mut self) -> u32 {
        let i = self.ptr;
        let next = if i + 1 == N { 0 } else { i + 1 };
        let far = if i + M >= N { i + M - N } else { i + M };

        let y = (self.mt[i] & UPPER_MASK) | (self.mt[next] & LOWER_MASK);
        let mag = if y & 1 == 1 { MATRIX_A } else { 0 };
        let x = self.mt[far] ^ (y >> 1) ^ mag;

        self.mt[i] = x;
        self.ptr = next;
        x
    }

    /// XORs `other`'s window into this one, oldest word against oldest word.
    fn xor_window(&mut self, other: &Self) {
        for k in 0..N {
            self.mt[(self.ptr + k) % N] ^= other.mt[(other.ptr + k) % N];
        }
    }

    #[inline]
    fn next_word(&mut self) -> u32 {
        let mut y = self.step();
        y ^= y >> 11;
        y ^= (y << 7) & 0x9D2C_5680;
        y ^= (y << 15) & 0xEFC6_0000;
        y ^ (y >> 18)
    }
}

impl_rng_core!(Mt19937Engine);

impl PseudoEngine for Mt19937Engine {
    fn seeded(seed: u64) -> Self {
        Self::from_key(&[seed as u32, (seed >> 32) as u32])
    }

    fn discard(&mut self, n: u64) {
        if n < JUMP_THRESHOLD {
            for _ in 0..n {
                self.step();
            }
        } else {
            jump::jump(self, n);
        }
    }
}
