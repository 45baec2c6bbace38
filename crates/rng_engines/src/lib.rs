//! # RNG Engines (L2: The Kernel)
//!
//! Generator algorithms and the distribution transforms applied to their
//! raw output.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: every engine is fully determined by its seed (or,
//!   for quasi-random engines, its dimension count) and its offset
//! - **Efficiency**: batch operations fill caller-provided slices; no
//!   allocation in the sampling paths
//! - **Static dispatch**: engines are concrete types behind the
//!   [`PseudoEngine`] and [`QuasiEngine`] capability traits; no
//!   `Box<dyn Trait>` anywhere in the sampling paths
//!
//! ## Module Structure
//!
//! - [`xorwow`], [`mrg32k3a`], [`mt19937`], [`philox`]: pseudo-random engines
//! - [`sobol`]: Sobol32/Sobol64 low-discrepancy sequences, optionally scrambled
//! - [`distributions`]: uniform `(0, 1]` conversion, Box–Muller, inverse
//!   normal CDF, Poisson
//! - [`traits`]: engine capability traits
//!
//! ## Usage Example
//!
//! ```rust
//! use rand_core::RngCore;
//! use rng_engines::{PseudoEngine, PhiloxEngine};
//!
//! let mut a = PhiloxEngine::seeded(12345);
//! let mut b = PhiloxEngine::seeded(12345);
//! b.discard(10);
//!
//! for _ in 0..10 {
//!     a.next_u32();
//! }
//! assert_eq!(a.next_u32(), b.next_u32());
//! ```

#![warn(missing_docs)]

/// Implements `rand_core::RngCore` for an engine with a `next_word` method.
macro_rules! impl_rng_core {
    ($engine:ty) => {
        impl rand_core::RngCore for $engine {
            #[inline]
            fn next_u32(&mut self) -> u32 {
                self.next_word()
            }

            #[inline]
            fn next_u64(&mut self) -> u64 {
                rand_core::impls::next_u64_via_u32(self)
            }

            fn fill_bytes(&mut self, dest: &mut [u8]) {
                rand_core::impls::fill_bytes_via_next(self, dest)
            }

            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
                self.fill_bytes(dest);
                Ok(())
            }
        }
    };
}

pub mod distributions;
pub mod mrg32k3a;
pub mod mt19937;
pub mod philox;
mod seeding;
pub mod sobol;
pub mod traits;
pub mod xorwow;

pub use distributions::UnitFloat;
pub use mrg32k3a::Mrg32k3aEngine;
pub use mt19937::Mt19937Engine;
pub use philox::PhiloxEngine;
pub use sobol::{Sobol32Engine, Sobol64Engine, SobolEngine, MAX_DIMENSIONS};
pub use traits::{PseudoEngine, QuasiEngine, QuasiWord};
pub use xorwow::XorwowEngine;
