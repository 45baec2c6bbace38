//! # RNG Facade (L3: Generator Facade)
//!
//! Handle-based generator lifecycle, distribution sampling and
//! stream/seed/offset configuration over the engines of `rng_engines`.
//!
//! ## Design Rationale
//!
//! - **Opaque handles**: callers hold a [`GeneratorHandle`]; the registry
//!   owns the [`Generator`] and serialises access to it
//! - **Closed backend set**: pseudo-random and quasi-random backends share one
//!   capability trait and are dispatched by type tag, not through trait
//!   objects
//! - **Residency as launch policy**: device generators run the distribution
//!   transform in parallel on their [`Stream`], host generators run it on the
//!   calling thread; output is identical
//!
//! ## Module Structure
//!
//! - [`api`]: flat call surface over handles
//! - [`ffi`]: `extern "C"` surface returning [`rng_core::Status`]
//! - [`generator`]: the generator object
//! - [`stream`]: execution streams
//! - `backend`, `launch`, `registry`: internals
//!
//! ## Usage Example
//!
//! ```rust
//! use rng_core::RngType;
//! use rng_facade::api;
//!
//! let a = api::create(RngType::PseudoDefault).unwrap();
//! let b = api::create_host(RngType::PseudoDefault).unwrap();
//! api::set_pseudo_random_generator_seed(a, 12345).unwrap();
//! api::set_pseudo_random_generator_seed(b, 12345).unwrap();
//!
//! let mut device = vec![0.0f32; 1000];
//! let mut host = vec![0.0f32; 1000];
//! api::generate_uniform(a, &mut device).unwrap();
//! api::generate_uniform(b, &mut host).unwrap();
//! assert_eq!(device, host);
//!
//! api::destroy(a).unwrap();
//! api::destroy(b).unwrap();
//! ```

#![warn(missing_docs)]

pub mod api;
mod backend;
pub mod ffi;
pub mod generator;
mod launch;
mod registry;
pub mod stream;

pub use generator::Generator;
pub use registry::GeneratorHandle;
pub use rng_core::{Residency, RngError, RngType, Status};
pub use rng_engines::MAX_DIMENSIONS;
pub use stream::Stream;
