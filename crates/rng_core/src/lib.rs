//! # RNG Core (L1: Foundation)
//!
//! Foundation types shared by every layer of the Neutryx RNG library.
//!
//! This crate provides:
//! - [`Status`]: ABI-stable status codes returned across the C boundary
//! - [`RngError`]: structured Rust errors that map one-to-one onto [`Status`]
//! - [`RngType`]: the closed set of generator types, with family resolution
//! - [`Residency`]: device-resident vs host-resident generators
//! - [`version`]: process-wide library version state
//!
//! ## Layering
//!
//! `rng_core` has no knowledge of any algorithm. Engines live in
//! `rng_engines`; the handle-based generator facade lives in `rng_facade`.
//!
//! ## Example
//!
//! ```rust
//! use rng_core::{RngError, RngType, Status};
//!
//! let rng_type = RngType::from_code(401).unwrap();
//! assert_eq!(rng_type, RngType::PseudoXorwow);
//! assert!(rng_type.is_pseudo());
//!
//! let err = RngError::OutOfRange("lambda must be positive".to_string());
//! assert_eq!(err.status(), Status::OutOfRange);
//! assert_eq!(err.status().code(), 104);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod rng_type;
pub mod status;
pub mod version;

pub use error::{Result, RngError};
pub use rng_type::{Residency, RngFamily, RngType};
pub use status::Status;
pub use version::{ensure_compatible, library_version, HEADER_VERSION};
