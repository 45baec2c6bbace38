//! Flat, handle-based call surface.
//!
//! Every function takes a [`GeneratorHandle`] and returns a
//! [`Result`]; operating on a destroyed or never-created handle returns
//! [`RngError::NotInitialized`].
//!
//! # Examples
//!
//! ```rust
//! use rng_core::RngType;
//! use rng_facade::api;
//!
//! let handle = api::create(RngType::PseudoDefault).unwrap();
//! api::set_pseudo_random_generator_seed(handle, 12345).unwrap();
//!
//! let mut values = vec![0.0f32; 1000];
//! api::generate_uniform(handle, &mut values).unwrap();
//!
//! api::destroy(handle).unwrap();
//! assert!(api::destroy(handle).is_err());
//! ```

use rng_core::{library_version, Residency, Result, RngType, HEADER_VERSION};

use crate::generator::Generator;
use crate::registry::{self, with_generator, GeneratorHandle};
use crate::stream::Stream;

#[cfg(doc)]
use rng_core::RngError;

/// Creates a device-resident generator.
pub fn create(rng_type: RngType) -> Result<GeneratorHandle> {
    create_versioned(rng_type, Residency::Device, HEADER_VERSION)
}

/// Creates a host-resident generator.
pub fn create_host(rng_type: RngType) -> Result<GeneratorHandle> {
    create_versioned(rng_type, Residency::Host, HEADER_VERSION)
}

/// Creates a generator for a caller built against `header_version`.
///
/// # Errors
///
/// - [`RngError::VersionMismatch`] on a different major version
/// - [`RngError::TypeError`] for the test type
/// - [`RngError::NotImplemented`] for MTGP32
/// - [`RngError::AllocationFailed`] if the handle table cannot grow
pub fn create_versioned(
    rng_type: RngType,
    residency: Residency,
    header_version: i32,
) -> Result<GeneratorHandle> {
    let generator = Generator::with_header_version(rng_type, residency, header_version)?;
    let handle = registry::insert(generator)?;
    tracing::debug!(%handle, %rng_type, %residency, "handle created");
    Ok(handle)
}

/// Destroys a generator and frees everything it owns.
pub fn destroy(handle: GeneratorHandle) -> Result<()> {
    registry::remove(handle)?;
    tracing::debug!(%handle, "handle destroyed");
    Ok(())
}

/// See [`Generator::generate`].
pub fn generate(handle: GeneratorHandle, out: &mut [u32]) -> Result<()> {
    with_generator(handle, |g| g.generate(out))
}

/// See [`Generator::generate_long_long`].
pub fn generate_long_long(handle: GeneratorHandle, out: &mut [u64]) -> Result<()> {
    with_generator(handle, |g| g.generate_long_long(out))
}

/// See [`Generator::generate_uniform`].
pub fn generate_uniform(handle: GeneratorHandle, out: &mut [f32]) -> Result<()> {
    with_generator(handle, |g| g.generate_uniform(out))
}

/// See [`Generator::generate_uniform_double`].
pub fn generate_uniform_double(handle: GeneratorHandle, out: &mut [f64]) -> Result<()> {
    with_generator(handle, |g| g.generate_uniform_double(out))
}

/// See [`Generator::generate_normal`].
pub fn generate_normal(
    handle: GeneratorHandle,
    out: &mut [f32],
    mean: f32,
    stddev: f32,
) -> Result<()> {
    with_generator(handle, |g| g.generate_normal(out, mean, stddev))
}

/// See [`Generator::generate_normal_double`].
pub fn generate_normal_double(
    handle: GeneratorHandle,
    out: &mut [f64],
    mean: f64,
    stddev: f64,
) -> Result<()> {
    with_generator(handle, |g| g.generate_normal_double(out, mean, stddev))
}

/// See [`Generator::generate_log_normal`].
pub fn generate_log_normal(
    handle: GeneratorHandle,
    out: &mut [f32],
    mean: f32,
    stddev: f32,
) -> Result<()> {
    with_generator(handle, |g| g.generate_log_normal(out, mean, stddev))
}

/// See [`Generator::generate_log_normal_double`].
pub fn generate_log_normal_double(
    handle: GeneratorHandle,
    out: &mut [f64],
    mean: f64,
    stddev: f64,
) -> Result<()> {
    with_generator(handle, |g| g.generate_log_normal_double(out, mean, stddev))
}

/// See [`Generator::generate_poisson`].
pub fn generate_poisson(handle: GeneratorHandle, out: &mut [u32], lambda: f64) -> Result<()> {
    with_generator(handle, |g| g.generate_poisson(out, lambda))
}

/// See [`Generator::set_stream`].
pub fn set_stream(handle: GeneratorHandle, stream: Option<Stream>) -> Result<()> {
    with_generator(handle, |g| {
        g.set_stream(stream);
        Ok(())
    })
}

/// See [`Generator::set_seed`].
pub fn set_pseudo_random_generator_seed(handle: GeneratorHandle, seed: u64) -> Result<()> {
    with_generator(handle, |g| g.set_seed(seed))
}

/// See [`Generator::set_offset`].
pub fn set_generator_offset(handle: GeneratorHandle, offset: u64) -> Result<()> {
    with_generator(handle, |g| {
        g.set_offset(offset);
        Ok(())
    })
}

/// See [`Generator::set_dimensions`].
pub fn set_quasi_random_generator_dimensions(
    handle: GeneratorHandle,
    dimensions: u32,
) -> Result<()> {
    with_generator(handle, |g| g.set_dimensions(dimensions))
}

/// Returns the library version, `major * 100000 + minor * 100 + patch`.
pub fn get_version() -> i32 {
    library_version()
}
