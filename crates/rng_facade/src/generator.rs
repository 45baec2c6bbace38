//! The generator object.
//!
//! A [`Generator`] owns a backend selected by its type tag, an optional
//! execution stream and a residency flag. Configuration calls reset the
//! algorithmic state; generation calls launch the transform stage on the
//! stream (device) or the calling thread (host).
//!
//! A launch failure poisons the generator: every later generation call
//! returns [`RngError::PreexistingFailure`] until it is destroyed.

use rng_core::{ensure_compatible, Residency, Result, RngError, RngType, HEADER_VERSION};
use rng_engines::UnitFloat;

use crate::backend::BackendKind;
use crate::launch::{self, Launch};
use crate::stream::Stream;

/// A random number generator.
///
/// # Examples
///
/// ```rust
/// use rng_core::{Residency, RngType};
/// use rng_facade::Generator;
///
/// let mut generator = Generator::new(RngType::PseudoPhilox4x32_10, Residency::Host).unwrap();
/// generator.set_seed(12345).unwrap();
///
/// let mut values = vec![0.0f32; 1000];
/// generator.generate_uniform(&mut values).unwrap();
/// assert!(values.iter().all(|&x| x > 0.0 && x <= 1.0));
/// ```
#[derive(Debug)]
pub struct Generator {
    rng_type: RngType,
    residency: Residency,
    stream: Option<Stream>,
    backend: BackendKind,
    poisoned: bool,
}

impl Generator {
    /// Creates a generator of `rng_type` with the given residency.
    ///
    /// # Errors
    ///
    /// - [`RngError::TypeError`] for the test type
    /// - [`RngError::NotImplemented`] for MTGP32
    /// - [`RngError::InitializationFailed`] if a device generator's default
    ///   pool cannot be started
    pub fn new(rng_type: RngType, residency: Residency) -> Result<Self> {
        Self::with_header_version(rng_type, residency, HEADER_VERSION)
    }

    /// Creates a generator for a caller built against `header_version`.
    ///
    /// # Errors
    ///
    /// As [`Generator::new`], plus [`RngError::VersionMismatch`] when the
    /// major version differs from the library's.
    pub fn with_header_version(
        rng_type: RngType,
        residency: Residency,
        header_version: i32,
    ) -> Result<Self> {
        ensure_compatible(header_version)?;
        let backend = BackendKind::for_type(rng_type)?;
        if residency == Residency::Device {
            launch::prepare_device()?;
        }
        tracing::debug!(%rng_type, %residency, "generator created");
        Ok(Self {
            rng_type,
            residency,
            stream: None,
            backend,
            poisoned: false,
        })
    }

    /// Returns the type the generator was created with.
    pub fn rng_type(&self) -> RngType {
        self.rng_type
    }

    /// Returns where launches run.
    pub fn residency(&self) -> Residency {
        self.residency
    }

    /// Returns the current stream, `None` for the default context.
    pub fn stream(&self) -> Option<&Stream> {
        self.stream.as_ref()
    }

    /// Returns the quasi-random dimension count, `None` for pseudo-random
    /// generators.
    pub fn dimensions(&self) -> Option<u32> {
        self.backend.dimensions()
    }

    /// Returns `true` after a launch failure.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Runs one generation call, tracking launch failures.
    fn launch<T>(
        &mut self,
        operation: &'static str,
        len: usize,
        op: impl FnOnce(&mut BackendKind, &Launch<'_>) -> Result<T>,
    ) -> Result<T> {
        if self.poisoned {
            return Err(RngError::PreexistingFailure);
        }
        tracing::trace!(operation, len, rng_type = %self.rng_type, "generate");

        let launch = Launch::new(self.residency, self.stream.as_ref());
        let result = op(&mut self.backend, &launch);
        if let Err(RngError::LaunchFailure(reason)) = &result {
            tracing::warn!(operation, rng_type = %self.rng_type, %reason, "launch failed");
            self.poisoned = true;
        }
        result
    }

    /// Fills `out` with 32-bit values uniform on `[0, 2^32)`.
    ///
    /// # Errors
    ///
    /// - [`RngError::TypeError`] for 64-bit quasi-random generators
    /// - [`RngError::LengthNotMultiple`] for quasi-random generators when
    ///   `out.len()` is not a multiple of the dimension count
    pub fn generate(&mut self, out: &mut [u32]) -> Result<()> {
        self.launch("generate", out.len(), |backend, launch| {
            backend.generate_u32(launch, out)
        })
    }

    /// Fills `out` with 64-bit values from a 64-bit quasi-random generator.
    ///
    /// # Errors
    ///
    /// [`RngError::TypeError`] for every other generator type.
    pub fn generate_long_long(&mut self, out: &mut [u64]) -> Result<()> {
        self.launch("generate_long_long", out.len(), |backend, launch| {
            backend.generate_u64(launch, out)
        })
    }

    /// Fills `out` with values uniform on `(0, 1]`.
    pub fn generate_uniform(&mut self, out: &mut [f32]) -> Result<()> {
        self.uniform("generate_uniform", out)
    }

    /// Fills `out` with values uniform on `(0, 1]`.
    pub fn generate_uniform_double(&mut self, out: &mut [f64]) -> Result<()> {
        self.uniform("generate_uniform_double", out)
    }

    /// Fills `out` from `N(mean, stddev)`. The sign of `stddev` is not
    /// checked.
    pub fn generate_normal(&mut self, out: &mut [f32], mean: f32, stddev: f32) -> Result<()> {
        self.normal("generate_normal", out, mean, stddev)
    }

    /// Fills `out` from `N(mean, stddev)`.
    pub fn generate_normal_double(
        &mut self,
        out: &mut [f64],
        mean: f64,
        stddev: f64,
    ) -> Result<()> {
        self.normal("generate_normal_double", out, mean, stddev)
    }

    /// Fills `out` with `exp(N(mean, stddev))`.
    pub fn generate_log_normal(&mut self, out: &mut [f32], mean: f32, stddev: f32) -> Result<()> {
        self.log_normal("generate_log_normal", out, mean, stddev)
    }

    /// Fills `out` with `exp(N(mean, stddev))`.
    pub fn generate_log_normal_double(
        &mut self,
        out: &mut [f64],
        mean: f64,
        stddev: f64,
    ) -> Result<()> {
        self.log_normal("generate_log_normal_double", out, mean, stddev)
    }

    /// Fills `out` from `Poisson(lambda)`.
    ///
    /// # Errors
    ///
    /// [`RngError::OutOfRange`] when `lambda` is non-positive or not finite;
    /// `out` is left untouched.
    pub fn generate_poisson(&mut self, out: &mut [u32], lambda: f64) -> Result<()> {
        self.launch("generate_poisson", out.len(), |backend, launch| {
            backend.generate_poisson(launch, out, lambda)
        })
    }

    fn uniform<F: UnitFloat>(&mut self, operation: &'static str, out: &mut [F]) -> Result<()> {
        self.launch(operation, out.len(), |backend, launch| {
            backend.generate_uniform(launch, out)
        })
    }

    fn normal<F: UnitFloat>(
        &mut self,
        operation: &'static str,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        self.launch(operation, out.len(), |backend, launch| {
            backend.generate_normal(launch, out, mean, stddev)
        })
    }

    fn log_normal<F: UnitFloat>(
        &mut self,
        operation: &'static str,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        self.launch(operation, out.len(), |backend, launch| {
            backend.generate_log_normal(launch, out, mean, stddev)
        })
    }

    /// Binds the generator to `stream`; `None` selects the default context.
    ///
    /// Host generators keep the stream but do not use it.
    pub fn set_stream(&mut self, stream: Option<Stream>) {
        tracing::debug!(
            rng_type = %self.rng_type,
            stream = stream.as_ref().map(Stream::id),
            "stream set"
        );
        self.stream = stream;
    }

    /// Sets the pseudo-random seed and resets the generator state.
    ///
    /// # Errors
    ///
    /// [`RngError::TypeError`] on quasi-random generators; the generator is
    /// left unchanged.
    pub fn set_seed(&mut self, seed: u64) -> Result<()> {
        self.backend.set_seed(seed)?;
        tracing::debug!(rng_type = %self.rng_type, seed, "seed set");
        Ok(())
    }

    /// Sets the absolute position of the next output and resets the
    /// generator state.
    ///
    /// Pseudo-random offsets count 32-bit engine outputs; quasi-random
    /// offsets count points.
    pub fn set_offset(&mut self, offset: u64) {
        self.backend.set_offset(offset);
        tracing::debug!(rng_type = %self.rng_type, offset, "offset set");
    }

    /// Sets the quasi-random dimension count and resets the generator state.
    ///
    /// # Errors
    ///
    /// - [`RngError::OutOfRange`] outside `1..=MAX_DIMENSIONS`
    /// - [`RngError::TypeError`] on pseudo-random generators
    pub fn set_dimensions(&mut self, dimensions: u32) -> Result<()> {
        self.backend.set_dimensions(dimensions)?;
        tracing::debug!(rng_type = %self.rng_type, dimensions, "dimensions set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_incompatible_header() {
        let err = Generator::with_header_version(
            RngType::PseudoXorwow,
            Residency::Device,
            HEADER_VERSION + 100_000,
        )
        .unwrap_err();
        assert!(matches!(err, RngError::VersionMismatch { .. }));

        assert!(Generator::with_header_version(
            RngType::PseudoXorwow,
            Residency::Device,
            HEADER_VERSION + 1,
        )
        .is_ok());
    }

    #[test]
    fn test_launch_failure_poisons_generator() {
        let mut generator = Generator::new(RngType::PseudoXorwow, Residency::Device).unwrap();
        let err = generator
            .launch("inject", 0, |_, _| -> Result<()> {
                Err(RngError::LaunchFailure("injected".to_owned()))
            })
            .unwrap_err();
        assert!(matches!(err, RngError::LaunchFailure(_)));
        assert!(generator.is_poisoned());

        let mut out = [0u32; 4];
        assert_eq!(generator.generate(&mut out), Err(RngError::PreexistingFailure));
        assert_eq!(out, [0; 4]);
    }

    #[test]
    fn test_other_errors_do_not_poison() {
        let mut generator = Generator::new(RngType::QuasiSobol32, Residency::Host).unwrap();
        generator.set_dimensions(3).unwrap();
        let mut out = [0.0f32; 4];
        assert!(generator.generate_uniform(&mut out).is_err());
        assert!(!generator.is_poisoned());
        let mut out = [0.0f32; 6];
        assert!(generator.generate_uniform(&mut out).is_ok());
    }

    #[test]
    fn test_set_seed_on_quasi_leaves_state() {
        let mut generator = Generator::new(RngType::QuasiSobol32, Residency::Device).unwrap();
        let mut first = [0u32; 2];
        generator.generate(&mut first).unwrap();
        assert!(matches!(generator.set_seed(1), Err(RngError::TypeError(_))));
        let mut next = [0u32; 2];
        generator.generate(&mut next).unwrap();
        assert_eq!(next, [3 << 30, 1 << 30]);
    }

    #[test]
    fn test_accessors() {
        let stream = Stream::new(1).unwrap();
        let mut generator = Generator::new(RngType::QuasiDefault, Residency::Host).unwrap();
        assert_eq!(generator.rng_type(), RngType::QuasiDefault);
        assert_eq!(generator.residency(), Residency::Host);
        assert_eq!(generator.dimensions(), Some(1));
        generator.set_stream(Some(stream.clone()));
        assert_eq!(generator.stream(), Some(&stream));
        generator.set_stream(None);
        assert!(generator.stream().is_none());
    }
}
