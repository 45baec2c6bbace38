//! Backend capability set.
//!
//! [`Backend`] is the set of operations every generator family supports.
//! Pseudo-random and quasi-random families implement it once each, generic
//! over their engine; [`BackendKind`] closes the set over the concrete
//! engines so dispatch is a `match`, not a vtable.
//!
//! Raw engine output is always drawn in sequence order. Only the
//! distribution transform runs through a [`Launch`].

use rng_core::{Result, RngError, RngType};
use rng_engines::distributions::{
    box_muller, fill_poisson, inverse_normal_cdf, poisson_inverse, validate_lambda,
};
use rng_engines::{
    Mrg32k3aEngine, Mt19937Engine, PhiloxEngine, PseudoEngine, QuasiEngine, QuasiWord,
    Sobol32Engine, Sobol64Engine, UnitFloat, XorwowEngine,
};

use crate::launch::{scratch, Launch};

/// Largest uniform strictly below 1, keeps the inverse CDF finite.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Operations shared by every generator family.
pub(crate) trait Backend: Send {
    fn generate_u32(&mut self, launch: &Launch<'_>, out: &mut [u32]) -> Result<()>;

    fn generate_u64(&mut self, launch: &Launch<'_>, out: &mut [u64]) -> Result<()>;

    fn generate_uniform<F: UnitFloat>(&mut self, launch: &Launch<'_>, out: &mut [F])
        -> Result<()>;

    fn generate_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()>;

    fn generate_log_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()>;

    fn generate_poisson(&mut self, launch: &Launch<'_>, out: &mut [u32], lambda: f64)
        -> Result<()>;

    fn set_seed(&mut self, seed: u64) -> Result<()>;

    fn set_offset(&mut self, offset: u64);

    fn set_dimensions(&mut self, dimensions: u32) -> Result<()>;

    /// Returns the dimension count of quasi-random families.
    fn dimensions(&self) -> Option<u32>;
}

// =============================================================================
// Pseudo-random family
// =============================================================================

/// Backend over a seeded engine.
///
/// The engine is rebuilt lazily from `seed` and `offset` after every
/// configuration change.
#[derive(Debug, Clone)]
pub(crate) struct PseudoBackend<E> {
    seed: u64,
    offset: u64,
    engine: Option<E>,
}

impl<E: PseudoEngine> PseudoBackend<E> {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            offset: 0,
            engine: None,
        }
    }

    fn engine(&mut self) -> &mut E {
        let (seed, offset) = (self.seed, self.offset);
        self.engine.get_or_insert_with(|| {
            let mut engine = E::seeded(seed);
            engine.discard(offset);
            engine
        })
    }

    /// Draws `words` raw outputs into a scratch buffer.
    fn draw(&mut self, words: usize) -> Result<Vec<u32>> {
        let mut raw = scratch(words)?;
        self.engine().fill_u32(&mut raw);
        Ok(raw)
    }

    fn gaussian<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
        finish: fn(F) -> F,
    ) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let width = 2 * F::WORDS;
        let raw = self.draw(out.len().div_ceil(2) * width)?;
        launch.map(&raw, width, out, 2, move |words, pair| {
            let u1 = F::unit_from_words(&words[..F::WORDS]);
            let u2 = F::unit_from_words(&words[F::WORDS..]);
            let (z0, z1) = box_muller(u1, u2);
            pair[0] = finish(mean + stddev * z0);
            if let Some(second) = pair.get_mut(1) {
                *second = finish(mean + stddev * z1);
            }
        })
    }
}

impl<E: PseudoEngine> Backend for PseudoBackend<E> {
    fn generate_u32(&mut self, _launch: &Launch<'_>, out: &mut [u32]) -> Result<()> {
        self.engine().fill_u32(out);
        Ok(())
    }

    fn generate_u64(&mut self, _launch: &Launch<'_>, _out: &mut [u64]) -> Result<()> {
        Err(RngError::TypeError(
            "64-bit output requires a 64-bit quasi-random generator".to_owned(),
        ))
    }

    fn generate_uniform<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
    ) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let raw = self.draw(out.len() * F::WORDS)?;
        launch.map(&raw, F::WORDS, out, 1, |words, value| {
            value[0] = F::unit_from_words(words);
        })
    }

    fn generate_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        self.gaussian(launch, out, mean, stddev, |z| z)
    }

    fn generate_log_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        self.gaussian(launch, out, mean, stddev, F::exp)
    }

    fn generate_poisson(
        &mut self,
        _launch: &Launch<'_>,
        out: &mut [u32],
        lambda: f64,
    ) -> Result<()> {
        validate_lambda(lambda)?;
        fill_poisson(self.engine(), out, lambda)
    }

    fn set_seed(&mut self, seed: u64) -> Result<()> {
        self.seed = seed;
        self.engine = None;
        Ok(())
    }

    fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
        self.engine = None;
    }

    fn set_dimensions(&mut self, _dimensions: u32) -> Result<()> {
        Err(RngError::TypeError(
            "dimensions apply to quasi-random generators only".to_owned(),
        ))
    }

    fn dimensions(&self) -> Option<u32> {
        None
    }
}

// =============================================================================
// Quasi-random family
// =============================================================================

/// Backend over a low-discrepancy sequence.
#[derive(Debug, Clone)]
pub(crate) struct QuasiBackend<Q> {
    engine: Q,
    offset: u64,
}

impl<Q: QuasiEngine> QuasiBackend<Q> {
    pub(crate) fn new(engine: Q) -> Self {
        Self { engine, offset: 0 }
    }

    /// Draws `len` values in dimension-major order.
    fn draw(&mut self, len: usize) -> Result<Vec<Q::Word>> {
        let dimensions = self.engine.dimensions();
        if len % dimensions as usize != 0 {
            return Err(RngError::LengthNotMultiple {
                length: len,
                dimensions,
            });
        }
        let mut raw = scratch(len)?;
        self.engine.fill(&mut raw)?;
        Ok(raw)
    }

    fn native<T: Send>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [T],
        convert: fn(u64) -> T,
    ) -> Result<()> {
        let raw = self.draw(out.len())?;
        launch.map(&raw, 1, out, 1, |word, value| {
            value[0] = convert(word[0].to_u64());
        })
    }

    fn gaussian<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
        finish: fn(F) -> F,
    ) -> Result<()> {
        let raw = self.draw(out.len())?;
        launch.map(&raw, 1, out, 1, move |word, value| {
            let u: f64 = word[0].to_unit();
            let z = F::lossy_from_f64(inverse_normal_cdf(u.min(BELOW_ONE)));
            value[0] = finish(mean + stddev * z);
        })
    }

    fn type_error(&self, bits: u32) -> RngError {
        RngError::TypeError(format!(
            "{}-bit output requested from a {}-bit quasi-random generator",
            bits,
            <Q::Word as QuasiWord>::BITS
        ))
    }
}

impl<Q: QuasiEngine> Backend for QuasiBackend<Q> {
    fn generate_u32(&mut self, launch: &Launch<'_>, out: &mut [u32]) -> Result<()> {
        if <Q::Word as QuasiWord>::BITS != 32 {
            return Err(self.type_error(32));
        }
        self.native(launch, out, |word| word as u32)
    }

    fn generate_u64(&mut self, launch: &Launch<'_>, out: &mut [u64]) -> Result<()> {
        if <Q::Word as QuasiWord>::BITS != 64 {
            return Err(self.type_error(64));
        }
        self.native(launch, out, |word| word)
    }

    fn generate_uniform<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
    ) -> Result<()> {
        let raw = self.draw(out.len())?;
        launch.map(&raw, 1, out, 1, |word, value| {
            value[0] = word[0].to_unit();
        })
    }

    fn generate_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        self.gaussian(launch, out, mean, stddev, |z| z)
    }

    fn generate_log_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        self.gaussian(launch, out, mean, stddev, F::exp)
    }

    fn generate_poisson(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [u32],
        lambda: f64,
    ) -> Result<()> {
        validate_lambda(lambda)?;
        let raw = self.draw(out.len())?;
        launch.map(&raw, 1, out, 1, move |word, value| {
            value[0] = poisson_inverse(word[0].to_unit(), lambda);
        })
    }

    fn set_seed(&mut self, _seed: u64) -> Result<()> {
        Err(RngError::TypeError(
            "quasi-random generators have no seed".to_owned(),
        ))
    }

    fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
        self.engine.skip_to(offset);
    }

    fn set_dimensions(&mut self, dimensions: u32) -> Result<()> {
        self.engine.set_dimensions(dimensions)?;
        self.engine.skip_to(self.offset);
        Ok(())
    }

    fn dimensions(&self) -> Option<u32> {
        Some(self.engine.dimensions())
    }
}

// =============================================================================
// Closed dispatch
// =============================================================================

/// The concrete backends, one per implemented generator type.
#[derive(Debug, Clone)]
pub(crate) enum BackendKind {
    Xorwow(PseudoBackend<XorwowEngine>),
    Mrg32k3a(PseudoBackend<Mrg32k3aEngine>),
    Mt19937(PseudoBackend<Mt19937Engine>),
    Philox(PseudoBackend<PhiloxEngine>),
    Sobol32(QuasiBackend<Sobol32Engine>),
    Sobol64(QuasiBackend<Sobol64Engine>),
}

/// Seed of a freshly created pseudo-random generator.
pub(crate) const DEFAULT_SEED: u64 = 0;

macro_rules! dispatch {
    ($kind:expr, $backend:ident => $body:expr) => {
        match $kind {
            BackendKind::Xorwow($backend) => $body,
            BackendKind::Mrg32k3a($backend) => $body,
            BackendKind::Mt19937($backend) => $body,
            BackendKind::Philox($backend) => $body,
            BackendKind::Sobol32($backend) => $body,
            BackendKind::Sobol64($backend) => $body,
        }
    };
}

impl BackendKind {
    /// Selects the backend for `rng_type`.
    ///
    /// # Errors
    ///
    /// - [`RngError::TypeError`] for the test type
    /// - [`RngError::NotImplemented`] for MTGP32
    pub(crate) fn for_type(rng_type: RngType) -> Result<Self> {
        let kind = match rng_type.resolve() {
            RngType::PseudoXorwow => Self::Xorwow(PseudoBackend::new(DEFAULT_SEED)),
            RngType::PseudoMrg32k3a => Self::Mrg32k3a(PseudoBackend::new(DEFAULT_SEED)),
            RngType::PseudoMt19937 => Self::Mt19937(PseudoBackend::new(DEFAULT_SEED)),
            RngType::PseudoPhilox4x32_10 => Self::Philox(PseudoBackend::new(DEFAULT_SEED)),
            RngType::QuasiSobol32 => Self::Sobol32(QuasiBackend::new(Sobol32Engine::new(false))),
            RngType::QuasiScrambledSobol32 => {
                Self::Sobol32(QuasiBackend::new(Sobol32Engine::new(true)))
            }
            RngType::QuasiSobol64 => Self::Sobol64(QuasiBackend::new(Sobol64Engine::new(false))),
            RngType::QuasiScrambledSobol64 => {
                Self::Sobol64(QuasiBackend::new(Sobol64Engine::new(true)))
            }
            RngType::PseudoMtgp32 => {
                return Err(RngError::NotImplemented(format!(
                    "{} generators are not supported",
                    rng_type
                )))
            }
            RngType::Test | RngType::PseudoDefault | RngType::QuasiDefault => {
                return Err(RngError::TypeError(format!(
                    "{} is not a creatable generator type",
                    rng_type
                )))
            }
        };
        Ok(kind)
    }

    pub(crate) fn generate_u32(&mut self, launch: &Launch<'_>, out: &mut [u32]) -> Result<()> {
        dispatch!(self, b => b.generate_u32(launch, out))
    }

    pub(crate) fn generate_u64(&mut self, launch: &Launch<'_>, out: &mut [u64]) -> Result<()> {
        dispatch!(self, b => b.generate_u64(launch, out))
    }

    pub(crate) fn generate_uniform<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
    ) -> Result<()> {
        dispatch!(self, b => b.generate_uniform(launch, out))
    }

    pub(crate) fn generate_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        dispatch!(self, b => b.generate_normal(launch, out, mean, stddev))
    }

    pub(crate) fn generate_log_normal<F: UnitFloat>(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [F],
        mean: F,
        stddev: F,
    ) -> Result<()> {
        dispatch!(self, b => b.generate_log_normal(launch, out, mean, stddev))
    }

    pub(crate) fn generate_poisson(
        &mut self,
        launch: &Launch<'_>,
        out: &mut [u32],
        lambda: f64,
    ) -> Result<()> {
        dispatch!(self, b => b.generate_poisson(launch, out, lambda))
    }

    pub(crate) fn set_seed(&mut self, seed: u64) -> Result<()> {
        dispatch!(self, b => b.set_seed(seed))
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        dispatch!(self, b => b.set_offset(offset))
    }

    pub(crate) fn set_dimensions(&mut self, dimensions: u32) -> Result<()> {
        dispatch!(self, b => b.set_dimensions(dimensions))
    }

    pub(crate) fn dimensions(&self) -> Option<u32> {
        dispatch!(self, b => b.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rng_core::Residency;

    fn host() -> Launch<'static> {
        Launch::new(Residency::Host, None)
    }

    #[test]
    fn test_for_type_resolves_defaults() {
        assert!(matches!(
            BackendKind::for_type(RngType::PseudoDefault).unwrap(),
            BackendKind::Xorwow(_)
        ));
        assert!(matches!(
            BackendKind::for_type(RngType::QuasiDefault).unwrap(),
            BackendKind::Sobol32(_)
        ));
    }

    #[test]
    fn test_for_type_rejects_test_and_mtgp32() {
        assert!(matches!(
            BackendKind::for_type(RngType::Test),
            Err(RngError::TypeError(_))
        ));
        assert!(matches!(
            BackendKind::for_type(RngType::PseudoMtgp32),
            Err(RngError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_pseudo_uniform_f64_uses_two_words_high_first() {
        let mut backend = PseudoBackend::<PhiloxEngine>::new(9);
        let mut out = [0.0f64; 3];
        backend.generate_uniform(&host(), &mut out).unwrap();

        let mut engine = PhiloxEngine::seeded(9);
        let mut words = [0u32; 6];
        engine.fill_u32(&mut words);
        for (i, &value) in out.iter().enumerate() {
            assert_eq!(value, f64::unit_from_words(&words[2 * i..2 * i + 2]));
        }
    }

    #[test]
    fn test_pseudo_odd_normal_consumes_whole_pair() {
        let mut odd = PseudoBackend::<XorwowEngine>::new(1);
        let mut even = PseudoBackend::<XorwowEngine>::new(1);
        let mut three = [0.0f32; 3];
        let mut four = [0.0f32; 4];
        odd.generate_normal(&host(), &mut three, 0.0, 1.0).unwrap();
        even.generate_normal(&host(), &mut four, 0.0, 1.0).unwrap();
        assert_eq!(three[..], four[..3]);

        let mut next_odd = [0u32; 1];
        let mut next_even = [0u32; 1];
        odd.generate_u32(&host(), &mut next_odd).unwrap();
        even.generate_u32(&host(), &mut next_even).unwrap();
        assert_eq!(next_odd, next_even);
    }

    #[test]
    fn test_log_normal_is_exp_of_normal() {
        let mut a = PseudoBackend::<Mrg32k3aEngine>::new(3);
        let mut b = PseudoBackend::<Mrg32k3aEngine>::new(3);
        let mut normal = [0.0f64; 9];
        let mut log_normal = [0.0f64; 9];
        a.generate_normal(&host(), &mut normal, 0.5, 0.25).unwrap();
        b.generate_log_normal(&host(), &mut log_normal, 0.5, 0.25).unwrap();
        for (n, l) in normal.iter().zip(&log_normal) {
            assert_relative_eq!(n.exp(), *l, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_pseudo_offset_and_seed_rebuild_engine() {
        let mut backend = PseudoBackend::<Mt19937Engine>::new(5);
        let mut full = [0u32; 20];
        backend.generate_u32(&host(), &mut full).unwrap();

        backend.set_offset(12);
        let mut tail = [0u32; 8];
        backend.generate_u32(&host(), &mut tail).unwrap();
        assert_eq!(tail, full[12..]);

        backend.set_seed(6).unwrap();
        let mut reseeded = [0u32; 8];
        backend.generate_u32(&host(), &mut reseeded).unwrap();
        assert_ne!(reseeded, tail);
    }

    #[test]
    fn test_pseudo_rejects_quasi_operations() {
        let mut backend = PseudoBackend::<XorwowEngine>::new(0);
        assert!(matches!(backend.set_dimensions(2), Err(RngError::TypeError(_))));
        assert!(matches!(
            backend.generate_u64(&host(), &mut [0u64; 2]),
            Err(RngError::TypeError(_))
        ));
        assert_eq!(backend.dimensions(), None);
    }

    #[test]
    fn test_quasi_word_width_is_checked() {
        let mut sobol32 = QuasiBackend::new(Sobol32Engine::new(false));
        let mut sobol64 = QuasiBackend::new(Sobol64Engine::new(false));
        assert!(sobol32.generate_u64(&host(), &mut [0u64; 2]).is_err());
        assert!(sobol64.generate_u32(&host(), &mut [0u32; 2]).is_err());

        let mut out = [0u64; 4];
        sobol64.generate_u64(&host(), &mut out).unwrap();
        assert_eq!(out, [0, 1 << 63, 3 << 62, 1 << 62]);
    }

    #[test]
    fn test_quasi_offset_survives_dimension_change() {
        let mut backend = QuasiBackend::new(Sobol32Engine::new(false));
        backend.set_offset(4);
        backend.set_dimensions(2).unwrap();
        let mut out = [0u32; 4];
        backend.generate_u32(&host(), &mut out).unwrap();

        let mut reference = Sobol32Engine::new(false);
        reference.set_dimensions(2).unwrap();
        assert_eq!(out, [
            reference.point(4, 0),
            reference.point(5, 0),
            reference.point(4, 1),
            reference.point(5, 1),
        ]);
    }

    #[test]
    fn test_quasi_normal_starts_finite() {
        let mut backend = QuasiBackend::new(Sobol64Engine::new(false));
        let mut out = [0.0f64; 64];
        backend.generate_normal(&host(), &mut out, 0.0, 1.0).unwrap();
        assert!(out.iter().all(|z| z.is_finite()));
        assert_relative_eq!(out[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quasi_poisson_rejects_lambda_before_drawing() {
        let mut backend = QuasiBackend::new(Sobol32Engine::new(false));
        let mut out = [9u32; 4];
        assert!(backend.generate_poisson(&host(), &mut out, -1.0).is_err());
        assert_eq!(out, [9; 4]);
        assert_eq!(backend.engine.index(), 0);
    }

    #[test]
    fn test_quasi_has_no_seed() {
        let mut backend = QuasiBackend::new(Sobol32Engine::new(true));
        assert!(matches!(backend.set_seed(1), Err(RngError::TypeError(_))));
        assert_eq!(backend.dimensions(), Some(1));
    }
}
