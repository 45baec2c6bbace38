//! Distribution transforms over raw engine output.
//!
//! All transforms are pure functions of raw words so that host and device
//! launches produce identical values regardless of how the work is split.
//!
//! - Uniform values lie in `(0, 1]`: `x * 2^-32 + 2^-33` for 32-bit words,
//!   `x * 2^-64 + 2^-65` for 64-bit words.
//! - Normal values use Box–Muller on pairs of uniforms for pseudo-random
//!   input and the inverse normal CDF for quasi-random input.
//! - Poisson values use `rand_distr::Poisson` over a pseudo-random engine,
//!   or inverse transform of a single uniform for quasi-random input.

use num_traits::Float;
use rand_core::RngCore;
use rand_distr::{Distribution, Poisson};
use rng_core::RngError;

const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Below this lambda quasi-random Poisson values use an exact CDF search.
pub const POISSON_NORMAL_THRESHOLD: f64 = 64.0;

const POISSON_SEARCH_LIMIT: u32 = 1024;

/// Largest accepted Poisson lambda; variates stay well inside `u32`.
pub const POISSON_LAMBDA_MAX: f64 = 2_147_483_648.0;

/// Floating-point output type of the uniform, normal and log-normal
/// transforms.
pub trait UnitFloat: Float + Send + Sync + 'static {
    /// 32-bit words consumed per uniform from a pseudo-random engine.
    const WORDS: usize;

    /// Maps a 32-bit word into `(0, 1]`.
    fn unit_from_u32(x: u32) -> Self;

    /// Maps a 64-bit word into `(0, 1]`.
    fn unit_from_u64(x: u64) -> Self;

    /// Maps `WORDS` consecutive 32-bit words into `(0, 1]`.
    fn unit_from_words(words: &[u32]) -> Self;

    /// Narrows (or copies) an `f64`.
    fn lossy_from_f64(x: f64) -> Self;
}

impl UnitFloat for f32 {
    const WORDS: usize = 1;

    #[inline]
    fn unit_from_u32(x: u32) -> Self {
        const SCALE: f32 = 1.0 / 4_294_967_296.0;
        x as f32 * SCALE + SCALE / 2.0
    }

    #[inline]
    fn unit_from_u64(x: u64) -> Self {
        f64::unit_from_u64(x) as f32
    }

    #[inline]
    fn unit_from_words(words: &[u32]) -> Self {
        Self::unit_from_u32(words[0])
    }

    #[inline]
    fn lossy_from_f64(x: f64) -> Self {
        x as f32
    }
}

impl UnitFloat for f64 {
    const WORDS: usize = 2;

    #[inline]
    fn unit_from_u32(x: u32) -> Self {
        x as f64 / TWO_POW_32 + 0.5 / TWO_POW_32
    }

    #[inline]
    fn unit_from_u64(x: u64) -> Self {
        x as f64 / TWO_POW_64 + 0.5 / TWO_POW_64
    }

    #[inline]
    fn unit_from_words(words: &[u32]) -> Self {
        Self::unit_from_u64(((words[0] as u64) << 32) | words[1] as u64)
    }

    #[inline]
    fn lossy_from_f64(x: f64) -> Self {
        x
    }
}

/// Box–Muller transform of two uniforms in `(0, 1]` into two independent
/// standard normal variates.
#[inline]
pub fn box_muller<F: UnitFloat>(u1: F, u2: F) -> (F, F) {
    let two = F::one() + F::one();
    let radius = (-two * u1.ln()).sqrt();
    let theta = F::lossy_from_f64(std::f64::consts::TAU) * u2;
    (radius * theta.cos(), radius * theta.sin())
}

/// Inverse of the standard normal CDF.
///
/// Acklam's rational approximation, relative error below 1.2e-9.
/// Returns `-inf` for `p <= 0` and `+inf` for `p >= 1`.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Checks that `lambda` is a valid Poisson parameter.
///
/// # Errors
///
/// Returns [`RngError::OutOfRange`] if `lambda` is non-positive, not finite,
/// or above [`POISSON_LAMBDA_MAX`].
pub fn validate_lambda(lambda: f64) -> Result<(), RngError> {
    if lambda > 0.0 && lambda <= POISSON_LAMBDA_MAX {
        Ok(())
    } else {
        Err(RngError::OutOfRange(format!(
            "Poisson lambda must be in (0, {}], got {}",
            POISSON_LAMBDA_MAX, lambda
        )))
    }
}

/// Poisson variate by inverse transform of a uniform in `(0, 1]`.
///
/// Exact CDF search below [`POISSON_NORMAL_THRESHOLD`]; above it a
/// continuity-corrected normal approximation.
pub fn poisson_inverse(u: f64, lambda: f64) -> u32 {
    if lambda < POISSON_NORMAL_THRESHOLD {
        let mut k = 0u32;
        let mut p = (-lambda).exp();
        let mut cdf = p;
        while cdf < u && k < POISSON_SEARCH_LIMIT {
            k += 1;
            p *= lambda / k as f64;
            if p == 0.0 {
                break;
            }
            cdf += p;
        }
        k
    } else {
        let u = u.min(1.0 - f64::EPSILON / 2.0);
        let z = inverse_normal_cdf(u);
        (lambda + lambda.sqrt() * z + 0.5).floor().max(0.0) as u32
    }
}

/// Fills `out` with Poisson variates sampled from a pseudo-random engine.
///
/// # Errors
///
/// Returns [`RngError::OutOfRange`] for an invalid `lambda`; `out` is left
/// untouched in that case.
pub fn fill_poisson<R: RngCore>(rng: &mut R, out: &mut [u32], lambda: f64) -> Result<(), RngError> {
    validate_lambda(lambda)?;
    let distribution =
        Poisson::new(lambda).map_err(|e| RngError::OutOfRange(format!("Poisson: {}", e)))?;
    for value in out.iter_mut() {
        let sample: f64 = distribution.sample(rng);
        *value = sample as u32;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PseudoEngine;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_f32_endpoints() {
        let low = f32::unit_from_u32(0);
        let high = f32::unit_from_u32(u32::MAX);
        assert!(low > 0.0);
        assert!(high <= 1.0);
    }

    #[test]
    fn test_uniform_f64_endpoints() {
        assert!(f64::unit_from_u32(0) > 0.0);
        assert!(f64::unit_from_u32(u32::MAX) < 1.0);
        assert!(f64::unit_from_u64(0) > 0.0);
        assert_eq!(f64::unit_from_u64(u64::MAX), 1.0);
        assert!(f32::unit_from_u64(0) > 0.0);
        assert_eq!(f32::unit_from_u64(u64::MAX), 1.0);
    }

    #[test]
    fn test_uniform_midpoint() {
        assert_relative_eq!(f64::unit_from_u32(1 << 31), 0.5 + 0.5 / TWO_POW_32);
        assert_relative_eq!(f64::unit_from_words(&[1 << 31, 0]), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_box_muller_known_values() {
        let (z0, z1) = box_muller(1.0f64, 0.25);
        assert_relative_eq!(z0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(z1, 0.0, epsilon = 1e-12);

        let u1 = (-0.5f64).exp();
        let (z0, z1) = box_muller(u1, 0.0);
        assert_relative_eq!(z0, 1.0, epsilon = 1e-12);
        assert_relative_eq!(z1, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_normal_cdf_reference_points() {
        assert_relative_eq!(inverse_normal_cdf(0.5), 0.0, epsilon = 1e-9);
        assert_relative_eq!(inverse_normal_cdf(0.975), 1.959_963_984_540_054, epsilon = 1e-7);
        assert_relative_eq!(inverse_normal_cdf(0.01), -2.326_347_874_040_841, epsilon = 1e-7);
        assert_relative_eq!(inverse_normal_cdf(0.999), 3.090_232_306_167_813, epsilon = 1e-7);
        assert_eq!(inverse_normal_cdf(0.0), f64::NEG_INFINITY);
        assert_eq!(inverse_normal_cdf(1.0), f64::INFINITY);
    }

    #[test]
    fn test_inverse_normal_cdf_is_odd() {
        for p in [0.001, 0.02, 0.1, 0.3, 0.45] {
            assert_relative_eq!(
                inverse_normal_cdf(p),
                -inverse_normal_cdf(1.0 - p),
                epsilon = 1e-8
            );
        }
    }

    #[test]
    fn test_validate_lambda() {
        assert!(validate_lambda(0.5).is_ok());
        assert!(validate_lambda(0.0).is_err());
        assert!(validate_lambda(-1.0).is_err());
        assert!(validate_lambda(f64::NAN).is_err());
        assert!(validate_lambda(f64::INFINITY).is_err());
        assert!(validate_lambda(POISSON_LAMBDA_MAX).is_ok());
        assert!(validate_lambda(1.0e10).is_err());
    }

    #[test]
    fn test_largest_lambda_fits_in_u32() {
        let lambda = POISSON_LAMBDA_MAX;
        let top = poisson_inverse(1.0, lambda);
        assert!(top > lambda as u32 && top < u32::MAX);

        let mut rng = crate::PhiloxEngine::seeded(7);
        let mut out = [0u32; 64];
        fill_poisson(&mut rng, &mut out, lambda).unwrap();
        let spread = 10.0 * lambda.sqrt();
        assert!(out.iter().all(|&k| (k as f64 - lambda).abs() < spread));
    }

    #[test]
    fn test_poisson_inverse_small_lambda() {
        let lambda = 2.0;
        let p0 = (-lambda).exp();
        assert_eq!(poisson_inverse(p0 * 0.5, lambda), 0);
        assert_eq!(poisson_inverse(p0 * 1.5, lambda), 1);
        assert!(poisson_inverse(1.0, lambda) < POISSON_SEARCH_LIMIT);
    }

    #[test]
    fn test_poisson_inverse_large_lambda_is_centred() {
        let lambda = 1_000.0;
        let median = poisson_inverse(0.5, lambda);
        assert!((999..=1001).contains(&median));
        assert!(poisson_inverse(1.0, lambda) > 1_000);
    }

    #[test]
    fn test_fill_poisson_rejects_bad_lambda_without_writing() {
        let mut rng = crate::PhiloxEngine::seeded(1);
        let mut out = [42u32; 8];
        let err = fill_poisson(&mut rng, &mut out, 0.0).unwrap_err();
        assert!(matches!(err, RngError::OutOfRange(_)));
        assert_eq!(out, [42u32; 8]);
    }

    #[test]
    fn test_fill_poisson_mean() {
        let mut rng = crate::XorwowEngine::seeded(2024);
        let mut out = vec![0u32; 50_000];
        fill_poisson(&mut rng, &mut out, 4.5).unwrap();
        let mean = out.iter().map(|&v| v as f64).sum::<f64>() / out.len() as f64;
        assert_relative_eq!(mean, 4.5, epsilon = 0.05);
    }
}
