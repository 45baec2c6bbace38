//! Check command implementation
//!
//! Creates a generator of every type under both residencies and reports the
//! resulting status, followed by a short uniform draw for the types that
//! construct.

use tracing::{debug, info};

use rng_core::{Residency, RngType, Status};
use rng_facade::api;

use crate::Result;

const SMOKE_SAMPLES: usize = 1024;

/// Outcome of checking one type under one residency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckResult {
    pub rng_type: RngType,
    pub residency: Residency,
    pub status: Status,
    pub mean: Option<f64>,
}

/// Checks a single type and residency.
pub fn check(rng_type: RngType, residency: Residency) -> CheckResult {
    let created = match residency {
        Residency::Device => api::create(rng_type),
        Residency::Host => api::create_host(rng_type),
    };
    let handle = match created {
        Ok(handle) => handle,
        Err(e) => {
            debug!(%rng_type, %residency, error = %e, "generator not available");
            return CheckResult {
                rng_type,
                residency,
                status: e.status(),
                mean: None,
            };
        }
    };

    let mut out = vec![0.0f64; SMOKE_SAMPLES];
    let drawn = api::generate_uniform_double(handle, &mut out);
    let destroyed = api::destroy(handle);
    let status = Status::from_result(&drawn.and(destroyed));
    let mean = status
        .is_success()
        .then(|| out.iter().sum::<f64>() / out.len() as f64);

    CheckResult {
        rng_type,
        residency,
        status,
        mean,
    }
}

/// Run the check command
pub fn run() -> Result<()> {
    info!("Checking generator types");
    println!("{:<20} {:<8} {:<28} {}", "TYPE", "WHERE", "STATUS", "MEAN");
    for rng_type in RngType::ALL {
        for residency in [Residency::Device, Residency::Host] {
            let result = check(rng_type, residency);
            let mean = result
                .mean
                .map(|m| format!("{:.4}", m))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<20} {:<8} {:<28} {}",
                rng_type.to_string(),
                residency.to_string(),
                result.status.to_string(),
                mean
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_supported_type() {
        let result = check(RngType::PseudoPhilox4x32_10, Residency::Host);
        assert_eq!(result.status, Status::Success);
        let mean = result.mean.unwrap();
        assert!((mean - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_check_unsupported_types() {
        assert_eq!(
            check(RngType::PseudoMtgp32, Residency::Device).status,
            Status::NotImplemented
        );
        let test = check(RngType::Test, Residency::Host);
        assert_eq!(test.status, Status::TypeError);
        assert!(test.mean.is_none());
    }
}
