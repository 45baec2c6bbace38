//! Library version state.
//!
//! The version integer is `major * 100000 + minor * 100 + patch`.
//! [`HEADER_VERSION`] is fixed at compile time for callers built against this
//! crate; [`library_version`] is initialised once per process and never
//! mutated.

use std::sync::OnceLock;

use crate::error::RngError;

const fn parse_component(s: &str) -> i32 {
    let bytes = s.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as i32;
        i += 1;
    }
    value
}

const fn encode(major: i32, minor: i32, patch: i32) -> i32 {
    major * 100_000 + minor * 100 + patch
}

/// Version the caller was compiled against.
pub const HEADER_VERSION: i32 = encode(
    parse_component(env!("CARGO_PKG_VERSION_MAJOR")),
    parse_component(env!("CARGO_PKG_VERSION_MINOR")),
    parse_component(env!("CARGO_PKG_VERSION_PATCH")),
);

static LIBRARY_VERSION: OnceLock<i32> = OnceLock::new();

/// Returns the version integer of the linked library.
///
/// # Examples
/// ```
/// use rng_core::{library_version, HEADER_VERSION};
///
/// assert_eq!(library_version(), HEADER_VERSION);
/// ```
pub fn library_version() -> i32 {
    *LIBRARY_VERSION.get_or_init(|| {
        let component = |s: &str| s.parse::<i32>().unwrap_or(0);
        encode(
            component(env!("CARGO_PKG_VERSION_MAJOR")),
            component(env!("CARGO_PKG_VERSION_MINOR")),
            component(env!("CARGO_PKG_VERSION_PATCH")),
        )
    })
}

/// Checks that a caller's header version is compatible with this library.
///
/// Versions are compatible when their major components agree.
///
/// # Errors
///
/// Returns [`RngError::VersionMismatch`] when the major versions differ.
pub fn ensure_compatible(header: i32) -> Result<(), RngError> {
    let library = library_version();
    if header / 100_000 == library / 100_000 {
        Ok(())
    } else {
        Err(RngError::VersionMismatch { header, library })
    }
}
