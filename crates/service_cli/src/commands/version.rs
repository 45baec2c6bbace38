//! Version command implementation

use rng_core::{ensure_compatible, library_version, HEADER_VERSION};

use crate::Result;

/// Splits a version integer into `(major, minor, patch)`.
pub fn decode(version: i32) -> (i32, i32, i32) {
    (version / 100_000, version / 100 % 1000, version % 100)
}

/// Run the version command
pub fn run() -> Result<()> {
    let library = library_version();
    let (major, minor, patch) = decode(library);
    println!("neutryx-rng {}.{}.{} ({})", major, minor, patch, library);
    println!("header version: {}", HEADER_VERSION);
    match ensure_compatible(HEADER_VERSION) {
        Ok(()) => println!("compatible: yes"),
        Err(e) => println!("compatible: no ({})", e),
    }
    Ok(())
}
