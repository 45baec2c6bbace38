//! Error types for structured error handling.
//!
//! [`RngError`] is what every Rust-level operation returns. Each variant
//! corresponds to exactly one [`Status`] code so the C ABI can report it
//! without loss of category.

use thiserror::Error;

use crate::status::Status;

/// Categorised generator errors.
///
/// # Variants
/// - Setup: `VersionMismatch`, `AllocationFailed`, `InitializationFailed`,
///   `TypeError`, `NotImplemented`
/// - Usage: `NotInitialized`, `OutOfRange`, `LengthNotMultiple`
/// - Runtime: `LaunchFailure`, `PreexistingFailure`, `ArchMismatch`,
///   `DoublePrecisionRequired`
/// - Catch-all: `Internal`
///
/// # Examples
/// ```
/// use rng_core::{RngError, Status};
///
/// let err = RngError::LengthNotMultiple { length: 7, dimensions: 2 };
/// assert_eq!(format!("{}", err), "Length 7 is not a multiple of dimension count 2");
/// assert_eq!(err.status(), Status::LengthNotMultiple);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RngError {
    /// Caller's header version is incompatible with the linked library.
    #[error("Version mismatch: header {header}, library {library}")]
    VersionMismatch {
        /// Version the caller was built against
        header: i32,
        /// Version of this library
        library: i32,
    },

    /// Handle does not refer to a live generator.
    #[error("Generator not initialised")]
    NotInitialized,

    /// Memory for generator state or a launch could not be reserved.
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    /// Operation does not apply to this generator type.
    #[error("Type error: {0}")]
    TypeError(String),

    /// Argument outside its valid domain.
    #[error("Argument out of range: {0}")]
    OutOfRange(String),

    /// Quasi-random length is not a multiple of the dimension count.
    #[error("Length {length} is not a multiple of dimension count {dimensions}")]
    LengthNotMultiple {
        /// Requested number of values
        length: usize,
        /// Configured dimension count
        dimensions: u32,
    },

    /// Backend lacks double precision support.
    #[error("Double precision required")]
    DoublePrecisionRequired,

    /// A generation launch failed.
    #[error("Launch failure: {0}")]
    LaunchFailure(String),

    /// An earlier launch failed; the generator is no longer usable.
    #[error("Pre-existing failure on entry")]
    PreexistingFailure,

    /// Backend or execution stream could not be prepared.
    #[error("Initialisation failed: {0}")]
    InitializationFailed(String),

    /// Backend does not support the requested feature.
    #[error("Architecture mismatch: {0}")]
    ArchMismatch(String),

    /// Internal library error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Recognised but unsupported feature.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl RngError {
    /// Returns the ABI status this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            RngError::VersionMismatch { .. } => Status::VersionMismatch,
            RngError::NotInitialized => Status::NotInitialized,
            RngError::AllocationFailed(_) => Status::AllocationFailed,
            RngError::TypeError(_) => Status::TypeError,
            RngError::OutOfRange(_) => Status::OutOfRange,
            RngError::LengthNotMultiple { .. } => Status::LengthNotMultiple,
            RngError::DoublePrecisionRequired => Status::DoublePrecisionRequired,
            RngError::LaunchFailure(_) => Status::LaunchFailure,
            RngError::PreexistingFailure => Status::PreexistingFailure,
            RngError::InitializationFailed(_) => Status::InitializationFailed,
            RngError::ArchMismatch(_) => Status::ArchMismatch,
            RngError::Internal(_) => Status::InternalError,
            RngError::NotImplemented(_) => Status::NotImplemented,
        }
    }

    /// Returns `true` for errors after which the generator should be
    /// destroyed and recreated.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RngError::LaunchFailure(_)
                | RngError::PreexistingFailure
                | RngError::InitializationFailed(_)
                | RngError::Internal(_)
        )
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, RngError>;
