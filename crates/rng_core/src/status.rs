//! ABI-stable status codes.
//!
//! Numeric values are part of the compatibility contract with callers that
//! link against the C ABI: `0` is success, the 100s are configuration and
//! setup errors, the 200s are runtime and launch errors, and `999`/`1000`
//! are internal/unimplemented.

use std::fmt;

use crate::error::RngError;

/// Status returned by every operation of the flat call surface.
///
/// # Examples
/// ```
/// use rng_core::Status;
///
/// assert_eq!(Status::from_code(202), Some(Status::PreexistingFailure));
/// assert!(Status::Success.is_success());
/// assert_eq!(Status::NotImplemented.code(), 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// Success
    Success = 0,
    /// Header version and linked library version do not match
    VersionMismatch = 100,
    /// Generator not initialised
    NotInitialized = 101,
    /// Memory allocation failed
    AllocationFailed = 102,
    /// Generator is the wrong type for the operation
    TypeError = 103,
    /// Argument out of range
    OutOfRange = 104,
    /// Requested length is not a multiple of the dimension count
    LengthNotMultiple = 105,
    /// Backend lacks double precision support
    DoublePrecisionRequired = 106,
    /// Kernel launch failure
    LaunchFailure = 201,
    /// Pre-existing failure detected on entry
    PreexistingFailure = 202,
    /// Backend initialisation failed
    InitializationFailed = 203,
    /// Architecture does not support the requested feature
    ArchMismatch = 204,
    /// Internal library error
    InternalError = 999,
    /// Feature not implemented
    NotImplemented = 1000,
}

impl Status {
    /// Every status, in ascending code order.
    pub const ALL: [Status; 14] = [
        Status::Success,
        Status::VersionMismatch,
        Status::NotInitialized,
        Status::AllocationFailed,
        Status::TypeError,
        Status::OutOfRange,
        Status::LengthNotMultiple,
        Status::DoublePrecisionRequired,
        Status::LaunchFailure,
        Status::PreexistingFailure,
        Status::InitializationFailed,
        Status::ArchMismatch,
        Status::InternalError,
        Status::NotImplemented,
    ];

    /// Returns the numeric ABI code.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Looks up a status by its numeric ABI code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|status| status.code() == code)
    }

    /// Returns `true` for [`Status::Success`].
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Short symbolic name, as printed by the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::VersionMismatch => "VERSION_MISMATCH",
            Status::NotInitialized => "NOT_INITIALIZED",
            Status::AllocationFailed => "ALLOCATION_FAILED",
            Status::TypeError => "TYPE_ERROR",
            Status::OutOfRange => "OUT_OF_RANGE",
            Status::LengthNotMultiple => "LENGTH_NOT_MULTIPLE",
            Status::DoublePrecisionRequired => "DOUBLE_PRECISION_REQUIRED",
            Status::LaunchFailure => "LAUNCH_FAILURE",
            Status::PreexistingFailure => "PREEXISTING_FAILURE",
            Status::InitializationFailed => "INITIALIZATION_FAILED",
            Status::ArchMismatch => "ARCH_MISMATCH",
            Status::InternalError => "INTERNAL_ERROR",
            Status::NotImplemented => "NOT_IMPLEMENTED",
        }
    }

    /// Collapses a Rust result into its status.
    pub fn from_result<T>(result: &Result<T, RngError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(err) => err.status(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl From<RngError> for Status {
    fn from(err: RngError) -> Self {
        err.status()
    }
}

impl From<&RngError> for Status {
    fn from(err: &RngError) -> Self {
        err.status()
    }
}
