//! C ABI.
//!
//! Functions use the `rng_` prefix and return [`Status`]. Generators and
//! streams are passed as non-zero `u64` identifiers; `0` is the null handle.
//! Panics never unwind across the boundary: they are reported as
//! [`Status::InternalError`].
//!
//! # Safety
//!
//! Every pointer argument must be null or valid for the access described by
//! the function. Output buffers must hold `n` elements and must not alias
//! one another.

use std::panic::{self, AssertUnwindSafe};
use std::slice;

use rng_core::{Result, RngError, RngType, Status};

use crate::api;
use crate::registry::{self, GeneratorHandle};
use crate::stream::Stream;

/// Runs `op` and converts its outcome to a status, catching panics.
fn guard(op: impl FnOnce() -> Result<()>) -> Status {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(result) => Status::from_result(&result),
        Err(_) => {
            tracing::warn!("panic caught at the C boundary");
            Status::InternalError
        }
    }
}

fn handle(id: u64) -> Result<GeneratorHandle> {
    GeneratorHandle::from_raw(id).ok_or(RngError::NotInitialized)
}

/// Borrows a caller buffer of `n` elements.
///
/// # Safety
///
/// `ptr` must be null or valid for writes of `n` elements.
unsafe fn output_slice<'a, T>(ptr: *mut T, n: usize) -> Result<&'a mut [T]> {
    if n == 0 {
        return Ok(Default::default());
    }
    if ptr.is_null() {
        return Err(RngError::OutOfRange("null output pointer".to_owned()));
    }
    // SAFETY: non-null and valid for `n` elements per the caller contract.
    Ok(unsafe { slice::from_raw_parts_mut(ptr, n) })
}

/// Writes `value` through an out-pointer.
///
/// # Safety
///
/// `ptr` must be null or valid for a write of one `T`.
unsafe fn write_out<T>(ptr: *mut T, value: T) -> Result<()> {
    if ptr.is_null() {
        return Err(RngError::OutOfRange("null output pointer".to_owned()));
    }
    // SAFETY: non-null and valid per the caller contract.
    unsafe { ptr.write(value) };
    Ok(())
}

unsafe fn create_with(generator: *mut u64, rng_type: u32, host: bool) -> Status {
    guard(|| {
        if generator.is_null() {
            return Err(RngError::OutOfRange("null generator pointer".to_owned()));
        }
        let rng_type = RngType::from_code(rng_type)?;
        let handle = if host {
            api::create_host(rng_type)?
        } else {
            api::create(rng_type)?
        };
        // SAFETY: checked non-null above; valid per the caller contract.
        unsafe { write_out(generator, handle.id()) }
    })
}

/// Creates a device-resident generator and writes its handle to `generator`.
///
/// # Safety
///
/// `generator` must be null or valid for a write of one `u64`.
#[no_mangle]
pub unsafe extern "C" fn rng_create_generator(generator: *mut u64, rng_type: u32) -> Status {
    unsafe { create_with(generator, rng_type, false) }
}

/// Creates a host-resident generator and writes its handle to `generator`.
///
/// # Safety
///
/// `generator` must be null or valid for a write of one `u64`.
#[no_mangle]
pub unsafe extern "C" fn rng_create_generator_host(generator: *mut u64, rng_type: u32) -> Status {
    unsafe { create_with(generator, rng_type, true) }
}

/// Destroys a generator.
#[no_mangle]
pub extern "C" fn rng_destroy_generator(generator: u64) -> Status {
    guard(|| api::destroy(handle(generator)?))
}

macro_rules! generate_fn {
    ($(#[$doc:meta])* $name:ident, $api:ident, $ty:ty $(, $param:ident: $param_ty:ty)*) => {
        $(#[$doc])*
        ///
        /// # Safety
        ///
        /// `output` must be null or valid for writes of `n` elements.
        #[no_mangle]
        pub unsafe extern "C" fn $name(
            generator: u64,
            output: *mut $ty,
            n: usize
            $(, $param: $param_ty)*
        ) -> Status {
            guard(|| {
                let generator = handle(generator)?;
                // SAFETY: forwarded caller contract.
                let out = unsafe { output_slice(output, n)? };
                api::$api(generator, out $(, $param)*)
            })
        }
    };
}

generate_fn!(
    /// Fills `output` with 32-bit values.
    rng_generate, generate, u32
);
generate_fn!(
    /// Fills `output` with 64-bit values from a 64-bit quasi-random generator.
    rng_generate_long_long, generate_long_long, u64
);
generate_fn!(
    /// Fills `output` with uniform `(0, 1]` floats.
    rng_generate_uniform, generate_uniform, f32
);
generate_fn!(
    /// Fills `output` with uniform `(0, 1]` doubles.
    rng_generate_uniform_double, generate_uniform_double, f64
);
generate_fn!(
    /// Fills `output` with normal floats.
    rng_generate_normal, generate_normal, f32, mean: f32, stddev: f32
);
generate_fn!(
    /// Fills `output` with normal doubles.
    rng_generate_normal_double, generate_normal_double, f64, mean: f64, stddev: f64
);
generate_fn!(
    /// Fills `output` with log-normal floats.
    rng_generate_log_normal, generate_log_normal, f32, mean: f32, stddev: f32
);
generate_fn!(
    /// Fills `output` with log-normal doubles.
    rng_generate_log_normal_double, generate_log_normal_double, f64, mean: f64, stddev: f64
);
generate_fn!(
    /// Fills `output` with Poisson values.
    rng_generate_poisson, generate_poisson, u32, lambda: f64
);

/// Binds a generator to a stream; `stream == 0` selects the default context.
#[no_mangle]
pub extern "C" fn rng_set_stream(generator: u64, stream: u64) -> Status {
    guard(|| {
        let generator = handle(generator)?;
        let stream = match stream {
            0 => None,
            id => Some(registry::stream(id)?),
        };
        api::set_stream(generator, stream)
    })
}

/// Sets the seed of a pseudo-random generator.
#[no_mangle]
pub extern "C" fn rng_set_pseudo_random_generator_seed(generator: u64, seed: u64) -> Status {
    guard(|| api::set_pseudo_random_generator_seed(handle(generator)?, seed))
}

/// Sets the absolute offset of a generator.
#[no_mangle]
pub extern "C" fn rng_set_generator_offset(generator: u64, offset: u64) -> Status {
    guard(|| api::set_generator_offset(handle(generator)?, offset))
}

/// Sets the dimension count of a quasi-random generator.
#[no_mangle]
pub extern "C" fn rng_set_quasi_random_generator_dimensions(
    generator: u64,
    dimensions: u32,
) -> Status {
    guard(|| api::set_quasi_random_generator_dimensions(handle(generator)?, dimensions))
}

/// Writes the library version to `version`.
///
/// # Safety
///
/// `version` must be null or valid for a write of one `i32`.
#[no_mangle]
pub unsafe extern "C" fn rng_get_version(version: *mut i32) -> Status {
    // SAFETY: forwarded caller contract.
    guard(|| unsafe { write_out(version, api::get_version()) })
}

/// Creates an execution stream with `threads` workers (`0` for the pool
/// default) and writes its identifier to `stream`.
///
/// # Safety
///
/// `stream` must be null or valid for a write of one `u64`.
#[no_mangle]
pub unsafe extern "C" fn rng_stream_create(stream: *mut u64, threads: u32) -> Status {
    guard(|| {
        if stream.is_null() {
            return Err(RngError::OutOfRange("null stream pointer".to_owned()));
        }
        let id = registry::insert_stream(Stream::new(threads as usize)?)?;
        // SAFETY: checked non-null above; valid per the caller contract.
        unsafe { write_out(stream, id) }
    })
}

/// Releases a stream identifier. Generators bound to the stream keep using
/// it until rebound or destroyed.
#[no_mangle]
pub extern "C" fn rng_stream_destroy(stream: u64) -> Status {
    guard(|| registry::remove_stream(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn create(rng_type: RngType) -> u64 {
        let mut generator = 0u64;
        let status = unsafe { rng_create_generator(&mut generator, rng_type.code()) };
        assert_eq!(status, Status::Success);
        assert_ne!(generator, 0);
        generator
    }

    #[test]
    fn test_get_version() {
        let mut version = 0i32;
        assert_eq!(unsafe { rng_get_version(&mut version) }, Status::Success);
        assert_eq!(version, rng_core::library_version());
        assert_eq!(unsafe { rng_get_version(ptr::null_mut()) }, Status::OutOfRange);
    }

    #[test]
    fn test_create_rejects_bad_types_and_null() {
        let mut generator = 0u64;
        assert_eq!(
            unsafe { rng_create_generator(&mut generator, 999) },
            Status::TypeError
        );
        assert_eq!(
            unsafe { rng_create_generator(&mut generator, RngType::Test.code()) },
            Status::TypeError
        );
        assert_eq!(
            unsafe { rng_create_generator_host(&mut generator, RngType::PseudoMtgp32.code()) },
            Status::NotImplemented
        );
        assert_eq!(
            unsafe { rng_create_generator(ptr::null_mut(), RngType::PseudoXorwow.code()) },
            Status::OutOfRange
        );
        assert_eq!(generator, 0);
    }

    #[test]
    fn test_lifecycle_and_double_destroy() {
        let generator = create(RngType::PseudoMrg32k3a);
        let mut out = vec![0u32; 16];
        assert_eq!(
            unsafe { rng_generate(generator, out.as_mut_ptr(), out.len()) },
            Status::Success
        );
        assert_eq!(rng_destroy_generator(generator), Status::Success);
        assert_eq!(rng_destroy_generator(generator), Status::NotInitialized);
        assert_eq!(
            unsafe { rng_generate(generator, out.as_mut_ptr(), out.len()) },
            Status::NotInitialized
        );
        assert_eq!(rng_destroy_generator(0), Status::NotInitialized);
    }

    #[test]
    fn test_null_output_with_length() {
        let generator = create(RngType::PseudoPhilox4x32_10);
        assert_eq!(
            unsafe { rng_generate_uniform(generator, ptr::null_mut(), 4) },
            Status::OutOfRange
        );
        assert_eq!(
            unsafe { rng_generate_uniform(generator, ptr::null_mut(), 0) },
            Status::Success
        );
        rng_destroy_generator(generator);
    }

    #[test]
    fn test_poisson_and_normal_parameters_forwarded() {
        let generator = create(RngType::PseudoXorwow);
        let mut counts = vec![7u32; 8];
        assert_eq!(
            unsafe { rng_generate_poisson(generator, counts.as_mut_ptr(), counts.len(), 0.0) },
            Status::OutOfRange
        );
        assert_eq!(counts, vec![7u32; 8]);

        let mut normals = vec![0.0f64; 8];
        assert_eq!(
            unsafe {
                rng_generate_normal_double(generator, normals.as_mut_ptr(), normals.len(), 5.0, 0.0)
            },
            Status::Success
        );
        assert!(normals.iter().all(|&x| x == 5.0));
        rng_destroy_generator(generator);
    }

    #[test]
    fn test_quasi_configuration() {
        let generator = create(RngType::QuasiSobol64);
        assert_eq!(
            rng_set_pseudo_random_generator_seed(generator, 1),
            Status::TypeError
        );
        assert_eq!(
            rng_set_quasi_random_generator_dimensions(generator, 2),
            Status::Success
        );
        assert_eq!(
            rng_set_quasi_random_generator_dimensions(generator, 0),
            Status::OutOfRange
        );
        let mut out = vec![0u64; 3];
        assert_eq!(
            unsafe { rng_generate_long_long(generator, out.as_mut_ptr(), out.len()) },
            Status::LengthNotMultiple
        );
        let mut narrow = vec![0u32; 2];
        assert_eq!(
            unsafe { rng_generate(generator, narrow.as_mut_ptr(), narrow.len()) },
            Status::TypeError
        );
        assert_eq!(rng_set_generator_offset(generator, 10), Status::Success);
        rng_destroy_generator(generator);
    }

    #[test]
    fn test_streams() {
        let generator = create(RngType::PseudoXorwow);
        let mut stream = 0u64;
        assert_eq!(unsafe { rng_stream_create(&mut stream, 2) }, Status::Success);
        assert_eq!(rng_set_stream(generator, stream), Status::Success);
        assert_eq!(rng_stream_destroy(stream), Status::Success);

        let mut out = vec![0.0f32; 64];
        assert_eq!(
            unsafe { rng_generate_uniform(generator, out.as_mut_ptr(), out.len()) },
            Status::Success
        );
        assert_eq!(rng_set_stream(generator, stream), Status::NotInitialized);
        assert_eq!(rng_set_stream(generator, 0), Status::Success);
        assert_eq!(rng_stream_destroy(stream), Status::NotInitialized);
        assert_eq!(unsafe { rng_stream_create(ptr::null_mut(), 1) }, Status::OutOfRange);
        rng_destroy_generator(generator);
    }

    #[test]
    fn test_guard_catches_panics() {
        let status = guard(|| panic!("boom"));
        assert_eq!(status, Status::InternalError);
    }
}
