//! Kernel launches.
//!
//! A launch applies a per-item kernel that maps a fixed-width group of raw
//! words to a fixed-width group of outputs. Device launches split the items
//! into blocks and run them with `rayon` on the generator's stream; host
//! launches run the same kernel sequentially. Because every item depends
//! only on its own raw words, both residencies write identical output.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use rng_core::{Residency, Result, RngError};

use crate::stream::Stream;

/// Items per parallel task.
const BLOCK_ITEMS: usize = 4096;

/// Execution policy of one generation call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Launch<'a> {
    residency: Residency,
    stream: Option<&'a Stream>,
}

impl<'a> Launch<'a> {
    pub(crate) fn new(residency: Residency, stream: Option<&'a Stream>) -> Self {
        Self { residency, stream }
    }

    /// Applies `kernel` item by item.
    ///
    /// Item `i` reads `src[i * src_width..][..src_width]` and writes
    /// `dst[i * dst_width..][..dst_width]`; the last output item may be
    /// shorter than `dst_width`. `src` must hold one full group per item.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::LaunchFailure`] if the kernel panics.
    pub(crate) fn map<S, D, K>(
        &self,
        src: &[S],
        src_width: usize,
        dst: &mut [D],
        dst_width: usize,
        kernel: K,
    ) -> Result<()>
    where
        S: Sync,
        D: Send,
        K: Fn(&[S], &mut [D]) + Sync + Send,
    {
        if dst.is_empty() {
            return Ok(());
        }
        let items = dst.len().div_ceil(dst_width);
        if src.len() < items * src_width {
            return Err(RngError::Internal(format!(
                "launch needs {} source words, got {}",
                items * src_width,
                src.len()
            )));
        }

        let residency = self.residency;
        let stream = self.stream;
        tracing::trace!(%residency, items, stream = stream.map(Stream::id), "launch");

        let run = || match residency {
            Residency::Host => run_items(src, src_width, dst, dst_width, &kernel),
            Residency::Device => {
                let mut parallel = || {
                    dst.par_chunks_mut(dst_width * BLOCK_ITEMS)
                        .zip(src.par_chunks(src_width * BLOCK_ITEMS))
                        .for_each(|(d, s)| run_items(s, src_width, d, dst_width, &kernel))
                };
                match stream {
                    Some(stream) => stream.install(parallel),
                    None => parallel(),
                }
            }
        };

        panic::catch_unwind(AssertUnwindSafe(run)).map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "kernel panicked".to_owned());
            RngError::LaunchFailure(message)
        })
    }
}

#[inline]
fn run_items<S, D, K>(src: &[S], src_width: usize, dst: &mut [D], dst_width: usize, kernel: &K)
where
    K: Fn(&[S], &mut [D]),
{
    for (d, s) in dst.chunks_mut(dst_width).zip(src.chunks(src_width)) {
        kernel(s, d);
    }
}

/// Starts the default device pool if needed and returns its thread count.
///
/// # Errors
///
/// Returns [`RngError::InitializationFailed`] if the pool cannot be started.
pub(crate) fn prepare_device() -> Result<usize> {
    prepare_with(rayon::current_num_threads)
}

fn prepare_with<F: FnOnce() -> usize>(start: F) -> Result<usize> {
    match panic::catch_unwind(AssertUnwindSafe(start)) {
        Ok(0) => Err(RngError::InitializationFailed(
            "device pool has no worker threads".to_owned(),
        )),
        Ok(threads) => Ok(threads),
        Err(_) => Err(RngError::InitializationFailed(
            "device pool could not be started".to_owned(),
        )),
    }
}

/// Reserves a zeroed scratch buffer of `len` elements.
///
/// # Errors
///
/// Returns [`RngError::AllocationFailed`] if the memory cannot be reserved.
pub(crate) fn scratch<T: Default + Clone>(len: usize) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|e| {
        RngError::AllocationFailed(format!("scratch buffer of {} elements: {}", len, e))
    })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}
