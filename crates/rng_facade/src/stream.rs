//! Execution streams.
//!
//! A [`Stream`] is a dedicated `rayon` thread pool. Device generators launch
//! their transform stage on the stream they are bound to, or on the global
//! pool when no stream is set.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use rng_core::{Result, RngError};

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// An execution-ordering context for device launches.
///
/// Cloning a stream shares the underlying pool.
///
/// # Examples
///
/// ```rust
/// use rng_facade::Stream;
///
/// let stream = Stream::new(2).unwrap();
/// assert_eq!(stream.threads(), 2);
/// assert_ne!(stream.id(), 0);
/// ```
#[derive(Clone)]
pub struct Stream {
    id: u64,
    pool: Arc<ThreadPool>,
}

impl Stream {
    /// Creates a stream backed by a pool of `threads` workers.
    ///
    /// `threads == 0` lets `rayon` choose the worker count.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::InitializationFailed`] if the pool cannot be built.
    pub fn new(threads: usize) -> Result<Self> {
        let id = NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |index| format!("rng-stream-{}-{}", id, index))
            .build()
            .map_err(|e| RngError::InitializationFailed(format!("stream pool: {}", e)))?;

        tracing::debug!(stream = id, threads = pool.current_num_threads(), "stream created");
        Ok(Self {
            id,
            pool: Arc::new(pool),
        })
    }

    /// Returns the process-unique, non-zero stream identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` inside this stream's pool.
    pub(crate) fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.id)
            .field("threads", &self.threads())
            .finish()
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Stream {}
