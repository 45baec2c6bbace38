//! Process-wide handle tables.
//!
//! Generators and streams are owned here and addressed by non-zero
//! identifiers. Identifiers come from a monotonically increasing counter and
//! are never reused, so a destroyed handle stays detectable.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use rng_core::{Result, RngError};

use crate::generator::Generator;
use crate::stream::Stream;

/// Opaque handle to a generator owned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorHandle(NonZeroU64);

impl GeneratorHandle {
    /// Returns the raw identifier passed across the C ABI.
    pub fn id(self) -> u64 {
        self.0.get()
    }

    /// Wraps a raw identifier; `None` for the null handle.
    pub fn from_raw(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(Self)
    }
}

impl fmt::Display for GeneratorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generator#{}", self.0)
    }
}

type Shared = Arc<Mutex<Generator>>;

struct Registry {
    next_id: AtomicU64,
    generators: Mutex<HashMap<u64, Shared>>,
    streams: Mutex<HashMap<u64, Stream>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry {
        next_id: AtomicU64::new(1),
        generators: Mutex::new(HashMap::new()),
        streams: Mutex::new(HashMap::new()),
    })
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| RngError::Internal("registry lock poisoned".to_owned()))
}

/// Takes ownership of `generator` and returns its handle.
pub(crate) fn insert(generator: Generator) -> Result<GeneratorHandle> {
    let registry = registry();
    let mut generators = lock(&registry.generators)?;
    generators
        .try_reserve(1)
        .map_err(|e| RngError::AllocationFailed(format!("generator table: {}", e)))?;

    let id = registry.next_id.fetch_add(1, Ordering::Relaxed);
    let handle = GeneratorHandle::from_raw(id)
        .ok_or_else(|| RngError::Internal("handle space exhausted".to_owned()))?;
    generators.insert(id, Arc::new(Mutex::new(generator)));
    Ok(handle)
}

/// Drops the generator behind `handle`.
pub(crate) fn remove(handle: GeneratorHandle) -> Result<()> {
    lock(&registry().generators)?
        .remove(&handle.id())
        .map(drop)
        .ok_or(RngError::NotInitialized)
}

/// Runs `op` with exclusive access to the generator behind `handle`.
///
/// The table lock is released before `op` runs, so distinct handles can be
/// used concurrently.
pub(crate) fn with_generator<T>(
    handle: GeneratorHandle,
    op: impl FnOnce(&mut Generator) -> Result<T>,
) -> Result<T> {
    let shared = lock(&registry().generators)?
        .get(&handle.id())
        .cloned()
        .ok_or(RngError::NotInitialized)?;
    let mut generator = lock(&shared)?;
    op(&mut generator)
}

/// Registers `stream` for lookup by identifier.
pub(crate) fn insert_stream(stream: Stream) -> Result<u64> {
    let mut streams = lock(&registry().streams)?;
    streams
        .try_reserve(1)
        .map_err(|e| RngError::AllocationFailed(format!("stream table: {}", e)))?;
    let id = stream.id();
    streams.insert(id, stream);
    Ok(id)
}

/// Looks up a registered stream.
pub(crate) fn stream(id: u64) -> Result<Stream> {
    lock(&registry().streams)?
        .get(&id)
        .cloned()
        .ok_or(RngError::NotInitialized)
}

/// Unregisters a stream. Generators still bound to it keep it alive.
pub(crate) fn remove_stream(id: u64) -> Result<()> {
    lock(&registry().streams)?
        .remove(&id)
        .map(drop)
        .ok_or(RngError::NotInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rng_core::{Residency, RngType};

    fn generator() -> Generator {
        Generator::new(RngType::PseudoPhilox4x32_10, Residency::Host).unwrap()
    }

    #[test]
    fn test_handles_are_unique_and_non_null() {
        let a = insert(generator()).unwrap();
        let b = insert(generator()).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.id(), 0);
        remove(a).unwrap();
        remove(b).unwrap();
    }

    #[test]
    fn test_removed_handle_is_not_initialised() {
        let handle = insert(generator()).unwrap();
        remove(handle).unwrap();
        assert_eq!(remove(handle), Err(RngError::NotInitialized));
        assert_eq!(
            with_generator(handle, |_| Ok(())),
            Err(RngError::NotInitialized)
        );
    }

    #[test]
    fn test_from_raw_rejects_null() {
        assert!(GeneratorHandle::from_raw(0).is_none());
        assert_eq!(GeneratorHandle::from_raw(7).map(GeneratorHandle::id), Some(7));
    }

    #[test]
    fn test_stream_table() {
        let id = insert_stream(Stream::new(1).unwrap()).unwrap();
        assert_eq!(stream(id).unwrap().id(), id);
        remove_stream(id).unwrap();
        assert!(matches!(stream(id), Err(RngError::NotInitialized)));
        assert!(matches!(remove_stream(id), Err(RngError::NotInitialized)));
    }
}
