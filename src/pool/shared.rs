//! Lock-guarded pool handle.

use super::{EntropyPool, PoolConfig, PoolError, PoolStats, Quality};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Thread-safe handle to one [`EntropyPool`].
///
/// Clones share the same pool. A single mutex covers the whole body of every
/// operation, so no caller ever observes a half-mixed word or a cursor that
/// has not yet advanced.
#[derive(Clone, Default)]
pub struct SharedPool {
    inner: Arc<Mutex<EntropyPool>>,
}

impl SharedPool {
    /// Wraps an existing pool.
    pub fn new(pool: EntropyPool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Creates a zeroed pool from configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        Self::new(EntropyPool::new(config))
    }

    // Every pool operation is infallible and restores the invariants before
    // returning, so a poisoned lock still guards a consistent pool.
    fn lock(&self) -> MutexGuard<'_, EntropyPool> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mixes one word into the pool.
    pub fn add_word(&self, val: u32) {
        self.lock().add_word(val);
    }

    /// Mixes `buf` into the pool and credits `entropy_estimate_bits`.
    pub fn add_bytes(&self, buf: &[u8], entropy_estimate_bits: u32) -> Result<(), PoolError> {
        if buf.is_empty() {
            return Err(PoolError::EmptyBuffer { op: "add_bytes" });
        }
        self.lock().add_bytes(buf, entropy_estimate_bits);
        Ok(())
    }

    /// Current entropy estimate in bits.
    pub fn get_entropy_estimate(&self) -> u32 {
        self.lock().entropy_estimate()
    }

    /// Overwrites the entropy estimate, e.g. after restoring a saved seed.
    pub fn set_entropy_estimate(&self, bits: u32) {
        self.lock().set_entropy_estimate(bits);
    }

    /// Credits `bits` of entropy without mixing any data.
    pub fn increment_entropy(&self, bits: u32) {
        self.lock().increment_entropy(bits);
    }

    /// Fills `buf` with whitened output; see [`EntropyPool::extract`].
    pub fn extract(&self, buf: &mut [u8], quality: Quality) -> Result<usize, PoolError> {
        if buf.is_empty() {
            return Err(PoolError::EmptyBuffer { op: "extract" });
        }
        Ok(self.lock().extract(buf, quality))
    }

    /// Accounting snapshot.
    pub fn stats(&self) -> PoolStats {
        self.lock().stats()
    }

    /// Runs `f` with read access to the pool while holding the lock.
    pub fn with_pool<R>(&self, f: impl FnOnce(&EntropyPool) -> R) -> R {
        f(&self.lock())
    }
}

impl From<EntropyPool> for SharedPool {
    fn from(pool: EntropyPool) -> Self {
        Self::new(pool)
    }
}

impl std::fmt::Debug for SharedPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_pool(|pool| f.debug_tuple("SharedPool").field(pool).finish())
    }
}
