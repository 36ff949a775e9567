//! Entropy accumulation pool.
//!
//! The pool is a fixed ring of words that absorbs caller data through a
//! tap-feedback mixer, an entropy counter describing how much of that content
//! is believed unpredictable, and a hash-based extractor that whitens the
//! ring into output bytes.
//!
//! [`EntropyPool`] is the unlocked core: every method takes `&mut self` and
//! leaves the pool within its invariants. Concurrent callers go through
//! [`SharedPool`], which serializes every operation behind one lock.

mod accountant;
mod extract;
mod ring;
mod shared;

pub use accountant::{EntropyAccount, PoolStats};
pub use extract::{Quality, Whitening};
pub use ring::{Rotation, Slot, WordRing, POOL_BITS, POOL_WORDS, ROTATE_STEP, TAPS, WORD_BITS, WORD_BYTES};
pub use shared::SharedPool;

use crate::conditioning::{HashAlgorithm, PoolHasher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of bytes worth of entropy a `Good` extraction step needs.
pub const DEFAULT_THRESHOLD_BYTES: u32 = 10;

/// Errors reported at the pool's API edge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// A zero-length buffer was passed where data is required.
    #[error("{op}: buffer must not be empty")]
    EmptyBuffer {
        /// Operation that rejected the buffer.
        op: &'static str,
    },
    /// A custom hasher's digest width cannot be folded back into pool words.
    #[error("unsupported digest length {len}: must be a non-zero multiple of 4, at most 64 bytes")]
    UnsupportedDigest {
        /// Digest width in bytes.
        len: usize,
    },
}

/// Configuration for the entropy pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Hash algorithm for whitening.
    pub algorithm: HashAlgorithm,
    /// XOR the two digest halves together before delivering output.
    pub fold_digest: bool,
    /// Bytes worth of entropy a `Good` extraction step requires.
    pub good_threshold_bytes: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Blake3,
            fold_digest: true,
            good_threshold_bytes: DEFAULT_THRESHOLD_BYTES,
        }
    }
}

/// The entropy pool.
pub struct EntropyPool {
    ring: WordRing,
    account: EntropyAccount,
    hasher: Box<dyn PoolHasher>,
    whitening: Whitening,
    threshold_bits: u32,
    extractions: u64,
}

impl EntropyPool {
    /// Creates a zeroed pool with the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        let hasher = config.algorithm.hasher();
        // Built-in hashers all produce 32-byte digests.
        let whitening = Whitening::derive(hasher.output_len(), config.fold_digest);
        Self::assemble(hasher, whitening, config.good_threshold_bytes)
    }

    /// Creates a zeroed pool whitening through a caller-supplied hasher.
    pub fn with_hasher(
        hasher: Box<dyn PoolHasher>,
        fold_digest: bool,
        good_threshold_bytes: u32,
    ) -> Result<Self, PoolError> {
        let whitening = Whitening::for_digest(hasher.output_len(), fold_digest)?;
        Ok(Self::assemble(hasher, whitening, good_threshold_bytes))
    }

    fn assemble(hasher: Box<dyn PoolHasher>, whitening: Whitening, threshold_bytes: u32) -> Self {
        Self {
            ring: WordRing::new(),
            account: EntropyAccount::default(),
            hasher,
            whitening,
            threshold_bits: threshold_bytes.saturating_mul(8).min(POOL_BITS),
            extractions: 0,
        }
    }

    /// Mixes one word into the pool without crediting entropy.
    #[inline]
    pub fn add_word(&mut self, val: u32) {
        self.ring.add_word(val);
    }

    /// Mixes `buf` into the pool and credits the caller's entropy claim.
    ///
    /// The claim is trusted; it is only clamped to pool capacity.
    pub fn add_bytes(&mut self, buf: &[u8], entropy_estimate_bits: u32) {
        self.ring.add_bytes(buf);

        if entropy_estimate_bits > 0 {
            self.increment_entropy(entropy_estimate_bits);
        }

        tracing::trace!(
            bytes_added = buf.len(),
            claimed_bits = entropy_estimate_bits,
            entropy_bits = self.account.get(),
            "Added data to pool"
        );
    }

    /// Current entropy estimate in bits.
    #[inline]
    pub fn entropy_estimate(&self) -> u32 {
        self.account.get()
    }

    /// Overwrites the entropy estimate, clamped to pool capacity.
    pub fn set_entropy_estimate(&mut self, bits: u32) {
        self.account.set(bits);
        tracing::debug!(entropy_bits = self.account.get(), "Entropy estimate set");
    }

    /// Credits `bits` of entropy, clamped to pool capacity.
    pub fn increment_entropy(&mut self, bits: u32) {
        let discarded = self.account.increment(bits);
        if discarded > 0 {
            tracing::warn!(
                discarded_bits = discarded,
                pool_bits = POOL_BITS,
                "Pool full, entropy credit discarded"
            );
        }
    }

    /// Returns a snapshot of the pool's accounting.
    pub fn stats(&self) -> PoolStats {
        self.account.snapshot(self.threshold_bits, self.extractions)
    }

    /// Current cursor position in `[0, POOL_WORDS)`.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.ring.cursor().index()
    }

    /// Current rotation phase in `[0, 31]`.
    #[inline]
    pub fn rotation(&self) -> u32 {
        self.ring.rotation().bits()
    }

    /// Extraction geometry derived from the hasher.
    #[inline]
    pub fn whitening(&self) -> Whitening {
        self.whitening
    }
}

impl Default for EntropyPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl std::fmt::Debug for EntropyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyPool")
            .field("ring", &self.ring)
            .field("entropy_bits", &self.account.get())
            .field("whitening", &self.whitening)
            .finish_non_exhaustive()
    }
}
