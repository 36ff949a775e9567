//! ChaCha-based CSPRNG reseeded from the entropy pool.
//!
//! # Reseeding Model
//!
//! Reseeding uses BLAKE3 to mix:
//! - Previous seed material (retained across reseeds)
//! - Fresh `Good` output from the pool
//! - A domain separator and reseed counter
//!
//! The pool decides whether it can back the request. A short `Good`
//! extraction is surfaced as [`ReseedingError::InsufficientEntropy`] and
//! leaves the generator untouched.

use crate::pool::{PoolError, Quality, SharedPool};
use blake3::Hasher;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

/// Domain separator for reseeding operations.
const RESEED_DOMAIN: &[u8] = b"rndpool-reseed-v1";

/// Bytes drawn from the pool per reseed.
pub const SEED_LEN: usize = 32;

/// Errors that can occur during reseeding.
#[derive(Debug, Error)]
pub enum ReseedingError {
    /// The pool could not back the requested output.
    #[error("insufficient entropy: got {got} bits, need {need} bits")]
    InsufficientEntropy {
        /// Bits the pool delivered.
        got: usize,
        /// Bits the reseed required.
        need: usize,
    },
    /// The pool rejected the extraction call.
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),
}

/// A reseedable CSPRNG backed by ChaCha20.
///
/// # Security Model
///
/// - Initial seed comes from OS entropy
/// - Pool output is mixed in via BLAKE3, never used as the key directly
/// - Previous seed material is retained and mixed with new output
pub struct ReseedableRng {
    inner: ChaCha20Rng,
    /// Retained seed material for mixing during reseed.
    /// This is NOT the ChaCha internal state.
    seed_material: Zeroizing<[u8; 32]>,
    /// Minimum pool output, in bits, a reseed must obtain.
    min_entropy_bits: usize,
    reseed_count: u64,
    bytes_since_reseed: u64,
}

impl ReseedableRng {
    /// Creates a new CSPRNG seeded from the OS entropy source.
    pub fn from_os_entropy() -> Self {
        let mut seed_material = Zeroizing::new([0u8; 32]);
        rand_core::OsRng.fill_bytes(&mut seed_material[..]);
        Self::from_material(seed_material, 128)
    }

    /// Creates a CSPRNG with a specific minimum entropy requirement,
    /// capped at [`SEED_LEN`] bytes.
    pub fn with_min_entropy(min_entropy_bits: usize) -> Self {
        Self {
            min_entropy_bits: min_entropy_bits.min(SEED_LEN * 8),
            ..Self::from_os_entropy()
        }
    }

    fn from_material(seed_material: Zeroizing<[u8; 32]>, min_entropy_bits: usize) -> Self {
        Self {
            inner: ChaCha20Rng::from_seed(*seed_material),
            seed_material,
            min_entropy_bits,
            reseed_count: 0,
            bytes_since_reseed: 0,
        }
    }

    /// Creates a CSPRNG from a known seed (for testing only).
    #[cfg(test)]
    pub(crate) fn from_seed_for_testing(seed: [u8; 32]) -> Self {
        Self::from_material(Zeroizing::new(seed), 128)
    }

    /// Reseeds from the pool using a `Good` extraction.
    ///
    /// Requests `min_entropy_bits / 8` bytes, rounded up, at least one byte.
    /// If the pool cannot back that many, the partial output is discarded
    /// and the generator is left unchanged.
    pub fn reseed_from_pool(&mut self, pool: &SharedPool) -> Result<(), ReseedingError> {
        let wanted = self.min_entropy_bits.div_ceil(8).clamp(1, SEED_LEN);
        let mut fresh = Zeroizing::new([0u8; SEED_LEN]);

        let produced = pool.extract(&mut fresh[..wanted], Quality::Good)?;
        if produced < wanted {
            tracing::debug!(
                produced,
                wanted,
                entropy_bits = pool.get_entropy_estimate(),
                "Pool could not back reseed"
            );
            return Err(ReseedingError::InsufficientEntropy {
                got: produced * 8,
                need: wanted * 8,
            });
        }

        self.reseed(&fresh[..produced]);
        Ok(())
    }

    /// Mixes `fresh` into the seed material and rekeys.
    ///
    /// new_seed = BLAKE3(domain || counter || old_seed_material || fresh)
    fn reseed(&mut self, fresh: &[u8]) {
        let mut hasher = Hasher::new();
        hasher.update(RESEED_DOMAIN);
        hasher.update(&self.reseed_count.to_le_bytes());
        hasher.update(&self.seed_material[..]);
        hasher.update(fresh);

        let mut reader = hasher.finalize_xof();
        reader.fill(&mut self.seed_material[..]);
        reader.zeroize();
        hasher.zeroize();

        self.inner = ChaCha20Rng::from_seed(*self.seed_material);
        self.reseed_count += 1;
        self.bytes_since_reseed = 0;

        tracing::info!(
            reseed_count = self.reseed_count,
            fresh_bytes = fresh.len(),
            "CSPRNG reseeded via BLAKE3 mixing"
        );
    }

    /// Returns the number of reseeds performed.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_count
    }

    /// Returns bytes generated since last reseed.
    pub fn bytes_since_reseed(&self) -> u64 {
        self.bytes_since_reseed
    }
}

// Word draws route through `fill_bytes` so the byte count has one writer.
impl RngCore for ReseedableRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.bytes_since_reseed = self.bytes_since_reseed.saturating_add(dest.len() as u64);
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
