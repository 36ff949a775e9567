//! Pluggable whitening hashes.
//!
//! The extractor only sees the [`PoolHasher`] trait, so the hash can be
//! swapped without touching mixing or accounting.

use blake3::Hasher as Blake3Hasher;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Largest digest any hasher may produce, in bytes.
pub const MAX_DIGEST_LEN: usize = 64;

/// Supported hash algorithms for whitening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 - fast, secure, recommended default.
    #[default]
    Blake3,
    /// SHA-256 - widely deployed, conservative choice.
    Sha256,
}

impl HashAlgorithm {
    /// Builds a fresh hashing context for this algorithm.
    pub fn hasher(self) -> Box<dyn PoolHasher> {
        match self {
            HashAlgorithm::Blake3 => Box::new(Blake3Whitener::default()),
            HashAlgorithm::Sha256 => Box::new(Sha256Whitener::default()),
        }
    }
}

/// An opaque hashing context used to whiten pool contents.
///
/// `reset` plays the role of init; `finalize_reset` writes the digest and
/// leaves the context ready for reuse, holding no trace of the input.
pub trait PoolHasher: Send {
    /// Digest length in bytes. Never more than [`MAX_DIGEST_LEN`].
    fn output_len(&self) -> usize;

    /// Returns the context to its initial state.
    fn reset(&mut self);

    /// Absorbs `data`.
    fn update(&mut self, data: &[u8]);

    /// Writes the digest into `out` (exactly `output_len()` bytes) and
    /// resets the context.
    fn finalize_reset(&mut self, out: &mut [u8]);
}

/// SHA-256 whitening context.
#[derive(Default)]
pub struct Sha256Whitener {
    inner: Sha256,
}

impl PoolHasher for Sha256Whitener {
    fn output_len(&self) -> usize {
        32
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize_reset(&mut self, out: &mut [u8]) {
        let mut digest = Digest::finalize_reset(&mut self.inner);
        out.copy_from_slice(&digest);
        digest.as_mut_slice().zeroize();
    }
}

/// BLAKE3 whitening context.
#[derive(Default)]
pub struct Blake3Whitener {
    inner: Blake3Hasher,
}

impl PoolHasher for Blake3Whitener {
    fn output_len(&self) -> usize {
        blake3::OUT_LEN
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize_reset(&mut self, out: &mut [u8]) {
        let mut reader = self.inner.finalize_xof();
        reader.fill(out);
        reader.zeroize();

        // Zeroizing also clears the key words, so start over from a fresh context.
        self.inner.zeroize();
        self.inner = Blake3Hasher::new();
    }
}
