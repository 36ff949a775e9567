//! Hash-whitened extraction.
//!
//! Each step hashes the whole ring, stirs the digest back in, and hands out
//! part of the digest. Stirring makes back-to-back extractions differ even
//! with no new input, and keeps earlier pool states out of reach of anyone
//! who only sees later output.

use super::ring::WORD_BYTES;
use super::{EntropyPool, PoolError};
use crate::conditioning::MAX_DIGEST_LEN;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Extraction quality policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Produce the full request whatever the entropy estimate.
    Any,
    /// Stop as soon as the estimate cannot back the next step.
    Good,
}

/// Extraction geometry for one hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Whitening {
    /// Digest width in bytes.
    pub digest_len: usize,
    /// Pool words re-mixed from each digest (`digest_len / WORD_BYTES`).
    pub remix_words: usize,
    /// Output bytes delivered per step.
    pub block_len: usize,
    /// Whether the digest is folded in half before delivery.
    pub fold: bool,
}

impl Whitening {
    /// Validates a digest width and derives the geometry for it.
    pub fn for_digest(digest_len: usize, fold: bool) -> Result<Self, PoolError> {
        if digest_len == 0 || digest_len % WORD_BYTES != 0 || digest_len > MAX_DIGEST_LEN {
            return Err(PoolError::UnsupportedDigest { len: digest_len });
        }
        Ok(Self::derive(digest_len, fold))
    }

    pub(super) fn derive(digest_len: usize, fold: bool) -> Self {
        Self {
            digest_len,
            remix_words: digest_len / WORD_BYTES,
            block_len: if fold { digest_len / 2 } else { digest_len },
            fold,
        }
    }
}

impl EntropyPool {
    /// Fills `out` with whitened pool output.
    ///
    /// Returns the number of bytes produced. With [`Quality::Any`] that is
    /// always `out.len()`. With [`Quality::Good`] extraction stops before any
    /// step whose pre-delivery estimate is below the per-step threshold or
    /// below the bits that step would deliver, so the count may be short,
    /// including zero. A short count is policy, not an error.
    ///
    /// The estimate drops by exactly eight bits per delivered byte, floored
    /// at zero.
    pub fn extract(&mut self, out: &mut [u8], quality: Quality) -> usize {
        let mut digest = Zeroizing::new([0u8; MAX_DIGEST_LEN]);
        let digest_len = self.whitening.digest_len;
        let mut produced = 0;

        while produced < out.len() {
            let count = (out.len() - produced).min(self.whitening.block_len);

            if quality == Quality::Good && !self.can_back(count) {
                tracing::debug!(
                    requested = out.len(),
                    produced,
                    entropy_bits = self.account.get(),
                    threshold_bits = self.threshold_bits,
                    "Good extraction stopped short"
                );
                break;
            }

            let block = self.whiten(&mut digest[..digest_len]);
            out[produced..produced + count].copy_from_slice(&block[..count]);

            self.account.debit_bytes(count);
            produced += count;
        }

        self.hasher.reset();
        if produced > 0 {
            self.extractions += 1;
        }

        tracing::debug!(
            requested = out.len(),
            produced,
            ?quality,
            entropy_bits = self.account.get(),
            "Extracted whitened output"
        );

        produced
    }

    /// Whether the current estimate may back a step delivering `count` bytes.
    fn can_back(&self, count: usize) -> bool {
        let available = self.account.get();
        available >= self.threshold_bits && u64::from(available) >= count as u64 * 8
    }

    /// Hashes the ring into `digest`, stirs the digest back in, and returns
    /// the deliverable block.
    fn whiten<'a>(&mut self, digest: &'a mut [u8]) -> &'a [u8] {
        self.hasher.reset();
        self.ring.digest_into(&mut *self.hasher);
        self.hasher.finalize_reset(digest);

        self.ring
            .add_bytes(&digest[..self.whitening.remix_words * WORD_BYTES]);

        if self.whitening.fold {
            let (low, high) = digest.split_at_mut(self.whitening.digest_len / 2);
            for (a, b) in low.iter_mut().zip(high.iter()) {
                *a ^= *b;
            }
        }

        &digest[..self.whitening.block_len]
    }
}

#[cfg(test)]
mod tests {
    use super::super::{PoolConfig, POOL_BITS};
    use super::*;
    use crate::conditioning::HashAlgorithm;

    fn seeded_pool(config: PoolConfig, claim: u32) -> EntropyPool {
        let mut pool = EntropyPool::new(config);
        let data: Vec<u8> = (0..64u32).map(|i| (i * 37 + 11) as u8).collect();
        pool.add_bytes(&data, claim);
        pool
    }

    #[test]
    fn test_any_after_credit_drains_estimate() {
        let mut pool = EntropyPool::default();
        pool.add_bytes(&[0x5A; 16], 32);
        assert_eq!(pool.entropy_estimate(), 32);

        let mut out = [0u8; 4];
        assert_eq!(pool.extract(&mut out, Quality::Any), 4);
        assert_eq!(pool.entropy_estimate(), 0);
    }

    #[test]
    fn test_good_on_fresh_pool_produces_nothing() {
        let mut pool = EntropyPool::default();
        let mut out = [0u8; 16];

        assert_eq!(pool.extract(&mut out, Quality::Good), 0);
        assert_eq!(pool.entropy_estimate(), 0);
        assert_eq!(out, [0u8; 16]);
        // No step ran, so nothing was stirred back.
        assert_eq!(pool.cursor(), 0);
        assert_eq!(pool.stats().extractions, 0);
    }

    #[test]
    fn test_back_to_back_extractions_differ() {
        let mut pool = seeded_pool(PoolConfig::default(), 0);
        let mut first = [0u8; 48];
        let mut second = [0u8; 48];

        pool.extract(&mut first, Quality::Any);
        pool.extract(&mut second, Quality::Any);

        assert_ne!(first, second);
    }

    #[test]
    fn test_any_debits_exactly() {
        let mut pool = seeded_pool(PoolConfig::default(), 1000);
        let mut out = [0u8; 37];

        assert_eq!(pool.extract(&mut out, Quality::Any), 37);
        assert_eq!(pool.entropy_estimate(), 1000 - 37 * 8);
    }

    #[test]
    fn test_any_ignores_empty_estimate() {
        let mut pool = EntropyPool::default();
        let mut out = [0u8; 100];

        assert_eq!(pool.extract(&mut out, Quality::Any), 100);
        assert_eq!(pool.entropy_estimate(), 0);
        assert_eq!(pool.stats().generated, 800);
    }

    #[test]
    fn test_good_stops_short_when_underfunded() {
        // 100 bits clears the 80-bit threshold but cannot back a 16-byte step.
        let mut pool = seeded_pool(PoolConfig::default(), 100);
        let mut out = [0u8; 32];

        let produced = pool.extract(&mut out, Quality::Good);
        assert!(produced < 32);
        assert_eq!(pool.entropy_estimate(), 100 - produced as u32 * 8);
    }

    #[test]
    fn test_good_delivers_partial_when_partially_funded() {
        // 200 bits backs one 16-byte step (128 bits), leaving 72 < 80.
        let mut pool = seeded_pool(PoolConfig::default(), 200);
        let mut out = [0u8; 64];

        assert_eq!(pool.extract(&mut out, Quality::Good), 16);
        assert_eq!(pool.entropy_estimate(), 72);
        assert_eq!(pool.stats().generated, 0);
    }

    #[test]
    fn test_good_fully_funded_request() {
        let mut pool = seeded_pool(PoolConfig::default(), POOL_BITS);
        let mut out = [0u8; 64];

        assert_eq!(pool.extract(&mut out, Quality::Good), 64);
        assert_eq!(pool.entropy_estimate(), POOL_BITS - 512);
    }

    #[test]
    fn test_good_respects_threshold_for_small_requests() {
        // 40 bits would cover a 2-byte request but is under the 80-bit threshold.
        let mut pool = seeded_pool(PoolConfig::default(), 40);
        let mut out = [0u8; 2];

        assert_eq!(pool.extract(&mut out, Quality::Good), 0);
        assert_eq!(pool.entropy_estimate(), 40);
    }

    #[test]
    fn test_unfolded_blocks_are_full_digest() {
        let config = PoolConfig {
            algorithm: HashAlgorithm::Sha256,
            fold_digest: false,
            ..Default::default()
        };
        let mut pool = seeded_pool(config, 0);
        let mut out = [0u8; 40];

        pool.extract(&mut out, Quality::Any);
        // Two steps, each stirring eight digest words back in.
        assert_eq!(pool.cursor(), 16 + 2 * 8);
    }

    #[test]
    fn test_extraction_stirs_remix_words() {
        let mut pool = seeded_pool(PoolConfig::default(), 0);
        let before = pool.cursor();
        let mut out = [0u8; 16];

        pool.extract(&mut out, Quality::Any);
        assert_eq!(pool.cursor(), before + pool.whitening().remix_words);
    }

    #[test]
    fn test_empty_output_is_noop() {
        let mut pool = seeded_pool(PoolConfig::default(), 64);
        let mut out = [0u8; 0];

        assert_eq!(pool.extract(&mut out, Quality::Any), 0);
        assert_eq!(pool.entropy_estimate(), 64);
        assert_eq!(pool.stats().extractions, 0);
    }

    #[test]
    fn test_rejects_odd_digest_width() {
        assert!(matches!(
            Whitening::for_digest(30, true),
            Err(PoolError::UnsupportedDigest { len: 30 })
        ));
        assert!(Whitening::for_digest(0, false).is_err());
        assert!(Whitening::for_digest(128, false).is_err());
        assert_eq!(Whitening::for_digest(20, true).unwrap().block_len, 10);
    }
}
