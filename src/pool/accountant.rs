//! Conservative entropy accounting.
//!
//! Callers claim how many bits of entropy their bytes carry. Those claims are
//! trusted as given: nothing here tries to measure input quality. The only
//! protection is the capacity clamp, so the pool is never credited with more
//! unpredictability than it can physically hold.

use super::ring::POOL_BITS;
use serde::{Deserialize, Serialize};

/// Point-in-time view of the pool's accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Pool capacity in bits.
    pub pool_bits: u32,
    /// Entropy bits required before a `Good` extraction step may run.
    pub threshold_bits: u32,
    /// Current entropy estimate in bits.
    pub current: u32,
    /// Total bits ever credited by callers, before clamping.
    pub added: u64,
    /// Credited bits dropped because the pool was full.
    pub discarded: u64,
    /// Bits debited by extraction.
    pub removed: u64,
    /// Output bits delivered with no entropy backing them.
    pub generated: u64,
    /// Extraction calls that produced at least one byte.
    pub extractions: u64,
}

/// Saturating entropy counter plus running totals.
#[derive(Debug, Clone, Default)]
pub struct EntropyAccount {
    bits: u32,
    added: u64,
    discarded: u64,
    removed: u64,
    generated: u64,
}

impl EntropyAccount {
    /// Current estimate in bits.
    #[inline]
    pub fn get(&self) -> u32 {
        self.bits
    }

    /// Overwrites the estimate, clamped to pool capacity.
    pub fn set(&mut self, bits: u32) {
        self.bits = bits.min(POOL_BITS);
    }

    /// Credits `delta` bits, clamped to pool capacity.
    ///
    /// Returns the number of bits that did not fit.
    pub fn increment(&mut self, delta: u32) -> u32 {
        self.added += u64::from(delta);

        let total = self.bits.saturating_add(delta);
        let overflow = total.saturating_sub(POOL_BITS);
        self.bits = total.min(POOL_BITS);
        self.discarded += u64::from(overflow);

        overflow
    }

    /// Debits `8 * bytes`, floored at zero.
    ///
    /// Bits delivered beyond the estimate are counted as generated.
    pub fn debit_bytes(&mut self, bytes: usize) {
        let wanted = (bytes as u64).saturating_mul(8);
        let taken = wanted.min(u64::from(self.bits));

        // taken <= self.bits, so it fits in u32.
        self.bits -= taken as u32;
        self.removed += taken;
        self.generated += wanted - taken;
    }

    pub(crate) fn snapshot(&self, threshold_bits: u32, extractions: u64) -> PoolStats {
        PoolStats {
            pool_bits: POOL_BITS,
            threshold_bits,
            current: self.bits,
            added: self.added,
            discarded: self.discarded,
            removed: self.removed,
            generated: self.generated,
            extractions,
        }
    }
}
