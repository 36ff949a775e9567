//! Entropy source abstraction.
//!
//! Sources are external collaborators: they produce raw bytes and their own
//! claim of how much entropy those bytes carry. The pool never checks that
//! claim. This module defines the interface sources implement and a helper
//! that moves their samples into a [`SharedPool`].

mod mock;

pub use mock::MockSource;

use crate::pool::{PoolError, SharedPool};
use thiserror::Error;

/// Errors that can occur while sampling a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source is closed or not yet initialized.
    #[error("source not ready: {0}")]
    NotReady(String),
    /// The source failed while producing a sample.
    #[error("failed to sample source: {0}")]
    SampleFailed(String),
    /// The pool refused the sample.
    #[error("pool rejected sample: {0}")]
    Pool(#[from] PoolError),
}

/// Trait for entropy source implementations.
///
/// Implementations may be hardware samplers, timing collectors, or mocks for
/// testing.
pub trait EntropySource {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fills `buf` with raw sample bytes.
    ///
    /// Returns the source's own estimate of the entropy, in bits, contained
    /// in the bytes written.
    fn sample(&mut self, buf: &mut [u8]) -> Result<u32, SourceError>;
}

/// Pulls `rounds` samples of `chunk` bytes from `source` into `pool`.
///
/// Returns the total entropy claimed by the source. Stops at the first
/// source failure.
pub fn harvest(
    source: &mut dyn EntropySource,
    pool: &SharedPool,
    rounds: u32,
    chunk: usize,
) -> Result<u64, SourceError> {
    let mut buf = vec![0u8; chunk];
    let mut claimed = 0u64;

    for _ in 0..rounds {
        let bits = source.sample(&mut buf)?;
        pool.add_bytes(&buf, bits)?;
        claimed += u64::from(bits);
    }

    tracing::debug!(
        source = source.name(),
        rounds,
        chunk,
        claimed_bits = claimed,
        "Harvested source"
    );

    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_credits_claims() {
        let pool = SharedPool::default();
        let mut source = MockSource::new("mock", 2);

        let claimed = harvest(&mut source, &pool, 10, 8).unwrap();
        assert_eq!(claimed, 10 * 8 * 2);
        assert_eq!(pool.get_entropy_estimate(), 160);
        assert_eq!(pool.with_pool(|p| p.cursor()), 20);
    }

    #[test]
    fn test_harvest_rejects_empty_chunk() {
        let pool = SharedPool::default();
        let mut source = MockSource::new("mock", 1);

        assert!(matches!(
            harvest(&mut source, &pool, 1, 0),
            Err(SourceError::Pool(PoolError::EmptyBuffer { .. }))
        ));
    }

    #[test]
    fn test_harvest_stops_on_source_failure() {
        let pool = SharedPool::default();
        let mut source = MockSource::new("mock", 1);
        source.close();

        assert!(matches!(
            harvest(&mut source, &pool, 3, 4),
            Err(SourceError::NotReady(_))
        ));
        assert_eq!(pool.with_pool(|p| p.cursor()), 0);
    }
}
