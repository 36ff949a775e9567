//! Deterministic mock source.

use super::{EntropySource, SourceError};

/// Mock source for testing that generates a reproducible byte stream.
///
/// The bytes are NOT unpredictable. The entropy claim is whatever the test
/// asks for, which is exactly the trust model the pool works under.
#[derive(Debug)]
pub struct MockSource {
    name: String,
    state: u64,
    claim_bits_per_byte: u32,
    open: bool,
}

impl MockSource {
    /// Creates an open source claiming `claim_bits_per_byte` per sampled byte.
    pub fn new(name: impl Into<String>, claim_bits_per_byte: u32) -> Self {
        Self::with_seed(name, claim_bits_per_byte, 0x9E37_79B9_7F4A_7C15)
    }

    /// Creates a source whose stream starts from `seed`.
    pub fn with_seed(name: impl Into<String>, claim_bits_per_byte: u32, seed: u64) -> Self {
        Self {
            name: name.into(),
            // xorshift has a fixed point at zero
            state: seed | 1,
            claim_bits_per_byte: claim_bits_per_byte.min(8),
            open: true,
        }
    }

    /// Stops the source; later samples fail.
    pub fn close(&mut self) {
        self.open = false;
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl EntropySource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self, buf: &mut [u8]) -> Result<u32, SourceError> {
        if !self.open {
            return Err(SourceError::NotReady(self.name.clone()));
        }

        for chunk in buf.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }

        let claim = (buf.len() as u64).saturating_mul(u64::from(self.claim_bits_per_byte));
        Ok(u32::try_from(claim).unwrap_or(u32::MAX))
    }
}
