//! Fixed-capacity word ring and its tap-feedback mixer.
//!
//! New words are combined with five taps spread across the ring, rotated
//! by a phase that changes on every wrap, and XORed into the slot under the
//! cursor. Over successive adds a single input bit reaches every word.

use crate::conditioning::PoolHasher;
use zeroize::Zeroize;

/// Number of words in the pool.
pub const POOL_WORDS: usize = 128;

/// Bytes per pool word.
pub const WORD_BYTES: usize = 4;

/// Bits per pool word.
pub const WORD_BITS: u32 = 32;

/// Total pool capacity in bits.
pub const POOL_BITS: u32 = POOL_WORDS as u32 * WORD_BITS;

/// Feedback taps, as offsets from the cursor.
pub const TAPS: [usize; 5] = [99, 59, 31, 9, 7];

/// Rotation advance applied each time the cursor wraps.
pub const ROTATE_STEP: u32 = 7;

/// Words serialized per hasher update when digesting the ring.
const HASH_CHUNK_WORDS: usize = 16;

/// Index into the ring. Only values in `[0, POOL_WORDS)` can be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot(usize);

impl Slot {
    /// Slot `by` positions after this one, wrapping around the ring.
    #[inline]
    pub fn offset(self, by: usize) -> Self {
        Self((self.0 + by % POOL_WORDS) % POOL_WORDS)
    }

    /// Next slot, and whether the move wrapped back to zero.
    #[inline]
    fn advance(self) -> (Self, bool) {
        let next = self.offset(1);
        (next, next.0 == 0)
    }

    /// Raw index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bit rotation phase in `[0, 31]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rotation(u32);

impl Rotation {
    #[inline]
    fn advance(self) -> Self {
        Self((self.0 + ROTATE_STEP) % WORD_BITS)
    }

    /// Current rotation amount in bits.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// The pool's storage and mixer.
///
/// Word contents are wiped when the ring is dropped.
pub struct WordRing {
    words: [u32; POOL_WORDS],
    cursor: Slot,
    rotate: Rotation,
}

impl WordRing {
    /// Creates an all-zero ring with the cursor and rotation at zero.
    pub fn new() -> Self {
        Self {
            words: [0; POOL_WORDS],
            cursor: Slot::default(),
            rotate: Rotation::default(),
        }
    }

    /// Mixes one word into the ring.
    ///
    /// Touches exactly six words: the five taps (read) and the cursor slot
    /// (read and written).
    #[inline]
    pub fn add_word(&mut self, val: u32) {
        let mut mixed = val;
        for tap in TAPS {
            mixed ^= self.words[self.cursor.offset(tap).index()];
        }
        mixed = mixed.rotate_left(self.rotate.bits());
        self.words[self.cursor.index()] ^= mixed;

        let (next, wrapped) = self.cursor.advance();
        self.cursor = next;
        if wrapped {
            self.rotate = self.rotate.advance();
        }
    }

    /// Mixes a byte buffer into the ring, one word at a time.
    ///
    /// Full words are read little-endian. A 1-3 byte tail is packed into one
    /// final word, first byte most significant, and mixed in as well.
    pub fn add_bytes(&mut self, buf: &[u8]) {
        let mut chunks = buf.chunks_exact(WORD_BYTES);
        for chunk in &mut chunks {
            let mut word = [0u8; WORD_BYTES];
            word.copy_from_slice(chunk);
            self.add_word(u32::from_le_bytes(word));
        }

        let tail = chunks.remainder();
        if !tail.is_empty() {
            let val = tail.iter().fold(0u32, |acc, &b| acc << 8 | u32::from(b));
            self.add_word(val);
        }
    }

    /// Feeds the whole ring into `hasher`.
    ///
    /// Words are serialized little-endian through a small stack buffer that
    /// is wiped before returning.
    pub fn digest_into(&self, hasher: &mut dyn PoolHasher) {
        let mut block = [0u8; HASH_CHUNK_WORDS * WORD_BYTES];
        for words in self.words.chunks(HASH_CHUNK_WORDS) {
            let len = words.len() * WORD_BYTES;
            for (dst, word) in block.chunks_exact_mut(WORD_BYTES).zip(words) {
                dst.copy_from_slice(&word.to_le_bytes());
            }
            hasher.update(&block[..len]);
        }
        block.zeroize();
    }

    /// Current cursor position.
    #[inline]
    pub fn cursor(&self) -> Slot {
        self.cursor
    }

    /// Current rotation phase.
    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotate
    }

    #[cfg(test)]
    pub(crate) fn words(&self) -> &[u32; POOL_WORDS] {
        &self.words
    }
}

impl Default for WordRing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WordRing {
    fn drop(&mut self) {
        self.words.zeroize();
    }
}

impl std::fmt::Debug for WordRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordRing")
            .field("cursor", &self.cursor.index())
            .field("rotate", &self.rotate.bits())
            .finish_non_exhaustive()
    }
}
