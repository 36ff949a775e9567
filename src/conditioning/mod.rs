//! Entropy whitening via cryptographic hashing.
//!
//! The pool never hands its raw words to a caller. Every extracted byte
//! comes out of a hash over the whole pool, computed through the
//! [`PoolHasher`] interface defined here.

mod hash;

pub use hash::{
    Blake3Whitener, HashAlgorithm, PoolHasher, Sha256Whitener, MAX_DIGEST_LEN,
};
