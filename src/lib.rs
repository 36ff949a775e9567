//! Entropy Accumulation Pool
//!
//! A kernel-style entropy pool that collects unpredictable bits from many
//! asynchronous sources of unknown quality and hands out whitened output,
//! gated on how much entropy it believes it holds, to seed a system RNG.
//!
//! # Architecture
//!
//! ```text
//! sources ──add_bytes──▶ ring mixer ──▶ accountant
//!                            │              │
//!                            ▼              ▼
//!                      hash whitening ◀── quality gate ──extract──▶ reseeding
//! ```
//!
//! # Design Principles
//!
//! - **Trusted claims**: callers state how much entropy their bytes carry;
//!   the pool only clamps the claim to its capacity
//! - **Short, not failed**: a `Good` extraction that cannot be backed returns
//!   fewer bytes instead of an error
//! - **Stir after every digest**: extraction feeds its own digest back into
//!   the pool, so repeated reads never repeat
//! - **One lock**: every operation is atomic behind [`SharedPool`]
//!
//! # Example
//!
//! ```
//! use rndpool::{Quality, SharedPool};
//!
//! let pool = SharedPool::default();
//! pool.add_bytes(&[0x42; 16], 32).unwrap();
//! assert_eq!(pool.get_entropy_estimate(), 32);
//!
//! let mut out = [0u8; 4];
//! assert_eq!(pool.extract(&mut out, Quality::Any).unwrap(), 4);
//! assert_eq!(pool.get_entropy_estimate(), 0);
//!
//! // Nothing left to back a gated read.
//! let mut seed = [0u8; 16];
//! assert_eq!(pool.extract(&mut seed, Quality::Good).unwrap(), 0);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod conditioning;
pub mod config;
pub mod pool;
pub mod reseeding;
pub mod source;

// Re-export commonly used types at crate root
pub use conditioning::{HashAlgorithm, PoolHasher};
pub use config::{ConfigError, FileConfig, HarvestConfig};
pub use pool::{EntropyPool, PoolConfig, PoolError, PoolStats, Quality, SharedPool};
pub use reseeding::{ReseedableRng, ReseedingError};
pub use source::{EntropySource, MockSource, SourceError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
