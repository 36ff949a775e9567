//! CSPRNG reseeding interface.
//!
//! This module provides a wrapper around a ChaCha CSPRNG that reseeds
//! itself from gated pool output.

mod csprng;

pub use csprng::{ReseedableRng, ReseedingError, SEED_LEN};
