//! Stable hashing
//!
//! Hash functions used to derive base codes.

/// A deterministic 32-bit hash over raw bytes.
///
/// Implementations must not depend on process state (random seeds,
/// pointer identity); codes are persisted and must be reproducible
/// after a restart.
pub trait CodeHasher: Send + Sync {
    fn hash(&self, input: &[u8]) -> u32;
}

/// CRC-32/IEEE (polynomial 0x04C11DB7, reflected), as computed by `crc32fast`
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl CodeHasher for Crc32Hasher {
    fn hash(&self, input: &[u8]) -> u32 {
        crc32fast::hash(input)
    }
}

/// Base code for a URL: lowercase hex of its hash, no padding
pub fn base_code(hasher: &dyn CodeHasher, long_url: &str) -> String {
    format!("{:x}", hasher.hash(long_url.as_bytes()))
}
