//! SHA-256 digest helpers for block and global hashing.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`, as stored in a block descriptor's
/// `hash` field.
pub fn block_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Incrementally accumulates the original-input digest across blocks
/// written (or read) in ascending `id` order, producing the footer's
/// `global_hash`.
#[derive(Default)]
pub struct GlobalHasher {
    hasher: Sha256,
}

impl GlobalHasher {
    pub fn new() -> Self {
        Self { hasher: Sha256::new() }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    pub fn finalize_hex(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
