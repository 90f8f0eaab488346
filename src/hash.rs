//! The SHA-256 hashing capability.
//!
//! Kept behind a trait rather than a bare function so tests can inject a
//! deterministic stand-in when generating fixtures, per the design note that
//! hashing is "a capability, not a fixed library choice."
use sha2::{Digest, Sha256};

pub const SHA256_OUTPUT_LEN: usize = 32;

pub trait Hasher {
    fn sha256(&self, data: &[u8]) -> [u8; SHA256_OUTPUT_LEN];
}

/// The production hasher, backed by `sha2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn sha256(&self, data: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

/// Convenience wrapper over the default hasher, used everywhere the codec
/// just needs "the" hash and isn't under test with an injected one.
pub fn sha256(data: impl AsRef<[u8]>) -> [u8; SHA256_OUTPUT_LEN] {
    Sha256Hasher.sha256(data.as_ref())
}

/// SHA-256 applied twice, used by the base-58-with-checksum codec.
pub fn double_sha256(data: impl AsRef<[u8]>) -> [u8; SHA256_OUTPUT_LEN] {
    sha256(sha256(data))
}
