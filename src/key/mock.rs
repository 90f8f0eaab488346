//! A deterministic, non-cryptographic `Signer` used by tests and doc
//! examples. Never used in production signing paths.
use std::error::Error as StdError;

use crate::ids::short;

use super::{Signature, Signer, SIGNATURE_LEN};

/// Produces a "signature" by tiling the digest twice and XOR-ing every byte
/// with `tag`, so that distinct mock signers produce distinguishably
/// different signatures over the same digest, and the same signer always
/// produces the same signature over the same digest.
#[derive(Debug, Clone, Copy)]
pub struct MockSigner {
    address: short::Id,
    tag: u8,
}

impl MockSigner {
    pub fn new(address: short::Id, tag: u8) -> Self {
        Self { address, tag }
    }

    /// Builds a mock signer whose address is derived from `seed`, for tests
    /// that just need "some distinct key".
    pub fn from_seed(seed: u8) -> Self {
        Self::new(short::Id::from_slice(&[seed; short::LEN]), seed)
    }
}

impl Signer for MockSigner {
    fn address(&self) -> short::Id {
        self.address
    }

    fn sign(
        &self,
        digest: &[u8; 32],
    ) -> std::result::Result<Signature, Box<dyn StdError + Send + Sync>> {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(digest);
        out[32..64].copy_from_slice(digest);
        out[64] = self.tag;
        for b in out.iter_mut() {
            *b ^= self.tag;
        }
        Ok(Signature::from_slice(&out))
    }
}
