//! The abstract signer capability and keychain used by the signing
//! pipeline. The codec never touches elliptic-curve math directly — it only
//! asks a `Signer` to turn a 32-byte digest into a 65-byte signature, per
//! the "signer abstraction" design note.
pub mod mock;

use std::{collections::HashMap, error::Error as StdError, fmt};

use serde::{Deserialize, Serialize};

use crate::ids::short;

pub const SIGNATURE_LEN: usize = 65;

/// A fixed-length recoverable ECDSA signature. Opaque to the codec: it is
/// produced by a `Signer` and written verbatim onto the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "serde_bytes_array")] [u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_slice(d: &[u8]) -> Self {
        assert_eq!(d.len(), SIGNATURE_LEN, "signature must be {SIGNATURE_LEN} bytes");
        let mut buf = [0u8; SIGNATURE_LEN];
        buf.copy_from_slice(d);
        Signature(buf)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Serializes a fixed `[u8; 65]` as a plain byte sequence instead of serde's
/// default tuple-of-65-elements representation.
mod serde_bytes_array {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 65], serializer: S) -> Result<S::Ok, S::Error> {
        bytes.to_vec().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 65], D::Error> {
        let v = Vec::<u8>::deserialize(deserializer)?;
        v.try_into()
            .map_err(|v: Vec<u8>| serde::de::Error::invalid_length(v.len(), &"65"))
    }
}

/// A signer index: a pointer into a referenced output's address list, plus a
/// local-only hint for which key to use. Only `address_index` is written to
/// the wire; `source` never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigIdx {
    pub address_index: u32,
    pub source: short::Id,
}

/// An abstract signing capability: turn a 32-byte digest into a 65-byte
/// signature. Implementations may wrap a local private key, a hardware
/// wallet, or a remote KMS; the codec does not care which.
pub trait Signer {
    fn address(&self) -> short::Id;

    fn sign(
        &self,
        digest: &[u8; 32],
    ) -> std::result::Result<Signature, Box<dyn StdError + Send + Sync>>;
}

/// Maps a 20-byte address to a signer capable of producing signatures for
/// it. Read-only during signing; a concurrent-safe snapshot is sufficient
/// per the crate's concurrency model.
#[derive(Default)]
pub struct Keychain<S: Signer> {
    by_address: HashMap<short::Id, S>,
}

impl<S: Signer> Keychain<S> {
    pub fn new() -> Self {
        Self {
            by_address: HashMap::new(),
        }
    }

    pub fn from_signers(signers: impl IntoIterator<Item = S>) -> Self {
        let mut by_address = HashMap::new();
        for s in signers {
            by_address.insert(s.address(), s);
        }
        Self { by_address }
    }

    pub fn get(&self, address: &short::Id) -> Option<&S> {
        self.by_address.get(address)
    }

    pub fn insert(&mut self, signer: S) {
        self.by_address.insert(signer.address(), signer);
    }
}
