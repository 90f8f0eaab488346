//! Credentials: a tagged bundle of signatures satisfying one signable
//! element's signer set. Position in a transaction's credentials array
//! corresponds 1:1 to the signed element's position.
use std::cmp::Ordering;

use lazy_static::lazy_static;

use crate::errors::Result;
use crate::key::{Signature, SIGNATURE_LEN};
use crate::packer::Packer;
use crate::registry::Registry;
use crate::tags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub type_id: u32,
    pub signatures: Vec<Signature>,
}

impl Credential {
    pub fn new(type_id: u32, signatures: Vec<Signature>) -> Self {
        Self {
            type_id,
            signatures,
        }
    }

    pub fn secp256k1(signatures: Vec<Signature>) -> Self {
        Self::new(tags::credential::SECP256K1, signatures)
    }

    pub fn nft(signatures: Vec<Signature>) -> Self {
        Self::new(tags::credential::NFT, signatures)
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_u32(self.signatures.len() as u32)?;
        for sig in &self.signatures {
            packer.pack_bytes(sig.as_ref())?;
        }
        Ok(())
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(crate::packer::MAX_SIZE, 64);
        packer.pack_u32(self.type_id)?;
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }

    fn decode_with_tag(type_id: u32, packer: &Packer) -> Result<Self> {
        let n = packer.unpack_u32()?;
        let mut signatures = Vec::with_capacity(n as usize);
        for _ in 0..n {
            signatures.push(Signature::from_slice(&packer.unpack_fixed::<SIGNATURE_LEN>()?));
        }
        Ok(Self::new(type_id, signatures))
    }

    fn decode_secp256k1(packer: &Packer) -> Result<Self> {
        Self::decode_with_tag(tags::credential::SECP256K1, packer)
    }

    fn decode_nft(packer: &Packer) -> Result<Self> {
        Self::decode_with_tag(tags::credential::NFT, packer)
    }
}

impl Ord for Credential {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_bytes()
            .unwrap_or_default()
            .cmp(&other.canonical_bytes().unwrap_or_default())
    }
}

impl PartialOrd for Credential {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

lazy_static! {
    pub static ref CREDENTIAL_REGISTRY: Registry<Credential> = {
        let mut r = Registry::new("credential");
        r.register(tags::credential::SECP256K1, Credential::decode_secp256k1);
        r.register(tags::credential::NFT, Credential::decode_nft);
        r
    };
}

/// Decodes `u32 type_id || u32 num_sigs || signature×num_sigs` as read from
/// the wire.
pub fn decode_credential(packer: &Packer) -> Result<Credential> {
    let type_id = packer.unpack_u32()?;
    CREDENTIAL_REGISTRY.decode(type_id, packer)
}

/// Encodes `u32 type_id || credential.encode()`, the framing used inside a
/// `SignedTx`'s credentials array.
pub fn encode_tagged(cred: &Credential, packer: &Packer) -> Result<()> {
    packer.pack_u32(cred.type_id)?;
    cred.encode(packer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let cred = Credential::secp256k1(vec![Signature::from_slice(&[7u8; SIGNATURE_LEN])]);
        let packer = Packer::new(crate::packer::MAX_SIZE, 128);
        encode_tagged(&cred, &packer).unwrap();
        let bytes = packer.take_bytes();
        let unpacker = Packer::new_for_unpack(&bytes);
        let decoded = decode_credential(&unpacker).unwrap();
        unpacker.expect_exhausted().unwrap();
        assert_eq!(cred, decoded);
    }
}
