//! The platform chain: account/nonce model, hosting validator and delegator
//! staking transactions. Only the default-subnet delegator transaction is
//! implemented here; its envelope carries a single signature rather than a
//! credentials array, per the asset chain's `Credential` convention.
use crate::errors::{Error, Result};
use crate::hash;
use crate::ids::short;
use crate::key::{Signature, Signer, SIGNATURE_LEN};
use crate::packer::{Packer, MAX_SIZE};
use crate::tags;

/// Delegates `weight` of stake to `node_id` for `[start_time, end_time)`,
/// authorized by `destination`'s key and ordered by `nonce`. All four of
/// `weight`/`start_time`/`end_time`/`nonce` are full 64-bit wire fields —
/// callers must not silently truncate a wider value into 32 bits before
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddDefaultSubnetDelegatorTx {
    pub node_id: short::Id,
    pub weight: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub network_id: u32,
    pub nonce: u64,
    pub destination: short::Id,
}

impl AddDefaultSubnetDelegatorTx {
    pub fn new(
        node_id: short::Id,
        weight: u64,
        start_time: u64,
        end_time: u64,
        network_id: u32,
        nonce: u64,
        destination: short::Id,
    ) -> Self {
        Self {
            node_id,
            weight,
            start_time,
            end_time,
            network_id,
            nonce,
            destination,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_bytes(self.node_id.as_ref())?;
        packer.pack_u64(self.weight)?;
        packer.pack_u64(self.start_time)?;
        packer.pack_u64(self.end_time)?;
        packer.pack_u32(self.network_id)?;
        packer.pack_u64(self.nonce)?;
        packer.pack_bytes(self.destination.as_ref())
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let node_id = short::Id::from_slice(&packer.unpack_fixed::<{ short::LEN }>()?);
        let weight = packer.unpack_u64()?;
        let start_time = packer.unpack_u64()?;
        let end_time = packer.unpack_u64()?;
        let network_id = packer.unpack_u32()?;
        let nonce = packer.unpack_u64()?;
        let destination = short::Id::from_slice(&packer.unpack_fixed::<{ short::LEN }>()?);
        Ok(Self::new(
            node_id,
            weight,
            start_time,
            end_time,
            network_id,
            nonce,
            destination,
        ))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(MAX_SIZE, 96);
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }

    pub fn digest(&self) -> Result<[u8; 32]> {
        Ok(hash::sha256(self.to_bytes()?))
    }
}

/// `u32 tag || AddDefaultSubnetDelegatorTx || Signature(65)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedDelegatorTx {
    pub unsigned: AddDefaultSubnetDelegatorTx,
    pub signature: Signature,
}

impl SignedDelegatorTx {
    pub fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_u32(tags::platform_tx::ADD_DEFAULT_SUBNET_DELEGATOR_TX)?;
        self.unsigned.encode(packer)?;
        packer.pack_bytes(self.signature.as_ref())
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let type_id = packer.unpack_u32()?;
        if type_id != tags::platform_tx::ADD_DEFAULT_SUBNET_DELEGATOR_TX {
            return Err(Error::UnknownTypeId {
                domain: "platform_tx".to_string(),
                id: type_id,
            });
        }
        let unsigned = AddDefaultSubnetDelegatorTx::decode(packer)?;
        let signature = Signature::from_slice(&packer.unpack_fixed::<SIGNATURE_LEN>()?);
        Ok(Self {
            unsigned,
            signature,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(MAX_SIZE, 192);
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }
}

/// Signs `tx` with `payer`'s key: `sha256(encode(tx))` signed directly,
/// the apparent intent behind the reference source's commented-out signing
/// path for this transaction kind.
pub fn sign(tx: AddDefaultSubnetDelegatorTx, payer: &dyn Signer) -> Result<SignedDelegatorTx> {
    let digest = tx.digest()?;
    let signature = payer
        .sign(&digest)
        .map_err(|e| Error::SignerFailure { inner: e.to_string() })?;
    Ok(SignedDelegatorTx {
        unsigned: tx,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::mock::MockSigner;

    fn sample() -> AddDefaultSubnetDelegatorTx {
        AddDefaultSubnetDelegatorTx::new(
            short::Id::from_slice(&[1; short::LEN]),
            1_000,
            10,
            20,
            7,
            3,
            short::Id::from_slice(&[2; short::LEN]),
        )
    }

    #[test]
    fn round_trip() {
        let tx = sample();
        let bytes = tx.to_bytes().unwrap();
        assert_eq!(bytes.len(), 20 + 8 + 8 + 8 + 4 + 8 + 20);
        let unpacker = Packer::new_for_unpack(&bytes);
        let decoded = AddDefaultSubnetDelegatorTx::decode(&unpacker).unwrap();
        unpacker.expect_exhausted().unwrap();
        assert_eq!(tx, decoded);
    }

    #[test]
    fn sign_then_decode_envelope() {
        let tx = sample();
        let signer = MockSigner::new(tx.destination, 42);
        let signed = sign(tx, &signer).unwrap();
        let bytes = signed.to_bytes().unwrap();
        let unpacker = Packer::new_for_unpack(&bytes);
        let decoded = SignedDelegatorTx::decode(&unpacker).unwrap();
        unpacker.expect_exhausted().unwrap();
        assert_eq!(signed, decoded);
    }

    #[test]
    fn unknown_envelope_tag_rejected() {
        let packer = Packer::new(MAX_SIZE, 8);
        packer.pack_u32(0xDEAD_BEEF).unwrap();
        let bytes = packer.take_bytes();
        let unpacker = Packer::new_for_unpack(&bytes);
        assert!(SignedDelegatorTx::decode(&unpacker).is_err());
    }
}
