//! Operations: non-transfer state changes (today: NFT transfer) that spend
//! a list of UTXOs and require their own credential, same as an input.
use std::cmp::Ordering;

use lazy_static::lazy_static;

use crate::errors::Result;
use crate::ids::{self, short};
use crate::key::SigIdx;
use crate::packer::Packer;
use crate::registry::Registry;
use crate::tags;

use super::output::OutputOwners;
use super::utxo::UtxoId;

/// Moves an NFT (identified by `group_id` plus its opaque `payload`) to a
/// new `OutputOwners` set. Only `SigIdx.address_index` travels over the
/// wire, same convention as `TransferInput`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftTransferOp {
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub output_owners: OutputOwners,
    pub sig_idxs: Vec<SigIdx>,
}

impl NftTransferOp {
    pub fn new(
        group_id: u32,
        payload: Vec<u8>,
        output_owners: OutputOwners,
        sig_idxs: Vec<SigIdx>,
    ) -> Self {
        Self {
            group_id,
            payload,
            output_owners,
            sig_idxs,
        }
    }
}

/// The closed set of operation kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    NftTransfer(NftTransferOp),
}

impl Operation {
    pub fn type_id(&self) -> u32 {
        match self {
            Operation::NftTransfer(_) => tags::operation::NFT_TRANSFER,
        }
    }

    pub fn credential_id(&self) -> u32 {
        match self {
            Operation::NftTransfer(_) => tags::credential::NFT,
        }
    }

    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Operation::NftTransfer(op) => &op.sig_idxs,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        match self {
            Operation::NftTransfer(op) => {
                packer.pack_u32(op.group_id)?;
                packer.pack_u32(op.payload.len() as u32)?;
                packer.pack_bytes(&op.payload)?;
                op.output_owners.encode(packer)?;
                packer.pack_u32(op.sig_idxs.len() as u32)?;
                for sig_idx in &op.sig_idxs {
                    packer.pack_u32(sig_idx.address_index)?;
                }
                Ok(())
            }
        }
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(crate::packer::MAX_SIZE, 64);
        packer.pack_u32(self.type_id())?;
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }

    fn decode_nft_transfer(packer: &Packer) -> Result<Operation> {
        let group_id = packer.unpack_u32()?;
        let n = packer.unpack_u32()?;
        let payload = packer.unpack_bytes(n as usize)?;
        let output_owners = OutputOwners::decode(packer)?;
        let ns = packer.unpack_u32()?;
        let mut sig_idxs = Vec::with_capacity(ns as usize);
        for _ in 0..ns {
            let address_index = packer.unpack_u32()?;
            sig_idxs.push(SigIdx {
                address_index,
                source: short::Id::empty(),
            });
        }
        Ok(Operation::NftTransfer(NftTransferOp::new(
            group_id,
            payload,
            output_owners,
            sig_idxs,
        )))
    }
}

lazy_static! {
    pub static ref OPERATION_REGISTRY: Registry<Operation> = {
        let mut r = Registry::new("operation");
        r.register(tags::operation::NFT_TRANSFER, Operation::decode_nft_transfer);
        r
    };
}

pub fn decode_operation(packer: &Packer) -> Result<Operation> {
    let type_id = packer.unpack_u32()?;
    OPERATION_REGISTRY.decode(type_id, packer)
}

/// An operation paired with the asset and the ordered list of UTXOs it
/// consumes. Unlike outputs and inputs, the UTXO id list order is preserved
/// as authored, not sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOperation {
    pub asset_id: ids::Id,
    pub utxo_ids: Vec<UtxoId>,
    pub operation: Operation,
}

impl TransferableOperation {
    pub fn new(asset_id: ids::Id, utxo_ids: Vec<UtxoId>, operation: Operation) -> Self {
        Self {
            asset_id,
            utxo_ids,
            operation,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_bytes(self.asset_id.as_ref())?;
        packer.pack_u32(self.utxo_ids.len() as u32)?;
        for u in &self.utxo_ids {
            u.encode(packer)?;
        }
        packer.pack_u32(self.operation.type_id())?;
        self.operation.encode(packer)
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let asset_id = ids::Id::from_slice(&packer.unpack_fixed::<{ ids::LEN }>()?);
        let n = packer.unpack_u32()?;
        let mut utxo_ids = Vec::with_capacity(n as usize);
        for _ in 0..n {
            utxo_ids.push(UtxoId::decode(packer)?);
        }
        let operation = decode_operation(packer)?;
        Ok(Self::new(asset_id, utxo_ids, operation))
    }

    pub fn sig_idxs(&self) -> Vec<SigIdx> {
        self.operation.sig_idxs().to_vec()
    }
}

impl Ord for TransferableOperation {
    fn cmp(&self, other: &Self) -> Ordering {
        // Operations are only ever compared by their canonical bytes when a
        // caller explicitly sorts them; the wire order within a transaction
        // is authored order, not this comparator.
        self.asset_id
            .cmp(&other.asset_id)
            .then_with(|| self.operation.canonical_bytes().unwrap_or_default()
                .cmp(&other.operation.canonical_bytes().unwrap_or_default()))
    }
}

impl PartialOrd for TransferableOperation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::short;

    fn sample() -> TransferableOperation {
        TransferableOperation::new(
            ids::Id::from_slice(&[1; 32]),
            vec![UtxoId::new(ids::Id::from_slice(&[2; 32]), 0)],
            Operation::NftTransfer(NftTransferOp::new(
                7,
                vec![1, 2, 3],
                OutputOwners::new(0, 1, vec![short::Id::from_slice(&[4; short::LEN])]),
                vec![SigIdx {
                    address_index: 0,
                    source: short::Id::empty(),
                }],
            )),
        )
    }

    #[test]
    fn round_trip() {
        let op = sample();
        let packer = Packer::new(crate::packer::MAX_SIZE, 256);
        op.encode(&packer).unwrap();
        let bytes = packer.take_bytes();
        let unpacker = Packer::new_for_unpack(&bytes);
        let decoded = TransferableOperation::decode(&unpacker).unwrap();
        unpacker.expect_exhausted().unwrap();
        assert_eq!(op, decoded);
    }

    #[test]
    fn credential_id_is_nft() {
        assert_eq!(sample().operation.credential_id(), tags::credential::NFT);
    }
}
