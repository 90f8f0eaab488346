//! Inputs: a reference to a spent `UtxoId` plus the signer indices
//! authorizing the spend.
use std::cmp::Ordering;

use lazy_static::lazy_static;

use crate::errors::Result;
use crate::ids::{self, short};
use crate::key::SigIdx;
use crate::packer::Packer;
use crate::registry::Registry;
use crate::tags;

use super::utxo::UtxoId;

/// Spends `amount` of the referenced UTXO, authorized by the signers at
/// `sig_idxs`. Only `SigIdx.address_index` travels over the wire —
/// `SigIdx.source` is supplied by whoever builds the transaction (they
/// know which address owns the UTXO being spent) and is not recoverable
/// from a decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInput {
    pub amount: u64,
    pub sig_idxs: Vec<SigIdx>,
}

impl TransferInput {
    pub fn new(amount: u64, sig_idxs: Vec<SigIdx>) -> Self {
        Self { amount, sig_idxs }
    }
}

/// The closed set of input kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Transfer(TransferInput),
}

impl Input {
    pub fn type_id(&self) -> u32 {
        match self {
            Input::Transfer(_) => tags::input::TRANSFER,
        }
    }

    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Input::Transfer(t) => &t.sig_idxs,
        }
    }

    /// The credential tag the signing pipeline must attach for this input.
    pub fn credential_id(&self) -> u32 {
        match self {
            Input::Transfer(_) => tags::credential::SECP256K1,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        match self {
            Input::Transfer(t) => {
                packer.pack_u64(t.amount)?;
                packer.pack_u32(t.sig_idxs.len() as u32)?;
                for sig_idx in &t.sig_idxs {
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

    /// `source` cannot be recovered from the wire; decoded inputs carry an
    /// empty `source` that a caller must rebind via its own address book
    /// before attempting to re-sign.
    fn decode_transfer(packer: &Packer) -> Result<Input> {
        let amount = packer.unpack_u64()?;
        let n = packer.unpack_u32()?;
        let mut sig_idxs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let address_index = packer.unpack_u32()?;
            sig_idxs.push(SigIdx {
                address_index,
                source: short::Id::empty(),
            });
        }
        Ok(Input::Transfer(TransferInput::new(amount, sig_idxs)))
    }
}

lazy_static! {
    pub static ref INPUT_REGISTRY: Registry<Input> = {
        let mut r = Registry::new("input");
        r.register(tags::input::TRANSFER, Input::decode_transfer);
        r
    };
}

pub fn decode_input(packer: &Packer) -> Result<Input> {
    let type_id = packer.unpack_u32()?;
    INPUT_REGISTRY.decode(type_id, packer)
}

/// An input paired with the UTXO it spends and the asset it denominates.
/// Sorted by `(utxo_id.tx_id, utxo_id.output_index)` only — the asset id
/// and payload never participate in ordering, matching the reference
/// node's sort so foreign-produced transactions re-sort identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableInput {
    pub utxo_id: UtxoId,
    pub asset_id: ids::Id,
    pub input: Input,
}

impl TransferableInput {
    pub fn new(utxo_id: UtxoId, asset_id: ids::Id, input: Input) -> Self {
        Self {
            utxo_id,
            asset_id,
            input,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        self.utxo_id.encode(packer)?;
        packer.pack_bytes(self.asset_id.as_ref())?;
        packer.pack_u32(self.input.type_id())?;
        self.input.encode(packer)
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let utxo_id = UtxoId::decode(packer)?;
        let asset_id = ids::Id::from_slice(&packer.unpack_fixed::<{ ids::LEN }>()?);
        let input = decode_input(packer)?;
        Ok(Self::new(utxo_id, asset_id, input))
    }

    pub fn sig_idxs(&self) -> Vec<SigIdx> {
        self.input.sig_idxs().to_vec()
    }
}

impl Ord for TransferableInput {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utxo_id.cmp(&other.utxo_id)
    }
}

impl PartialOrd for TransferableInput {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
