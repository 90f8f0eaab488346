//! Outputs: value locked under a set of addresses and a signing threshold.
//! `Output` is the closed set of output kinds (today: transfer-to-owners);
//! `TransferableOutput` pairs one with the asset it denominates.
use std::cmp::Ordering;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ids::{self, short};
use crate::packer::Packer;
use crate::registry::Registry;
use crate::tags;

/// A locktime/threshold/address-set triple: value is spendable once
/// `locktime` has passed by any `threshold` of the listed addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOwners {
    pub locktime: u64,
    pub threshold: u32,
    pub addresses: Vec<short::Id>,
}

impl OutputOwners {
    pub fn new(locktime: u64, threshold: u32, mut addresses: Vec<short::Id>) -> Self {
        addresses.sort();
        Self {
            locktime,
            threshold,
            addresses,
        }
    }

    pub(crate) fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_u64(self.locktime)?;
        packer.pack_u32(self.threshold)?;
        packer.pack_u32(self.addresses.len() as u32)?;
        // addresses are stored pre-sorted by `new`; re-sort defensively so
        // a caller who mutated the field directly still encodes canonically.
        let mut addrs = self.addresses.clone();
        addrs.sort();
        for a in &addrs {
            packer.pack_bytes(a.as_ref())?;
        }
        Ok(())
    }

    pub(crate) fn decode(packer: &Packer) -> Result<Self> {
        let locktime = packer.unpack_u64()?;
        let threshold = packer.unpack_u32()?;
        let n = packer.unpack_u32()?;
        let mut addresses = Vec::with_capacity(n as usize);
        for _ in 0..n {
            addresses.push(short::Id::from_slice(&packer.unpack_fixed::<{ short::LEN }>()?));
        }
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }
}

impl Ord for OutputOwners {
    fn cmp(&self, other: &Self) -> Ordering {
        self.locktime
            .cmp(&other.locktime)
            .then_with(|| self.threshold.cmp(&other.threshold))
            .then_with(|| self.addresses.cmp(&other.addresses))
    }
}

impl PartialOrd for OutputOwners {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Value payable to an `OutputOwners` set. The only output kind this
/// closed registry currently defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutput {
    pub amount: u64,

    #[serde(flatten)]
    pub output_owners: OutputOwners,
}

impl TransferOutput {
    pub fn new(amount: u64, output_owners: OutputOwners) -> Self {
        Self {
            amount,
            output_owners,
        }
    }
}

/// The closed set of output kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Transfer(TransferOutput),
}

impl Output {
    pub fn type_id(&self) -> u32 {
        match self {
            Output::Transfer(_) => tags::output::TRANSFER,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        match self {
            Output::Transfer(o) => {
                packer.pack_u64(o.amount)?;
                o.output_owners.encode(packer)
            }
        }
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(crate::packer::MAX_SIZE, 64);
        packer.pack_u32(self.type_id())?;
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }

    fn decode_transfer(packer: &Packer) -> Result<Output> {
        let amount = packer.unpack_u64()?;
        let output_owners = OutputOwners::decode(packer)?;
        Ok(Output::Transfer(TransferOutput::new(amount, output_owners)))
    }
}

impl Ord for Output {
    fn cmp(&self, other: &Self) -> Ordering {
        // canonical_bytes() only fails on pathological sizes this codec
        // never produces; an empty fallback keeps the comparator total.
        self.canonical_bytes()
            .unwrap_or_default()
            .cmp(&other.canonical_bytes().unwrap_or_default())
    }
}

impl PartialOrd for Output {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

lazy_static! {
    pub static ref OUTPUT_REGISTRY: Registry<Output> = {
        let mut r = Registry::new("output");
        r.register(tags::output::TRANSFER, Output::decode_transfer);
        r
    };
}

pub fn decode_output(packer: &Packer) -> Result<Output> {
    let type_id = packer.unpack_u32()?;
    OUTPUT_REGISTRY.decode(type_id, packer)
}

/// An output paired with the asset it denominates. Sorted by its full
/// canonical byte form: `asset_id || u32-be(output.type_id) || output.encode()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOutput {
    pub asset_id: ids::Id,
    pub output: Output,
}

impl TransferableOutput {
    pub fn new(asset_id: ids::Id, output: Output) -> Self {
        Self { asset_id, output }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_bytes(self.asset_id.as_ref())?;
        packer.pack_u32(self.output.type_id())?;
        self.output.encode(packer)
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(crate::packer::MAX_SIZE, 64);
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let asset_id = ids::Id::from_slice(&packer.unpack_fixed::<{ ids::LEN }>()?);
        let output = decode_output(packer)?;
        Ok(Self::new(asset_id, output))
    }
}

impl Ord for TransferableOutput {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_bytes()
            .unwrap_or_default()
            .cmp(&other.canonical_bytes().unwrap_or_default())
    }
}

impl PartialOrd for TransferableOutput {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
