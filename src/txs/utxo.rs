//! A `UtxoId` names one consumable output: the id of the transaction that
//! created it, plus its index among that transaction's outputs.
use std::cmp::Ordering;

use crate::errors::Result;
use crate::ids;
use crate::packer::Packer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtxoId {
    pub tx_id: ids::Id,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: ids::Id, output_index: u32) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_bytes(self.tx_id.as_ref())?;
        packer.pack_u32(self.output_index)
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let tx_id = ids::Id::from_slice(&packer.unpack_fixed::<{ ids::LEN }>()?);
        let output_index = packer.unpack_u32()?;
        Ok(Self::new(tx_id, output_index))
    }
}

impl Ord for UtxoId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tx_id
            .cmp(&other.tx_id)
            .then_with(|| self.output_index.cmp(&other.output_index))
    }
}

impl PartialOrd for UtxoId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::MAX_SIZE;

    #[test]
    fn round_trip() {
        let id = UtxoId::new(ids::Id::from_slice(&[1, 2, 3]), 7);
        let packer = Packer::new(MAX_SIZE, 64);
        id.encode(&packer).unwrap();
        let bytes = packer.take_bytes();
        let unpacker = Packer::new_for_unpack(&bytes);
        assert_eq!(UtxoId::decode(&unpacker).unwrap(), id);
    }

    #[test]
    fn orders_by_tx_id_then_output_index() {
        let a = UtxoId::new(ids::Id::from_slice(&[1]), 5);
        let b = UtxoId::new(ids::Id::from_slice(&[1]), 6);
        let c = UtxoId::new(ids::Id::from_slice(&[2]), 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn sort_is_stable_and_unique() {
        let mut ids: Vec<UtxoId> = Vec::new();
        for i in (0..10).rev() {
            ids.push(UtxoId::new(
                ids::Id::from_slice(&[i as u8, 1, 2]),
                (i + 1) as u32,
            ));
            ids.push(UtxoId::new(ids::Id::from_slice(&[i as u8, 1, 2]), i as u32));
        }
        assert!(!cmp_manager::is_sorted_and_unique(&ids));
        ids.sort();
        assert!(cmp_manager::is_sorted_and_unique(&ids));
    }
}
