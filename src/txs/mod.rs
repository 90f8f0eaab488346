//! Transaction codec: the five asset-chain transaction kinds sharing a
//! common header, plus the `UnsignedTx`/`SignedTx` envelope.
pub mod credential;
pub mod input;
pub mod operation;
pub mod output;
pub mod utxo;

use std::{fmt, str::FromStr};

use lazy_static::lazy_static;

use crate::errors::{Error, Result};
use crate::formatting;
use crate::hash;
use crate::ids;
use crate::key::SigIdx;
use crate::packer::{Packer, MAX_SIZE};
use crate::registry::Registry;
use crate::tags;

use credential::Credential;
use input::TransferableInput;
use operation::TransferableOperation;
use output::{Output, TransferableOutput};

pub const MIN_DENOMINATION: u8 = 0;
pub const MAX_DENOMINATION: u8 = 32;

/// A single element this transaction requires a signature for, with the
/// credential tag it must be wrapped in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableElement {
    pub credential_id: u32,
    pub sig_idxs: Vec<SigIdx>,
}

impl TransferableInput {
    pub fn signable(&self) -> SignableElement {
        SignableElement {
            credential_id: self.input.credential_id(),
            sig_idxs: self.sig_idxs(),
        }
    }
}

impl TransferableOperation {
    pub fn signable(&self) -> SignableElement {
        SignableElement {
            credential_id: self.operation.credential_id(),
            sig_idxs: self.sig_idxs(),
        }
    }
}

/// The header shared by every asset-chain transaction kind. Outputs and
/// inputs are sorted by canonical byte order on encode; decode preserves
/// whatever order the stream carried, so re-parsing a foreign transaction
/// never perturbs its signing digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub network_id: u32,
    pub blockchain_id: ids::Id,
    pub outputs: Vec<TransferableOutput>,
    pub inputs: Vec<TransferableInput>,
}

impl Header {
    pub fn new(
        network_id: u32,
        blockchain_id: ids::Id,
        outputs: Vec<TransferableOutput>,
        inputs: Vec<TransferableInput>,
    ) -> Self {
        Self {
            network_id,
            blockchain_id,
            outputs,
            inputs,
        }
    }

    /// The inputs in the order the signing pipeline and the wire encoder
    /// both use: sorted by canonical byte form.
    pub fn canonical_inputs(&self) -> Vec<TransferableInput> {
        let mut v = self.inputs.clone();
        v.sort();
        v
    }

    pub fn canonical_outputs(&self) -> Vec<TransferableOutput> {
        let mut v = self.outputs.clone();
        v.sort();
        v
    }

    fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_u32(self.network_id)?;
        packer.pack_bytes(self.blockchain_id.as_ref())?;
        let outputs = self.canonical_outputs();
        packer.pack_u32(outputs.len() as u32)?;
        for o in &outputs {
            o.encode(packer)?;
        }
        let inputs = self.canonical_inputs();
        packer.pack_u32(inputs.len() as u32)?;
        for i in &inputs {
            i.encode(packer)?;
        }
        Ok(())
    }

    fn decode(packer: &Packer) -> Result<Self> {
        let network_id = packer.unpack_u32()?;
        let blockchain_id = ids::Id::from_slice(&packer.unpack_fixed::<{ ids::LEN }>()?);
        let n_out = packer.unpack_u32()?;
        let mut outputs = Vec::with_capacity(n_out as usize);
        for _ in 0..n_out {
            outputs.push(TransferableOutput::decode(packer)?);
        }
        let n_in = packer.unpack_u32()?;
        let mut inputs = Vec::with_capacity(n_in as usize);
        for _ in 0..n_in {
            inputs.push(TransferableInput::decode(packer)?);
        }
        Ok(Self::new(network_id, blockchain_id, outputs, inputs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTx {
    pub header: Header,
}

impl BaseTx {
    pub fn new(header: Header) -> Self {
        Self { header }
    }

    fn encode_body(&self, packer: &Packer) -> Result<()> {
        self.header.encode(packer)
    }

    fn decode_body(packer: &Packer) -> Result<UnsignedTx> {
        Ok(UnsignedTx::Base(BaseTx::new(Header::decode(packer)?)))
    }

    fn signable_elements(&self) -> Vec<SignableElement> {
        self.header.canonical_inputs().iter().map(|i| i.signable()).collect()
    }
}

/// One initial-state group for a `CreateAssetTx`'s genesis outputs, keyed
/// by the fx that interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    pub fx_id: u32,
    pub outputs: Vec<Output>,
}

impl InitialState {
    pub fn new(fx_id: u32, mut outputs: Vec<Output>) -> Self {
        outputs.sort();
        Self { fx_id, outputs }
    }

    fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_u32(self.fx_id)?;
        let mut outputs = self.outputs.clone();
        outputs.sort();
        packer.pack_u32(outputs.len() as u32)?;
        for o in &outputs {
            packer.pack_u32(o.type_id())?;
            o.encode(packer)?;
        }
        Ok(())
    }

    fn decode(packer: &Packer) -> Result<Self> {
        let fx_id = packer.unpack_u32()?;
        let n = packer.unpack_u32()?;
        let mut outputs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            outputs.push(output::decode_output(packer)?);
        }
        Ok(Self { fx_id, outputs })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAssetTx {
    pub header: Header,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: Vec<InitialState>,
}

impl CreateAssetTx {
    pub fn new(
        header: Header,
        name: String,
        symbol: String,
        denomination: u8,
        initial_states: Vec<InitialState>,
    ) -> Result<Self> {
        if denomination > MAX_DENOMINATION {
            return Err(Error::InvalidDenomination {
                value: denomination,
            });
        }
        Ok(Self {
            header,
            name,
            symbol,
            denomination,
            initial_states,
        })
    }

    fn encode_body(&self, packer: &Packer) -> Result<()> {
        self.header.encode(packer)?;
        packer.pack_str(&self.name)?;
        packer.pack_str(&self.symbol)?;
        packer.pack_byte(self.denomination)?;
        packer.pack_u32(self.initial_states.len() as u32)?;
        for s in &self.initial_states {
            s.encode(packer)?;
        }
        Ok(())
    }

    fn decode_body(packer: &Packer) -> Result<UnsignedTx> {
        let header = Header::decode(packer)?;
        let name = packer.unpack_str()?;
        let symbol = packer.unpack_str()?;
        let denomination = packer.unpack_byte()?;
        if denomination > MAX_DENOMINATION {
            return Err(Error::InvalidDenomination {
                value: denomination,
            });
        }
        let n = packer.unpack_u32()?;
        let mut initial_states = Vec::with_capacity(n as usize);
        for _ in 0..n {
            initial_states.push(InitialState::decode(packer)?);
        }
        Ok(UnsignedTx::CreateAsset(CreateAssetTx {
            header,
            name,
            symbol,
            denomination,
            initial_states,
        }))
    }

    fn signable_elements(&self) -> Vec<SignableElement> {
        self.header.canonical_inputs().iter().map(|i| i.signable()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTx {
    pub header: Header,
    pub operations: Vec<TransferableOperation>,
}

impl OperationTx {
    pub fn new(header: Header, operations: Vec<TransferableOperation>) -> Self {
        Self { header, operations }
    }

    fn encode_body(&self, packer: &Packer) -> Result<()> {
        self.header.encode(packer)?;
        packer.pack_u32(self.operations.len() as u32)?;
        for op in &self.operations {
            op.encode(packer)?;
        }
        Ok(())
    }

    fn decode_body(packer: &Packer) -> Result<UnsignedTx> {
        let header = Header::decode(packer)?;
        let n = packer.unpack_u32()?;
        let mut operations = Vec::with_capacity(n as usize);
        for _ in 0..n {
            operations.push(TransferableOperation::decode(packer)?);
        }
        Ok(UnsignedTx::Operation(OperationTx::new(header, operations)))
    }

    fn signable_elements(&self) -> Vec<SignableElement> {
        let mut v: Vec<SignableElement> =
            self.header.canonical_inputs().iter().map(|i| i.signable()).collect();
        v.extend(self.operations.iter().map(|op| op.signable()));
        v
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTx {
    pub header: Header,
    /// Inputs consuming UTXOs from the source chain, kept in authored order
    /// — only `header.inputs` is re-sorted on encode.
    pub import_inputs: Vec<TransferableInput>,
}

impl ImportTx {
    pub fn new(header: Header, import_inputs: Vec<TransferableInput>) -> Self {
        Self {
            header,
            import_inputs,
        }
    }

    fn encode_body(&self, packer: &Packer) -> Result<()> {
        self.header.encode(packer)?;
        packer.pack_u32(self.import_inputs.len() as u32)?;
        for i in &self.import_inputs {
            i.encode(packer)?;
        }
        Ok(())
    }

    fn decode_body(packer: &Packer) -> Result<UnsignedTx> {
        let header = Header::decode(packer)?;
        let n = packer.unpack_u32()?;
        let mut import_inputs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            import_inputs.push(TransferableInput::decode(packer)?);
        }
        Ok(UnsignedTx::Import(ImportTx::new(header, import_inputs)))
    }

    fn signable_elements(&self) -> Vec<SignableElement> {
        let mut v: Vec<SignableElement> =
            self.header.canonical_inputs().iter().map(|i| i.signable()).collect();
        v.extend(self.import_inputs.iter().map(|i| i.signable()));
        v
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTx {
    pub header: Header,
    /// Outputs created on the destination chain. Export outputs have no
    /// signers of their own.
    pub export_outputs: Vec<TransferableOutput>,
}

impl ExportTx {
    pub fn new(header: Header, export_outputs: Vec<TransferableOutput>) -> Self {
        Self {
            header,
            export_outputs,
        }
    }

    fn encode_body(&self, packer: &Packer) -> Result<()> {
        self.header.encode(packer)?;
        let mut outputs = self.export_outputs.clone();
        outputs.sort();
        packer.pack_u32(outputs.len() as u32)?;
        for o in &outputs {
            o.encode(packer)?;
        }
        Ok(())
    }

    fn decode_body(packer: &Packer) -> Result<UnsignedTx> {
        let header = Header::decode(packer)?;
        let n = packer.unpack_u32()?;
        let mut export_outputs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            export_outputs.push(TransferableOutput::decode(packer)?);
        }
        Ok(UnsignedTx::Export(ExportTx::new(header, export_outputs)))
    }

    fn signable_elements(&self) -> Vec<SignableElement> {
        self.header.canonical_inputs().iter().map(|i| i.signable()).collect()
    }
}

/// The closed set of asset-chain transaction kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTx {
    Base(BaseTx),
    CreateAsset(CreateAssetTx),
    Operation(OperationTx),
    Import(ImportTx),
    Export(ExportTx),
}

impl UnsignedTx {
    pub fn type_id(&self) -> u32 {
        match self {
            UnsignedTx::Base(_) => tags::tx::BASE_TX,
            UnsignedTx::CreateAsset(_) => tags::tx::CREATE_ASSET_TX,
            UnsignedTx::Operation(_) => tags::tx::OPERATION_TX,
            UnsignedTx::Import(_) => tags::tx::IMPORT_TX,
            UnsignedTx::Export(_) => tags::tx::EXPORT_TX,
        }
    }

    pub fn header(&self) -> &Header {
        match self {
            UnsignedTx::Base(tx) => &tx.header,
            UnsignedTx::CreateAsset(tx) => &tx.header,
            UnsignedTx::Operation(tx) => &tx.header,
            UnsignedTx::Import(tx) => &tx.header,
            UnsignedTx::Export(tx) => &tx.header,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        packer.pack_u32(self.type_id())?;
        match self {
            UnsignedTx::Base(tx) => tx.encode_body(packer),
            UnsignedTx::CreateAsset(tx) => tx.encode_body(packer),
            UnsignedTx::Operation(tx) => tx.encode_body(packer),
            UnsignedTx::Import(tx) => tx.encode_body(packer),
            UnsignedTx::Export(tx) => tx.encode_body(packer),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(MAX_SIZE, 256);
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }

    /// `sha256` of the canonical encoding — the message every required
    /// signature is produced over.
    pub fn digest(&self) -> Result<[u8; 32]> {
        Ok(hash::sha256(self.to_bytes()?))
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let type_id = packer.unpack_u32()?;
        TX_REGISTRY.decode(type_id, packer)
    }

    /// The elements requiring a signature, in the exact order the signing
    /// pipeline must walk and the verifier reconstructs.
    pub fn signable_elements(&self) -> Vec<SignableElement> {
        match self {
            UnsignedTx::Base(tx) => tx.signable_elements(),
            UnsignedTx::CreateAsset(tx) => tx.signable_elements(),
            UnsignedTx::Operation(tx) => tx.signable_elements(),
            UnsignedTx::Import(tx) => tx.signable_elements(),
            UnsignedTx::Export(tx) => tx.signable_elements(),
        }
    }
}

lazy_static! {
    static ref TX_REGISTRY: Registry<UnsignedTx> = {
        let mut r = Registry::new("tx");
        r.register(tags::tx::BASE_TX, BaseTx::decode_body);
        r.register(tags::tx::CREATE_ASSET_TX, CreateAssetTx::decode_body);
        r.register(tags::tx::OPERATION_TX, OperationTx::decode_body);
        r.register(tags::tx::IMPORT_TX, ImportTx::decode_body);
        r.register(tags::tx::EXPORT_TX, ExportTx::decode_body);
        r
    };
}

/// `UnsignedTx` plus one credential per signable element, in the same
/// order. `credentials.len()` must equal the unsigned transaction's
/// signable-element count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub unsigned: UnsignedTx,
    pub credentials: Vec<Credential>,
}

impl SignedTx {
    pub fn new(unsigned: UnsignedTx, credentials: Vec<Credential>) -> Self {
        Self {
            unsigned,
            credentials,
        }
    }

    pub fn encode(&self, packer: &Packer) -> Result<()> {
        self.unsigned.encode(packer)?;
        packer.pack_u32(self.credentials.len() as u32)?;
        for c in &self.credentials {
            credential::encode_tagged(c, packer)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let packer = Packer::new(MAX_SIZE, 256);
        self.encode(&packer)?;
        Ok(packer.take_bytes().to_vec())
    }

    pub fn decode(packer: &Packer) -> Result<Self> {
        let unsigned = UnsignedTx::decode(packer)?;
        let n = packer.unpack_u32()?;
        let mut credentials = Vec::with_capacity(n as usize);
        for _ in 0..n {
            credentials.push(credential::decode_credential(packer)?);
        }
        Ok(Self::new(unsigned, credentials))
    }
}

impl fmt::Display for SignedTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes().map_err(|_| fmt::Error)?;
        write!(f, "{}", formatting::b58_encode_with_checksum(&bytes))
    }
}

impl FromStr for SignedTx {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = formatting::b58_decode_with_checksum(s)?;
        let packer = Packer::new_for_unpack(&bytes);
        let tx = Self::decode(&packer)?;
        packer.expect_exhausted()?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::short;
    use input::{Input, TransferInput};
    use output::{OutputOwners, TransferOutput};
    use utxo::UtxoId;

    fn empty_header(network_id: u32) -> Header {
        Header::new(network_id, ids::Id::from_slice(&[0x10; 32]), vec![], vec![])
    }

    /// S1 — empty base tx: the 44-byte literal fixture.
    #[test]
    fn s1_empty_base_tx_exact_bytes() {
        let header = empty_header(3);
        let packer = Packer::new(MAX_SIZE, 64);
        header.encode(&packer).unwrap();
        let bytes = packer.take_bytes();
        let mut expected = vec![0x00, 0x00, 0x00, 0x03];
        expected.extend([0x10u8; 32]);
        expected.extend([0x00, 0x00, 0x00, 0x00]);
        expected.extend([0x00, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[..], &expected[..]);
        assert_eq!(bytes.len(), 44);

        let unpacker = Packer::new_for_unpack(&bytes);
        let decoded = Header::decode(&unpacker).unwrap();
        unpacker.expect_exhausted().unwrap();
        assert_eq!(header, decoded);
    }

    fn output_for(seed: u8) -> TransferableOutput {
        TransferableOutput::new(
            ids::Id::from_slice(&[seed; 32]),
            Output::Transfer(TransferOutput::new(
                100,
                OutputOwners::new(0, 1, vec![short::Id::from_slice(&[seed; short::LEN])]),
            )),
        )
    }

    /// S2 — two orderings of the same outputs encode byte-identically.
    #[test]
    fn s2_output_order_does_not_affect_encoding() {
        let a = output_for(1);
        let b = output_for(2);
        assert!(a.canonical_bytes().unwrap() < b.canonical_bytes().unwrap());

        let header_ab = Header::new(
            3,
            ids::Id::from_slice(&[0x10; 32]),
            vec![a.clone(), b.clone()],
            vec![],
        );
        let header_ba = Header::new(3, ids::Id::from_slice(&[0x10; 32]), vec![b, a], vec![]);

        let p1 = Packer::new(MAX_SIZE, 256);
        header_ab.encode(&p1).unwrap();
        let p2 = Packer::new(MAX_SIZE, 256);
        header_ba.encode(&p2).unwrap();
        assert_eq!(p1.take_bytes(), p2.take_bytes());
    }

    /// S3 — create-asset name/symbol lengths and denomination byte.
    #[test]
    fn s3_create_asset_field_widths() {
        let tx = CreateAssetTx::new(
            empty_header(1),
            "TestAsset".to_string(),
            "TST".to_string(),
            9,
            vec![InitialState::new(
                tags::output::TRANSFER,
                vec![Output::Transfer(TransferOutput::new(
                    1,
                    OutputOwners::new(0, 1, vec![short::Id::empty()]),
                ))],
            )],
        )
        .unwrap();

        let packer = Packer::new(MAX_SIZE, 256);
        tx.encode_body(&packer).unwrap();
        let bytes = packer.take_bytes();

        // header is 44 bytes for an empty header; name length prefix follows.
        let name_len = u16::from_be_bytes([bytes[44], bytes[45]]);
        assert_eq!(name_len, 9);
        let symbol_len_offset = 44 + 2 + 9;
        let symbol_len = u16::from_be_bytes([
            bytes[symbol_len_offset],
            bytes[symbol_len_offset + 1],
        ]);
        assert_eq!(symbol_len, 3);
        let denomination_offset = symbol_len_offset + 2 + 3;
        assert_eq!(bytes[denomination_offset], 0x09);
    }

    /// S4 — denomination out of range is rejected at construction.
    #[test]
    fn s4_invalid_denomination_rejected() {
        let err = CreateAssetTx::new(
            empty_header(1),
            "A".to_string(),
            "A".to_string(),
            33,
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, Error::InvalidDenomination { value: 33 });
    }

    /// S7 — an unused transaction tag fails with `UnknownTypeId`.
    #[test]
    fn s7_unknown_tx_tag_rejected() {
        let packer = Packer::new(MAX_SIZE, 8);
        packer.pack_u32(0xFFFF_FFFF).unwrap();
        let bytes = packer.take_bytes();
        let unpacker = Packer::new_for_unpack(&bytes);
        let err = UnsignedTx::decode(&unpacker).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownTypeId {
                domain: "tx".to_string(),
                id: 0xFFFF_FFFF
            }
        );
    }

    #[test]
    fn round_trips_every_kind() {
        let header = Header::new(
            5,
            ids::Id::from_slice(&[7; 32]),
            vec![output_for(1)],
            vec![TransferableInput::new(
                UtxoId::new(ids::Id::from_slice(&[9; 32]), 0),
                ids::Id::from_slice(&[1; 32]),
                Input::Transfer(TransferInput::new(
                    100,
                    vec![SigIdx {
                        address_index: 0,
                        source: short::Id::empty(),
                    }],
                )),
            )],
        );

        let kinds = vec![
            UnsignedTx::Base(BaseTx::new(header.clone())),
            UnsignedTx::CreateAsset(
                CreateAssetTx::new(header.clone(), "N".into(), "S".into(), 2, vec![]).unwrap(),
            ),
            UnsignedTx::Operation(OperationTx::new(header.clone(), vec![])),
            UnsignedTx::Import(ImportTx::new(header.clone(), vec![])),
            UnsignedTx::Export(ExportTx::new(header, vec![])),
        ];

        for tx in kinds {
            let bytes = tx.to_bytes().unwrap();
            let unpacker = Packer::new_for_unpack(&bytes);
            let decoded = UnsignedTx::decode(&unpacker).unwrap();
            unpacker.expect_exhausted().unwrap();
            assert_eq!(tx, decoded);
        }
    }

    #[test]
    fn signed_tx_string_round_trip() {
        let header = empty_header(1);
        let unsigned = UnsignedTx::Base(BaseTx::new(header));
        let signed = SignedTx::new(unsigned, vec![]);
        let s = signed.to_string();
        let back: SignedTx = s.parse().unwrap();
        assert_eq!(signed, back);
    }
}
