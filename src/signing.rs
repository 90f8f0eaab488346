//! The asset-chain signing pipeline: canonical encode, hash, one
//! credential per signable element in canonical iteration order.
use crate::errors::{Error, Result};
use crate::key::{Keychain, Signer};
use crate::txs::credential::Credential;
use crate::txs::{SignedTx, UnsignedTx};

/// Signs `unsigned` with `keychain`, producing a `SignedTx` whose
/// credentials correspond positionally to `unsigned.signable_elements()`.
/// Fails with `MissingKey` if any required signer is absent from the
/// keychain, or `SignerFailure` if a signer rejects the digest. No partial
/// result is ever returned — a failure anywhere aborts the whole call.
pub fn sign<S: Signer>(unsigned: UnsignedTx, keychain: &Keychain<S>) -> Result<SignedTx> {
    let digest = unsigned.digest()?;
    let elements = unsigned.signable_elements();
    let mut credentials = Vec::with_capacity(elements.len());

    for element in elements {
        let mut signatures = Vec::with_capacity(element.sig_idxs.len());
        for sig_idx in &element.sig_idxs {
            let signer = keychain.get(&sig_idx.source).ok_or_else(|| {
                log::warn!("no signer registered for address {}", sig_idx.source);
                Error::MissingKey {
                    address: sig_idx.source.to_string(),
                }
            })?;
            let signature = signer.sign(&digest).map_err(|e| {
                log::warn!("signer for {} rejected the digest: {e}", sig_idx.source);
                Error::SignerFailure { inner: e.to_string() }
            })?;
            signatures.push(signature);
        }
        credentials.push(Credential::new(element.credential_id, signatures));
    }

    Ok(SignedTx::new(unsigned, credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids;
    use crate::ids::short;
    use crate::key::mock::MockSigner;
    use crate::key::SigIdx;
    use crate::txs::input::{Input, TransferInput, TransferableInput};
    use crate::txs::operation::{NftTransferOp, Operation, TransferableOperation};
    use crate::txs::output::{Output, OutputOwners, TransferOutput, TransferableOutput};
    use crate::txs::utxo::UtxoId;
    use crate::txs::{BaseTx, Header, OperationTx};

    fn sig_idx(address_index: u32, addr_seed: u8) -> SigIdx {
        SigIdx {
            address_index,
            source: short::Id::from_slice(&[addr_seed; short::LEN]),
        }
    }

    fn output(addr_seed: u8) -> TransferableOutput {
        TransferableOutput::new(
            ids::Id::from_slice(&[1; 32]),
            Output::Transfer(TransferOutput::new(
                100,
                OutputOwners::new(0, 1, vec![short::Id::from_slice(&[addr_seed; short::LEN])]),
            )),
        )
    }

    fn input(tx_seed: u8, sig_idxs: Vec<SigIdx>) -> TransferableInput {
        TransferableInput::new(
            UtxoId::new(ids::Id::from_slice(&[tx_seed; 32]), 0),
            ids::Id::from_slice(&[1; 32]),
            Input::Transfer(TransferInput::new(50, sig_idxs)),
        )
    }

    /// S5 — two inputs each requiring two signatures, one NFT operation
    /// requiring one, yields three credentials with counts `[2, 2, 1]`.
    #[test]
    fn s5_credential_signature_counts() {
        let header = Header::new(
            1,
            ids::Id::from_slice(&[9; 32]),
            vec![output(1)],
            vec![
                input(1, vec![sig_idx(0, 1), sig_idx(1, 2)]),
                input(2, vec![sig_idx(0, 3), sig_idx(1, 4)]),
            ],
        );
        let operation = TransferableOperation::new(
            ids::Id::from_slice(&[1; 32]),
            vec![UtxoId::new(ids::Id::from_slice(&[3; 32]), 0)],
            Operation::NftTransfer(NftTransferOp::new(
                0,
                vec![],
                OutputOwners::new(0, 1, vec![short::Id::from_slice(&[5; short::LEN])]),
                vec![sig_idx(0, 5)],
            )),
        );
        let unsigned = UnsignedTx::Operation(OperationTx::new(header, vec![operation]));

        let mut keychain = Keychain::new();
        for seed in 1..=5u8 {
            keychain.insert(MockSigner::new(short::Id::from_slice(&[seed; short::LEN]), seed));
        }

        let signed = sign(unsigned, &keychain).unwrap();
        assert_eq!(signed.credentials.len(), 3);
        let counts: Vec<usize> = signed.credentials.iter().map(|c| c.signatures.len()).collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    /// RUST_LOG=debug cargo test --lib -- signing::tests::missing_key_fails --exact --show-output
    #[test]
    fn missing_key_fails() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let header = Header::new(
            1,
            ids::Id::from_slice(&[9; 32]),
            vec![],
            vec![input(1, vec![sig_idx(0, 99)])],
        );
        let unsigned = UnsignedTx::Base(BaseTx::new(header));
        let keychain: Keychain<MockSigner> = Keychain::new();
        let err = sign(unsigned, &keychain).unwrap_err();
        assert!(matches!(err, Error::MissingKey { .. }));
    }

    #[test]
    fn signing_is_deterministic() {
        let header = Header::new(
            1,
            ids::Id::from_slice(&[9; 32]),
            vec![],
            vec![input(1, vec![sig_idx(0, 1)])],
        );
        let mut keychain = Keychain::new();
        keychain.insert(MockSigner::new(short::Id::from_slice(&[1; short::LEN]), 1));

        let unsigned_a = UnsignedTx::Base(BaseTx::new(header.clone()));
        let unsigned_b = UnsignedTx::Base(BaseTx::new(header));
        let signed_a = sign(unsigned_a, &keychain).unwrap();
        let signed_b = sign(unsigned_b, &keychain).unwrap();
        assert_eq!(signed_a.credentials, signed_b.credentials);
    }
}
