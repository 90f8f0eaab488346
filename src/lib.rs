//! Deterministic transaction codec and signing core for a multi-chain
//! UTXO-style ledger: an asset-exchange chain (transfers, asset creation,
//! cross-chain import/export, NFT operations) and a platform chain
//! (delegator staking). Transport, wallet UX, curve math, and UTXO
//! selection are all out of scope — this crate only turns bytes into
//! typed transactions and back, and turns an `UnsignedTx` plus a keychain
//! into a `SignedTx`.
pub mod errors;
pub mod formatting;
pub mod hash;
pub mod ids;
pub mod key;
pub mod packer;
pub mod platform;
pub mod registry;
pub mod signing;
pub mod tags;
pub mod txs;

pub use errors::{Error, Result};
