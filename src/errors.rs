//! Error types shared across the codec and signing pipeline.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure mode the codec and signer can produce. No exceptions cross
/// the API boundary; every fallible operation returns one of these.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("truncated input: expected at least {expected} bytes, {available} available")]
    Truncated { expected: usize, available: usize },

    #[error("trailing bytes after parse: {remaining} unread")]
    TrailingBytes { remaining: usize },

    #[error("unknown type id {id} in {domain} registry")]
    UnknownTypeId { domain: String, id: u32 },

    #[error("invalid denomination {value}, must be in 0..=32")]
    InvalidDenomination { value: u8 },

    #[error("invalid utf-8 in length-prefixed string")]
    InvalidUtf8,

    #[error("base58-with-checksum mismatch")]
    ChecksumMismatch,

    #[error("no key in keychain for address {address}")]
    MissingKey { address: String },

    #[error("signer rejected digest: {inner}")]
    SignerFailure { inner: String },

    #[error("internal invariant violated: {detail}")]
    InvariantViolation { detail: String },
}
