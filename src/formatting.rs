//! Base-58-with-checksum string codec (`formatting.CB58` in the reference
//! node's terms): a 4-byte checksum — the first 4 bytes of
//! `sha256(sha256(payload))` — is appended to the payload before base-58
//! encoding; decoding verifies and strips it.
use bs58::{decode::DecodeBuilder, encode::EncodeBuilder, Alphabet};

use crate::errors::{Error, Result};

/// Encodes `d` as base-58 with a trailing 4-byte double-SHA256 checksum.
pub fn b58_encode_with_checksum(d: &[u8]) -> String {
    EncodeBuilder::new(d, Alphabet::DEFAULT)
        .as_cb58(None)
        .into_string()
}

/// Decodes a base-58-with-checksum string, verifying the checksum.
/// Fails with `ChecksumMismatch` if the checksum does not match.
pub fn b58_decode_with_checksum(s: &str) -> Result<Vec<u8>> {
    DecodeBuilder::new(s.trim(), Alphabet::DEFAULT)
        .as_cb58(None)
        .into_vec()
        .map_err(|_| Error::ChecksumMismatch)
}
