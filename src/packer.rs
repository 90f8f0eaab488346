//! Low-level big-endian byte-packing utilities: the primitive codec layer.
//!
//! Mirrors the interior-mutable `Cell<BytesMut>` packer design so that
//! `pack_*`/`unpack_*` calls can be chained through `&self` without a `mut`
//! borrow threaded through every call site — the packer is always used
//! single-threaded per call (see the crate's concurrency notes).
use std::cell::Cell;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::errors::{Error, Result};

pub const BYTE_LEN: usize = 1;
pub const U16_LEN: usize = 2;
pub const U32_LEN: usize = 4;
pub const U64_LEN: usize = 8;

/// Longest string payload a length-prefixed u16 can address.
pub const MAX_STR_LEN: u16 = u16::MAX - 1;

/// A generous ceiling on total transaction size. Transactions this codec
/// handles are at most a few kilobytes; this bound only exists to catch
/// pathological inputs before they cause unbounded allocation.
pub const MAX_SIZE: usize = 1 << 24;

/// Packs and unpacks a byte buffer, tracking a read/write offset.
///
/// On encode the buffer starts empty and grows as values are packed. On
/// decode the buffer is the caller's input slice and the offset walks
/// forward as values are unpacked; decode never re-orders or copies more
/// than what each `unpack_*` call asks for.
pub struct Packer {
    max_size: usize,
    bytes: Cell<BytesMut>,
    offset: Cell<usize>,
}

impl Packer {
    /// Creates an empty packer for encoding, with room to grow up to
    /// `max_size` bytes.
    pub fn new(max_size: usize, initial_cap: usize) -> Self {
        Self {
            max_size,
            bytes: Cell::new(BytesMut::with_capacity(initial_cap)),
            offset: Cell::new(0),
        }
    }

    /// Creates a packer over existing bytes, offset at the start, for
    /// decoding.
    pub fn new_for_unpack(b: &[u8]) -> Self {
        Self {
            max_size: b.len(),
            bytes: Cell::new(BytesMut::from(b)),
            offset: Cell::new(0),
        }
    }

    /// Consumes the packer, returning the packed bytes. Leaves the packer's
    /// internal buffer empty; only call once encoding is complete.
    pub fn take_bytes(&self) -> Bytes {
        let mut b = self.bytes.take();
        let n = b.len();
        b.copy_to_bytes(n)
    }

    pub fn offset(&self) -> usize {
        self.offset.get()
    }

    fn set_offset(&self, offset: usize) {
        self.offset.set(offset)
    }

    fn len(&self) -> usize {
        let b = self.bytes.take();
        let n = b.len();
        self.bytes.set(b);
        n
    }

    /// Returns `TrailingBytes` if the decode cursor did not consume every
    /// byte in the input.
    pub fn expect_exhausted(&self) -> Result<()> {
        let remaining = self.len().saturating_sub(self.offset());
        if remaining != 0 {
            return Err(Error::TrailingBytes { remaining });
        }
        Ok(())
    }

    fn expand(&self, n: usize) -> Result<()> {
        let needed = self.offset() + n;
        if needed <= self.len() {
            return Ok(());
        }
        if needed > self.max_size {
            return Err(Error::InvariantViolation {
                detail: format!("needed_size {needed} exceeds max_size {}", self.max_size),
            });
        }
        let mut b = self.bytes.take();
        b.resize(needed, 0);
        self.bytes.set(b);
        Ok(())
    }

    fn check_remaining(&self, n: usize) -> Result<()> {
        let available = self.len().saturating_sub(self.offset());
        if n > available {
            return Err(Error::Truncated {
                expected: n,
                available,
            });
        }
        Ok(())
    }

    pub fn pack_byte(&self, v: u8) -> Result<()> {
        self.expand(BYTE_LEN)?;
        let offset = self.offset();
        let mut b = self.bytes.take();
        b[offset] = v;
        self.bytes.set(b);
        self.set_offset(offset + BYTE_LEN);
        Ok(())
    }

    pub fn unpack_byte(&self) -> Result<u8> {
        self.check_remaining(BYTE_LEN)?;
        let offset = self.offset();
        let b = self.bytes.take();
        let v = b[offset];
        self.bytes.set(b);
        self.set_offset(offset + BYTE_LEN);
        Ok(v)
    }

    pub fn pack_u16(&self, v: u16) -> Result<()> {
        self.expand(U16_LEN)?;
        let offset = self.offset();
        let mut b = self.bytes.take();
        (&mut b[offset..offset + U16_LEN]).put_u16(v);
        self.bytes.set(b);
        self.set_offset(offset + U16_LEN);
        Ok(())
    }

    pub fn unpack_u16(&self) -> Result<u16> {
        self.check_remaining(U16_LEN)?;
        let offset = self.offset();
        let b = self.bytes.take();
        let v = u16::from_be_bytes([b[offset], b[offset + 1]]);
        self.bytes.set(b);
        self.set_offset(offset + U16_LEN);
        Ok(v)
    }

    pub fn pack_u32(&self, v: u32) -> Result<()> {
        self.expand(U32_LEN)?;
        let offset = self.offset();
        let mut b = self.bytes.take();
        (&mut b[offset..offset + U32_LEN]).put_u32(v);
        self.bytes.set(b);
        self.set_offset(offset + U32_LEN);
        Ok(())
    }

    pub fn unpack_u32(&self) -> Result<u32> {
        self.check_remaining(U32_LEN)?;
        let offset = self.offset();
        let b = self.bytes.take();
        let pos = &b[offset..offset + U32_LEN];
        let v = u32::from_be_bytes([pos[0], pos[1], pos[2], pos[3]]);
        self.bytes.set(b);
        self.set_offset(offset + U32_LEN);
        Ok(v)
    }

    pub fn pack_u64(&self, v: u64) -> Result<()> {
        self.expand(U64_LEN)?;
        let offset = self.offset();
        let mut b = self.bytes.take();
        (&mut b[offset..offset + U64_LEN]).put_u64(v);
        self.bytes.set(b);
        self.set_offset(offset + U64_LEN);
        Ok(())
    }

    pub fn unpack_u64(&self) -> Result<u64> {
        self.check_remaining(U64_LEN)?;
        let offset = self.offset();
        let b = self.bytes.take();
        let pos = &b[offset..offset + U64_LEN];
        let v = u64::from_be_bytes(pos.try_into().unwrap());
        self.bytes.set(b);
        self.set_offset(offset + U64_LEN);
        Ok(v)
    }

    /// Writes a fixed-length byte array verbatim (no length prefix) — used
    /// for 32-byte ids, 20-byte addresses, and 65-byte signatures.
    pub fn pack_bytes(&self, v: &[u8]) -> Result<()> {
        let n = v.len();
        self.expand(n)?;
        let offset = self.offset();
        let mut b = self.bytes.take();
        b[offset..offset + n].copy_from_slice(v);
        self.bytes.set(b);
        self.set_offset(offset + n);
        Ok(())
    }

    pub fn unpack_bytes(&self, n: usize) -> Result<Vec<u8>> {
        self.check_remaining(n)?;
        let offset = self.offset();
        let b = self.bytes.take();
        let v = b[offset..offset + n].to_vec();
        self.bytes.set(b);
        self.set_offset(offset + n);
        Ok(v)
    }

    /// Reads a fixed-size array, failing with `Truncated` if short.
    pub fn unpack_fixed<const N: usize>(&self) -> Result<[u8; N]> {
        let v = self.unpack_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&v);
        Ok(out)
    }

    /// `u16` length prefix followed by UTF-8 bytes.
    pub fn pack_str(&self, v: &str) -> Result<()> {
        let n = v.len() as u16;
        if (v.len() as u64) > u64::from(MAX_STR_LEN) {
            return Err(Error::InvariantViolation {
                detail: format!("string length {} exceeds max {}", v.len(), MAX_STR_LEN),
            });
        }
        self.pack_u16(n)?;
        self.pack_bytes(v.as_bytes())
    }

    pub fn unpack_str(&self) -> Result<String> {
        let n = self.unpack_u16()?;
        let d = self.unpack_bytes(n as usize)?;
        String::from_utf8(d).map_err(|_| Error::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_primitives() {
        let p = Packer::new(MAX_SIZE, 32);
        p.pack_byte(7).unwrap();
        p.pack_u16(0xBEEF).unwrap();
        p.pack_u32(0xDEAD_BEEF).unwrap();
        p.pack_u64(0x0123_4567_89AB_CDEF).unwrap();
        p.pack_str("hi").unwrap();
        let bytes = p.take_bytes();

        let q = Packer::new_for_unpack(&bytes);
        assert_eq!(q.unpack_byte().unwrap(), 7);
        assert_eq!(q.unpack_u16().unwrap(), 0xBEEF);
        assert_eq!(q.unpack_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(q.unpack_u64().unwrap(), 0x0123_4567_89AB_CDEF);
        assert_eq!(q.unpack_str().unwrap(), "hi");
        q.expect_exhausted().unwrap();
    }

    #[test]
    fn truncated_read_fails() {
        let p = Packer::new_for_unpack(&[0x00, 0x01]);
        let err = p.unpack_u32().unwrap_err();
        assert_eq!(
            err,
            Error::Truncated {
                expected: 4,
                available: 2
            }
        );
    }

    #[test]
    fn trailing_bytes_detected() {
        let p = Packer::new_for_unpack(&[0x01, 0x02, 0x03]);
        p.unpack_byte().unwrap();
        let err = p.expect_exhausted().unwrap_err();
        assert_eq!(err, Error::TrailingBytes { remaining: 2 });
    }

    #[test]
    fn big_endian_order() {
        let p = Packer::new(MAX_SIZE, 4);
        p.pack_u32(0x0102_0304).unwrap();
        assert_eq!(&p.take_bytes()[..], &[0x01, 0x02, 0x03, 0x04]);
    }
}
