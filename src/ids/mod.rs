//! 32-byte opaque identifiers: asset ids, blockchain ids, transaction ids.
pub mod short;

use std::{fmt, str::FromStr};

use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

use crate::{formatting, hash};

pub const LEN: usize = 32;

/// A fixed 32-byte identifier. Printed and parsed as base-58-with-checksum.
#[derive(Debug, Clone, Copy, Eq, AsBytes, FromZeroes, FromBytes, Unaligned)]
#[repr(transparent)]
pub struct Id([u8; LEN]);

impl Default for Id {
    fn default() -> Self {
        Self::empty()
    }
}

impl Id {
    pub fn empty() -> Self {
        Id([0; LEN])
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Pads or truncates `d` to exactly `LEN` bytes. Used by tests and
    /// callers constructing ids from arbitrary byte slices.
    pub fn from_slice(d: &[u8]) -> Self {
        assert!(d.len() <= LEN, "id source longer than {LEN} bytes");
        let mut buf = [0u8; LEN];
        buf[..d.len()].copy_from_slice(d);
        Id(buf)
    }

    pub fn sha256(d: impl AsRef<[u8]>) -> Self {
        Id(hash::sha256(d))
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Id) -> bool {
        self.0 == other.0
    }
}

impl std::hash::Hash for Id {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Id) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Id) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", formatting::b58_encode_with_checksum(&self.0))
    }
}

impl FromStr for Id {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decoded = formatting::b58_decode_with_checksum(s.trim())?;
        Ok(Self::from_slice(&decoded))
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Id, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;
        impl<'de> Visitor<'de> for IdVisitor {
            type Value = Id;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a base-58 encoded id with checksum")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Id::from_str(v).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(Id::default().is_empty());
    }

    #[test]
    fn display_from_str_round_trip() {
        let id = Id::from_slice(&[1, 2, 3, 4, 5]);
        let s = id.to_string();
        let parsed: Id = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_round_trip() {
        #[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
        struct Wrapper {
            id: Id,
        }
        let w = Wrapper {
            id: Id::from_slice(&[9, 9, 9]),
        };
        let json = serde_json::to_string(&w).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }

    #[test]
    fn ordering_is_byte_lexicographic() {
        let a = Id::from_slice(&[1]);
        let b = Id::from_slice(&[2]);
        assert!(a < b);
    }
}
