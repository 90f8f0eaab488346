//! Generic type-tag registry. Every polymorphic category (outputs, inputs,
//! operations, credentials, asset-chain transactions, platform-chain
//! transactions) is a closed set of variants dispatched by a u32 tag read
//! off the wire; a registry maps that tag to a decoder. This replaces the
//! reflection-based `SelectXClass(id, ...)` factory the wire format was
//! originally designed around with a tagged-variant plus central table.
use std::collections::HashMap;

use crate::errors::{Error, Result};
use crate::packer::Packer;

pub type Decoder<T> = fn(&Packer) -> Result<T>;

pub struct Registry<T> {
    domain: &'static str,
    decoders: HashMap<u32, Decoder<T>>,
}

impl<T> Registry<T> {
    pub fn new(domain: &'static str) -> Self {
        Self {
            domain,
            decoders: HashMap::new(),
        }
    }

    /// Registers `decoder` for `type_id`. Panics on a duplicate
    /// registration — that is a programming error in the static table, not
    /// a runtime condition callers can recover from.
    pub fn register(&mut self, type_id: u32, decoder: Decoder<T>) -> &mut Self {
        let prior = self.decoders.insert(type_id, decoder);
        assert!(
            prior.is_none(),
            "duplicate type id {type_id} registered in {} registry",
            self.domain
        );
        self
    }

    pub fn decode(&self, type_id: u32, packer: &Packer) -> Result<T> {
        let decoder = self.decoders.get(&type_id).ok_or_else(|| {
            log::debug!("unregistered type id {type_id} in {} registry", self.domain);
            Error::UnknownTypeId {
                domain: self.domain.to_string(),
                id: type_id,
            }
        })?;
        decoder(packer)
    }

    pub fn contains(&self, type_id: u32) -> bool {
        self.decoders.contains_key(&type_id)
    }
}
