//! Closed sets of u32 type tags for every polymorphic category. Adding a
//! kind is a source-level change here, not a runtime registration.
//! ref. the reference node's avm/platformvm codec registries.

pub mod tx {
    pub const BASE_TX: u32 = 0;
    pub const CREATE_ASSET_TX: u32 = 1;
    pub const OPERATION_TX: u32 = 2;
    pub const IMPORT_TX: u32 = 3;
    pub const EXPORT_TX: u32 = 4;
}

pub mod output {
    pub const TRANSFER: u32 = 7;
}

pub mod input {
    pub const TRANSFER: u32 = 5;
}

pub mod operation {
    pub const NFT_TRANSFER: u32 = 13;
}

pub mod credential {
    pub const SECP256K1: u32 = 9;
    pub const NFT: u32 = 14;
}

pub mod platform_tx {
    pub const ADD_DEFAULT_SUBNET_DELEGATOR_TX: u32 = 14;
}
