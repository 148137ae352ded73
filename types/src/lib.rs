//! Types shared by many parts of the Keystone contract-execution engine.
//!
//! The deploy record and deploy transaction-parameter formats defined here are
//! consensus-normative: every node must produce byte-identical encodings.

#![doc(html_root_url = "https://docs.rs/keystone-types/0.1.0")]
#![warn(missing_docs)]

mod address;
pub mod bytesrepr;
pub mod deploy;
mod transaction_hash;

pub use address::{
    Address, AddressKind, FromStrError, ADDRESS_BODY_LENGTH, ADDRESS_SERIALIZED_LENGTH,
    ZERO_CONTRACT_ADDRESS,
};
pub use transaction_hash::{TransactionHash, TRANSACTION_HASH_LENGTH};
