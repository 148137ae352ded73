use thiserror::Error as ThisError;

use keystone_types::Address;

/// The deploy engine's error type.
///
/// Every variant rejects the transaction it occurred in and surfaces to the
/// transaction-processing caller; earlier transactions in the block are
/// unaffected and nothing is retried inside the engine.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The deployment target is not a well-formed, non-zero contract address.
    #[error("invalid deployment target: {0}")]
    InvalidTarget(Address),

    /// The target address is on the deny-list.
    #[error("blacklisted contract address: {0}")]
    Blacklisted(Address),

    /// The originator is not on the deployer allow-list.
    #[error("deployer not allow-listed: {0}")]
    UnauthorizedDeployer(Address),

    /// The payload's content type is not a recognized format.
    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    /// The payload's content bytes are malformed for their declared type.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// The operation requires an ambient transaction, but none is set.
    #[error("no transaction context")]
    NoTransactionContext,

    /// Deploy-record storage failure.
    #[error(transparent)]
    Storage(#[from] keystone_storage::deploy::Error),

    /// Runtime collaborator failure.
    #[error(transparent)]
    Runtime(#[from] crate::runtime::Error),
}
