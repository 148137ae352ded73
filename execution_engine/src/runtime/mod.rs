//! Interfaces to the collaborators that materialize, validate and run
//! contract code.
//!
//! The engine never loads code itself: it drives these traits, which are
//! injected at construction. A contract instance is an opaque handle behind
//! [`Contract`], so any loading strategy (plugin registry, process sandbox,
//! in-tree fixtures for tests) can stand behind them.

use thiserror::Error as ThisError;

use keystone_types::{Address, TransactionHash};
use serde_json::{Map, Value};

/// Parameters passed to a contract's install or update hook, in submission
/// order.
pub type HookParams = Map<String, Value>;

/// Errors surfaced by runtime collaborators.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Code materialization failed.
    #[error("code materialization failed: {0}")]
    Materialize(String),

    /// Static package validation failed.
    #[error("package validation failed: {0}")]
    Validate(String),

    /// Contract instantiation failed.
    #[error("contract instantiation failed: {0}")]
    Instantiate(String),

    /// A contract hook reported an error.
    #[error("contract hook failed: {0}")]
    Hook(String),
}

/// Writes package content to the code-storage area indexed by
/// `(address, tx_hash)`.
pub trait CodeStore {
    /// Materializes `content` for the given address and transaction hash.
    ///
    /// Idempotent: re-materializing an already-present path is a no-op, not an
    /// error.
    fn materialize(
        &self,
        address: Address,
        tx_hash: TransactionHash,
        content: &[u8],
    ) -> Result<(), Error>;
}

/// Instantiates contract code previously materialized under
/// `(address, tx_hash)`.
pub trait ContractRuntime {
    /// Returns a handle to a fresh instance of the contract.
    fn instantiate(
        &self,
        address: Address,
        tx_hash: TransactionHash,
    ) -> Result<Box<dyn Contract>, Error>;
}

/// A loaded contract instance.
pub trait Contract {
    /// Called exactly once when the contract is installed.
    fn on_install(&mut self, params: &HookParams) -> Result<(), Error>;

    /// Called when the contract's code is updated.
    fn on_update(&mut self, params: &HookParams) -> Result<(), Error>;
}

/// Static validation of a materialized package.
pub trait PackageValidator {
    /// Validates the package materialized under `(address, tx_hash)`.
    fn validate(&self, address: Address, tx_hash: TransactionHash) -> Result<(), Error>;
}
