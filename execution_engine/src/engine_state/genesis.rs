//! One-time seeding of system contracts' deploy records.
//!
//! Builtins are trusted by construction: they are recorded as active with
//! sentinel transaction hashes and their install hooks run without the audit
//! gate.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::{error, info};

use keystone_storage::KeyValueStore;
use keystone_types::{
    deploy::{DeployRecord, DeployState},
    Address, TransactionHash, ADDRESS_BODY_LENGTH,
};

use crate::runtime::{self, HookParams};

use super::{DeployEngine, Error};

/// The governance system contract's address.
pub static GOVERNANCE_ADDRESS: Lazy<Address> = Lazy::new(|| {
    let mut body = [0u8; ADDRESS_BODY_LENGTH];
    body[ADDRESS_BODY_LENGTH - 1] = 1;
    Address::contract(body)
});

/// Recognized system contracts, by name.
pub static BUILTIN_SCORES: Lazy<BTreeMap<&'static str, Address>> =
    Lazy::new(|| BTreeMap::from([("governance", *GOVERNANCE_ADDRESS)]));

/// Returns `true` if `address` is a recognized system contract.
pub fn is_builtin_score(address: Address) -> bool {
    BUILTIN_SCORES.values().any(|builtin| *builtin == address)
}

/// Source lookup for packaged system contracts.
pub trait BuiltinSources {
    /// Returns the packaged source of the named system contract.
    fn source(&self, name: &str) -> Result<Vec<u8>, runtime::Error>;
}

/// Deploys every recognized system contract which has never been deployed.
pub struct BuiltinLoader<'a, S> {
    engine: &'a DeployEngine<S>,
    sources: &'a dyn BuiltinSources,
}

impl<'a, S: KeyValueStore> BuiltinLoader<'a, S> {
    /// Creates a loader seeding builtins through `engine`.
    pub fn new(engine: &'a DeployEngine<S>, sources: &'a dyn BuiltinSources) -> BuiltinLoader<'a, S> {
        BuiltinLoader { engine, sources }
    }

    /// Seeds every recognized system contract not already active, owned by
    /// `owner`.
    pub fn load_builtin_scores(&self, owner: Address) -> Result<(), Error> {
        for (name, address) in BUILTIN_SCORES.iter() {
            if !self.engine.storage().is_active(*address)? {
                self.load_builtin_score(name, *address, owner)?;
            }
        }
        Ok(())
    }

    fn load_builtin_score(
        &self,
        name: &str,
        address: Address,
        owner: Address,
    ) -> Result<(), Error> {
        let record = DeployRecord::new(address, DeployState::Active, owner, None, None);
        let tx_hash = TransactionHash::zero();

        let content = self.sources.source(name)?;
        self.engine.code_store.materialize(address, tx_hash, &content)?;

        let mut contract = self.engine.contract_runtime.instantiate(address, tx_hash)?;
        contract.on_install(&HookParams::new()).map_err(|err| {
            error!(%address, %err, "failed to deploy builtin score");
            Error::from(err)
        })?;

        // The record is persisted only once the install hook has succeeded.
        self.engine.storage().put_record(&record)?;
        info!(name, %address, "deployed builtin score");
        Ok(())
    }
}
