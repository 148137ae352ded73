//! Durable storage for deploy records and deploy transaction parameters,
//! namespaced under reserved key prefixes.

use thiserror::Error as ThisError;
use tracing::debug;

use keystone_types::{
    bytesrepr::{self, ToBytes},
    deploy::{DeployData, DeployRecord, DeployState, DeployTxParams, DeployType},
    Address, TransactionHash,
};

use crate::global_state::{self, KeyValueStore};

const DEPLOY_RECORD_PREFIX: &[u8] = b"isds|di|";
const DEPLOY_TX_PARAMS_PREFIX: &[u8] = b"isds|dtp|";

/// Errors raised by deploy-record storage.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Failure of the underlying key-value store.
    #[error(transparent)]
    Store(#[from] global_state::Error),

    /// A stored record does not decode as its fixed binary layout. Fatal for
    /// the affected read only; other records are unaffected.
    #[error("corrupt record: {0}")]
    CorruptRecord(#[from] bytesrepr::Error),

    /// No deploy record exists for the address.
    #[error("no deploy record for {0}")]
    RecordNotFound(Address),

    /// No deploy params are stored under the transaction hash.
    #[error("no deploy params for {0}")]
    ParamsNotFound(TransactionHash),

    /// Params have already been recorded under the transaction hash; they are
    /// immutable once written.
    #[error("deploy params already exist: {0}")]
    DuplicateTxParams(TransactionHash),

    /// The stored owner differs from the supplied owner.
    #[error("invalid owner: {stored} != {supplied}")]
    OwnerMismatch {
        /// The owner recorded at first deployment.
        stored: Address,
        /// The owner supplied with the rejected operation.
        supplied: Address,
    },

    /// The supplied hash does not match the pending deployment.
    #[error("invalid activation tx hash: {supplied} != pending {pending:?}")]
    TxHashMismatch {
        /// The hash supplied to `activate`.
        supplied: TransactionHash,
        /// The pending hash on the record, if any.
        pending: Option<TransactionHash>,
    },
}

/// CRUD over [`DeployRecord`]s (keyed by contract address) and
/// [`DeployTxParams`] (keyed by transaction hash), plus the composite write
/// protocols of the deployment lifecycle.
///
/// All failures reject the requested state transition and leave prior durable
/// state untouched; validation happens before the first write.
#[derive(Clone, Debug)]
pub struct DeployStorage<S> {
    store: S,
}

impl<S: KeyValueStore> DeployStorage<S> {
    /// Creates deploy storage over `store`.
    pub fn new(store: S) -> DeployStorage<S> {
        DeployStorage { store }
    }

    fn record_key(score_address: Address) -> Vec<u8> {
        let mut key = DEPLOY_RECORD_PREFIX.to_vec();
        key.extend_from_slice(&score_address.to_array());
        key
    }

    fn tx_params_key(tx_hash: TransactionHash) -> Vec<u8> {
        let mut key = DEPLOY_TX_PARAMS_PREFIX.to_vec();
        key.extend_from_slice(tx_hash.as_bytes());
        key
    }

    /// Records a new deployment transaction: writes its [`DeployTxParams`]
    /// and creates or updates the target's [`DeployRecord`] with the new
    /// pending hash.
    ///
    /// A record's owner is immutable once set; a pending deployment that is
    /// superseded before activation has its params entry reclaimed, so there
    /// is never more than one live pending deployment per address.
    pub fn put_tx_params_and_record(
        &self,
        score_address: Address,
        deploy_type: DeployType,
        owner: Address,
        tx_hash: TransactionHash,
        deploy_data: DeployData,
    ) -> Result<(), Error> {
        if self.get_tx_params(tx_hash)?.is_some() {
            return Err(Error::DuplicateTxParams(tx_hash));
        }

        let record = match self.get_record(score_address)? {
            None => {
                DeployRecord::new(score_address, DeployState::Inactive, owner, None, Some(tx_hash))
            }
            Some(mut record) => {
                if record.owner() != owner {
                    return Err(Error::OwnerMismatch {
                        stored: record.owner(),
                        supplied: owner,
                    });
                }
                if let Some(superseded) = record.next_tx_hash() {
                    debug!(%score_address, %superseded, "reclaiming superseded deploy params");
                    self.store.delete(&Self::tx_params_key(superseded))?;
                }
                record.set_next_tx_hash(tx_hash);
                record
            }
        };

        let tx_params = DeployTxParams::new(tx_hash, deploy_type, score_address, deploy_data);
        self.put_tx_params(&tx_params)?;
        self.put_record(&record)
    }

    /// Commits the pending deployment for `score_address`: the pending hash
    /// becomes current, the pending slot is cleared and the record becomes
    /// active.
    ///
    /// When `tx_hash` is given it must equal the pending hash; `None` is
    /// permitted only for builtin activation paths that bypass normal
    /// transaction flow. After persisting, the activated params entry is
    /// checked to still exist.
    pub fn activate(
        &self,
        score_address: Address,
        tx_hash: Option<TransactionHash>,
    ) -> Result<(), Error> {
        let mut record = self
            .get_record(score_address)?
            .ok_or(Error::RecordNotFound(score_address))?;

        if let Some(supplied) = tx_hash {
            if record.next_tx_hash() != Some(supplied) {
                return Err(Error::TxHashMismatch {
                    supplied,
                    pending: record.next_tx_hash(),
                });
            }
        }

        record.activate();
        self.put_record(&record)?;

        if let Some(current) = record.current_tx_hash() {
            if self.get_tx_params(current)?.is_none() {
                return Err(Error::ParamsNotFound(current));
            }
        }
        Ok(())
    }

    /// Returns `true` iff a record exists for `score_address` and its state is
    /// active.
    pub fn is_active(&self, score_address: Address) -> Result<bool, Error> {
        Ok(self
            .get_record(score_address)?
            .map_or(false, |record| record.deploy_state() == DeployState::Active))
    }

    /// Returns the owner recorded for `score_address`, if a record exists.
    pub fn get_owner(&self, score_address: Address) -> Result<Option<Address>, Error> {
        Ok(self.get_record(score_address)?.map(|record| record.owner()))
    }

    /// Returns the deploy record for `score_address`, if any.
    pub fn get_record(&self, score_address: Address) -> Result<Option<DeployRecord>, Error> {
        match self.store.get(&Self::record_key(score_address))? {
            Some(bytes) => Ok(Some(bytesrepr::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Persists `record` under its address key.
    pub fn put_record(&self, record: &DeployRecord) -> Result<(), Error> {
        let value = record.to_bytes()?;
        Ok(self
            .store
            .put(&Self::record_key(record.score_address()), &value)?)
    }

    /// Returns the deploy params stored under `tx_hash`, if any.
    pub fn get_tx_params(
        &self,
        tx_hash: TransactionHash,
    ) -> Result<Option<DeployTxParams>, Error> {
        match self.store.get(&Self::tx_params_key(tx_hash))? {
            Some(bytes) => Ok(Some(bytesrepr::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_tx_params(&self, tx_params: &DeployTxParams) -> Result<(), Error> {
        let value = tx_params.to_bytes()?;
        Ok(self
            .store
            .put(&Self::tx_params_key(tx_params.tx_hash()), &value)?)
    }
}
