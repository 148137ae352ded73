use datasize::DataSize;
use serde::{Deserialize, Serialize};

use crate::{
    bytesrepr::{allocate_buffer, Error, FromBytes, ToBytes, U8_SERIALIZED_LENGTH},
    Address, TransactionHash, ADDRESS_SERIALIZED_LENGTH, TRANSACTION_HASH_LENGTH,
};

const RECORD_VERSION: u8 = 0;

const INACTIVE_TAG: u8 = 0;
const ACTIVE_TAG: u8 = 1;
// Written by an early format version for a state that activation has since
// collapsed into `Active`; still accepted on decode.
const LEGACY_ACTIVE_TAG: u8 = 2;

/// The number of bytes in a serialized [`DeployRecord`]:
/// version(1) ‖ state(1) ‖ score_address(21) ‖ owner(21) ‖ current_tx_hash(32) ‖ next_tx_hash(32).
pub const DEPLOY_RECORD_SERIALIZED_LENGTH: usize =
    U8_SERIALIZED_LENGTH * 2 + ADDRESS_SERIALIZED_LENGTH * 2 + TRANSACTION_HASH_LENGTH * 2;

/// Activation state of a contract.
#[derive(Clone, Copy, DataSize, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DeployState {
    /// Recorded but not yet activated.
    Inactive,
    /// Code is live and callable.
    Active,
}

impl DeployState {
    fn tag(self) -> u8 {
        match self {
            DeployState::Inactive => INACTIVE_TAG,
            DeployState::Active => ACTIVE_TAG,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            INACTIVE_TAG => Ok(DeployState::Inactive),
            ACTIVE_TAG | LEGACY_ACTIVE_TAG => Ok(DeployState::Active),
            _ => Err(Error::Formatting),
        }
    }
}

/// Durable metadata describing a contract's current and pending code versions,
/// its owner, and its activation state.
///
/// There is at most one pending deployment per address at a time; the pending
/// hash is cleared when [`activate`](DeployRecord::activate) commits it.
#[derive(Clone, Copy, DataSize, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeployRecord {
    score_address: Address,
    deploy_state: DeployState,
    owner: Address,
    current_tx_hash: Option<TransactionHash>,
    next_tx_hash: Option<TransactionHash>,
}

impl DeployRecord {
    /// Constructs a new `DeployRecord`.
    pub fn new(
        score_address: Address,
        deploy_state: DeployState,
        owner: Address,
        current_tx_hash: Option<TransactionHash>,
        next_tx_hash: Option<TransactionHash>,
    ) -> DeployRecord {
        DeployRecord {
            score_address,
            deploy_state,
            owner,
            current_tx_hash,
            next_tx_hash,
        }
    }

    /// The contract address this record describes.
    pub fn score_address(&self) -> Address {
        self.score_address
    }

    /// The activation state.
    pub fn deploy_state(&self) -> DeployState {
        self.deploy_state
    }

    /// The owner recorded at first deployment; immutable for the lifetime of
    /// the address.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The hash of the transaction which produced the currently active code,
    /// or `None` for contracts installed outside normal transaction flow.
    pub fn current_tx_hash(&self) -> Option<TransactionHash> {
        self.current_tx_hash
    }

    /// The hash of the pending (not yet activated) deployment, if any.
    pub fn next_tx_hash(&self) -> Option<TransactionHash> {
        self.next_tx_hash
    }

    /// Replaces the pending deployment hash.
    pub fn set_next_tx_hash(&mut self, tx_hash: TransactionHash) {
        self.next_tx_hash = Some(tx_hash);
    }

    /// Commits the pending deployment: the pending hash becomes current, the
    /// pending slot is cleared and the record becomes active.
    pub fn activate(&mut self) {
        self.current_tx_hash = self.next_tx_hash.take();
        self.deploy_state = DeployState::Active;
    }
}

fn hash_or_sentinel(maybe_hash: Option<TransactionHash>) -> TransactionHash {
    maybe_hash.unwrap_or_else(TransactionHash::zero)
}

fn sentinel_as_none(hash: TransactionHash) -> Option<TransactionHash> {
    if hash.is_zero() {
        None
    } else {
        Some(hash)
    }
}

impl ToBytes for DeployRecord {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = allocate_buffer(self);
        buffer.push(RECORD_VERSION);
        buffer.push(self.deploy_state.tag());
        self.score_address.write_bytes(&mut buffer)?;
        self.owner.write_bytes(&mut buffer)?;
        hash_or_sentinel(self.current_tx_hash).write_bytes(&mut buffer)?;
        hash_or_sentinel(self.next_tx_hash).write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        DEPLOY_RECORD_SERIALIZED_LENGTH
    }
}

impl FromBytes for DeployRecord {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (_version, remainder) = u8::from_bytes(bytes)?;
        let (state_tag, remainder) = u8::from_bytes(remainder)?;
        let deploy_state = DeployState::from_tag(state_tag)?;
        let (score_address, remainder) = Address::from_bytes(remainder)?;
        let (owner, remainder) = Address::from_bytes(remainder)?;
        let (current_tx_hash, remainder) = TransactionHash::from_bytes(remainder)?;
        let (next_tx_hash, remainder) = TransactionHash::from_bytes(remainder)?;
        let record = DeployRecord {
            score_address,
            deploy_state,
            owner,
            current_tx_hash: sentinel_as_none(current_tx_hash),
            next_tx_hash: sentinel_as_none(next_tx_hash),
        };
        Ok((record, remainder))
    }
}
