use std::collections::BTreeSet;

use bitflags::bitflags;

use keystone_types::{Address, TransactionHash};

bitflags! {
    /// Governance-controlled service toggles.
    pub struct ServiceFlags: u8 {
        /// Fee processing is enabled.
        const FEE = 0b0001;
        /// Deployments require a governance audit before activation.
        const AUDIT = 0b0010;
        /// Only allow-listed accounts may submit deployments.
        const DEPLOYER_WHITE_LIST = 0b0100;
        /// Run static package validation after materialization.
        const PACKAGE_VALIDATOR = 0b1000;
    }
}

/// The transaction being processed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransactionContext {
    /// The transaction originator.
    pub origin: Address,
    /// The transaction hash.
    pub hash: TransactionHash,
}

/// The message observed by an executing contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Message {
    /// The sender the contract sees.
    pub sender: Address,
}

/// Ambient state for one transaction's execution: originator and hash, the
/// chain's active ruleset revision, service-flag state, and the deny/allow
/// lists consulted before a deployment is recorded.
///
/// The engine executes transactions sequentially within a block; a context is
/// never shared across threads. During hook invocation the engine temporarily
/// replaces `msg` and clears `tx`, restoring both afterwards regardless of the
/// outcome.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// The transaction being processed, absent outside transaction flow.
    pub tx: Option<TransactionContext>,
    /// The message visible to an executing contract.
    pub msg: Option<Message>,
    /// The chain's active ruleset revision at the current block.
    pub revision: u32,
    /// Governance service toggles.
    pub flags: ServiceFlags,
    /// Accept unpackaged content (development chains only).
    pub dev_mode: bool,
    /// Contract addresses barred from deployment.
    pub score_blacklist: BTreeSet<Address>,
    /// Accounts allowed to deploy while `DEPLOYER_WHITE_LIST` is on.
    pub deployer_whitelist: BTreeSet<Address>,
}

impl ExecutionContext {
    /// Creates a context for the transaction with the given originator and
    /// hash, with all service flags off.
    pub fn new(origin: Address, tx_hash: TransactionHash) -> ExecutionContext {
        ExecutionContext {
            tx: Some(TransactionContext {
                origin,
                hash: tx_hash,
            }),
            msg: Some(Message { sender: origin }),
            revision: 0,
            flags: ServiceFlags::empty(),
            dev_mode: false,
            score_blacklist: BTreeSet::new(),
            deployer_whitelist: BTreeSet::new(),
        }
    }

    /// Returns `true` if `flag` is enabled.
    pub fn is_flag_on(&self, flag: ServiceFlags) -> bool {
        self.flags.contains(flag)
    }
}
