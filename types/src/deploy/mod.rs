//! Deploy metadata records and their fixed binary formats.
//!
//! A [`DeployRecord`] describes one contract's current and pending code
//! versions; a [`DeployTxParams`] captures one deployment transaction's
//! payload. Both encodings are consensus-normative.

mod record;
mod tx_params;

pub use record::{DeployRecord, DeployState, DEPLOY_RECORD_SERIALIZED_LENGTH};
pub use tx_params::{DeployData, DeployTxParams, DeployType, DEPLOY_TX_PARAMS_PREFIX_LENGTH};
