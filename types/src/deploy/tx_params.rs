use datasize::DataSize;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    bytesrepr::{
        safe_split_at, Error, FromBytes, ToBytes, U32_SERIALIZED_LENGTH, U8_SERIALIZED_LENGTH,
    },
    Address, TransactionHash, ADDRESS_SERIALIZED_LENGTH, TRANSACTION_HASH_LENGTH,
};

const TX_PARAMS_VERSION: u8 = 0;

const INSTALL_TAG: u8 = 0;
const UPDATE_TAG: u8 = 1;

/// The number of bytes in the fixed prefix of a serialized [`DeployTxParams`]:
/// version(1) ‖ deploy_type(1) ‖ payload_length(4) ‖ score_address(21) ‖ tx_hash(32).
pub const DEPLOY_TX_PARAMS_PREFIX_LENGTH: usize = U8_SERIALIZED_LENGTH * 2
    + U32_SERIALIZED_LENGTH
    + ADDRESS_SERIALIZED_LENGTH
    + TRANSACTION_HASH_LENGTH;

/// Whether a deployment installs a new contract or updates an existing one.
#[derive(Clone, Copy, DataSize, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DeployType {
    /// First deployment for an address.
    Install,
    /// Replacement of an existing contract's code.
    Update,
}

impl DeployType {
    fn tag(self) -> u8 {
        match self {
            DeployType::Install => INSTALL_TAG,
            DeployType::Update => UPDATE_TAG,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            INSTALL_TAG => Ok(DeployType::Install),
            UPDATE_TAG => Ok(DeployType::Update),
            _ => Err(Error::Formatting),
        }
    }
}

/// The structured payload of a deployment transaction: a content-type tag, the
/// raw package content, and the ordered initialization parameters passed to
/// the contract's install or update hook.
///
/// On the wire this is a UTF-8 JSON document, kept self-describing for
/// extensibility; parameter order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployData {
    /// The format of `content`.
    pub content_type: String,
    /// The package content, hex-encoded.
    pub content: String,
    /// Initialization parameters for the install/update hook, in submission
    /// order.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl DeployData {
    /// Constructs a new `DeployData` with no initialization parameters.
    pub fn new(content_type: &str, content: &str) -> DeployData {
        DeployData {
            content_type: content_type.to_string(),
            content: content.to_string(),
            params: Map::new(),
        }
    }

    fn to_json_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|_| Error::Formatting)
    }

    fn from_json_bytes(bytes: &[u8]) -> Result<DeployData, Error> {
        serde_json::from_slice(bytes).map_err(|_| Error::Formatting)
    }
}

/// The parameters of one deployment transaction, keyed by its hash.
///
/// Immutable once written; a second write for the same hash is rejected at the
/// storage layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeployTxParams {
    tx_hash: TransactionHash,
    deploy_type: DeployType,
    score_address: Address,
    deploy_data: DeployData,
}

impl DeployTxParams {
    /// Constructs a new `DeployTxParams`.
    pub fn new(
        tx_hash: TransactionHash,
        deploy_type: DeployType,
        score_address: Address,
        deploy_data: DeployData,
    ) -> DeployTxParams {
        DeployTxParams {
            tx_hash,
            deploy_type,
            score_address,
            deploy_data,
        }
    }

    /// The hash of the deployment transaction.
    pub fn tx_hash(&self) -> TransactionHash {
        self.tx_hash
    }

    /// Whether this deployment installs or updates.
    pub fn deploy_type(&self) -> DeployType {
        self.deploy_type
    }

    /// The target contract address.
    pub fn score_address(&self) -> Address {
        self.score_address
    }

    /// The structured deployment payload.
    pub fn deploy_data(&self) -> &DeployData {
        &self.deploy_data
    }
}

impl ToBytes for DeployTxParams {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let payload = self.deploy_data.to_json_bytes()?;
        let payload_length = u32::try_from(payload.len()).map_err(|_| Error::Formatting)?;
        let mut buffer = Vec::with_capacity(DEPLOY_TX_PARAMS_PREFIX_LENGTH + payload.len());
        buffer.push(TX_PARAMS_VERSION);
        buffer.push(self.deploy_type.tag());
        payload_length.write_bytes(&mut buffer)?;
        self.score_address.write_bytes(&mut buffer)?;
        self.tx_hash.write_bytes(&mut buffer)?;
        buffer.extend_from_slice(&payload);
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        let payload_length = self.deploy_data.to_json_bytes().map(|payload| payload.len());
        DEPLOY_TX_PARAMS_PREFIX_LENGTH + payload_length.unwrap_or(0)
    }
}

impl FromBytes for DeployTxParams {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (_version, remainder) = u8::from_bytes(bytes)?;
        let (type_tag, remainder) = u8::from_bytes(remainder)?;
        let deploy_type = DeployType::from_tag(type_tag)?;
        let (payload_length, remainder) = u32::from_bytes(remainder)?;
        let (score_address, remainder) = Address::from_bytes(remainder)?;
        let (tx_hash, remainder) = TransactionHash::from_bytes(remainder)?;
        let (payload, remainder) = safe_split_at(remainder, payload_length as usize)?;
        let deploy_data = DeployData::from_json_bytes(payload)?;
        let tx_params = DeployTxParams {
            tx_hash,
            deploy_type,
            score_address,
            deploy_data,
        };
        Ok((tx_params, remainder))
    }
}
