use std::fmt::{self, Debug, Display, Formatter};

use datasize::DataSize;
use hex_fmt::HexFmt;
#[cfg(any(feature = "testing", test))]
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};

use crate::bytesrepr::{Error, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};

/// The number of bytes in the body of an [`Address`].
pub const ADDRESS_BODY_LENGTH: usize = 20;
/// The number of bytes in a serialized [`Address`]: one kind byte plus the body.
pub const ADDRESS_SERIALIZED_LENGTH: usize = U8_SERIALIZED_LENGTH + ADDRESS_BODY_LENGTH;

const ACCOUNT_KIND_ID: u8 = 0;
const CONTRACT_KIND_ID: u8 = 1;

const ACCOUNT_STRING_PREFIX: &str = "account-";
const CONTRACT_STRING_PREFIX: &str = "contract-";

/// The all-zero contract address, used as the install target sentinel: a
/// deployment transaction sent to this address installs a new contract.
pub const ZERO_CONTRACT_ADDRESS: Address = Address {
    kind: AddressKind::Contract,
    body: [0; ADDRESS_BODY_LENGTH],
};

/// The kind of an [`Address`]: an externally-owned account or a contract.
#[derive(
    Clone, Copy, DataSize, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize,
)]
pub enum AddressKind {
    /// An externally-owned account.
    Account,
    /// A deployed contract.
    Contract,
}

impl AddressKind {
    fn tag(self) -> u8 {
        match self {
            AddressKind::Account => ACCOUNT_KIND_ID,
            AddressKind::Contract => CONTRACT_KIND_ID,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            ACCOUNT_KIND_ID => Ok(AddressKind::Account),
            CONTRACT_KIND_ID => Ok(AddressKind::Contract),
            _ => Err(Error::Formatting),
        }
    }
}

/// An on-chain address: a kind byte followed by a 20-byte body.
///
/// Addresses are always exactly [`ADDRESS_SERIALIZED_LENGTH`] bytes on the
/// wire, never variable-width.
#[derive(Clone, Copy, DataSize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Address {
    kind: AddressKind,
    body: [u8; ADDRESS_BODY_LENGTH],
}

impl Address {
    /// Constructs a new `Address` from its kind and body bytes.
    pub const fn new(kind: AddressKind, body: [u8; ADDRESS_BODY_LENGTH]) -> Address {
        Address { kind, body }
    }

    /// Constructs an externally-owned account address.
    pub const fn account(body: [u8; ADDRESS_BODY_LENGTH]) -> Address {
        Address::new(AddressKind::Account, body)
    }

    /// Constructs a contract address.
    pub const fn contract(body: [u8; ADDRESS_BODY_LENGTH]) -> Address {
        Address::new(AddressKind::Contract, body)
    }

    /// Returns the kind of the address.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Returns the body bytes of the address.
    pub fn body(&self) -> &[u8; ADDRESS_BODY_LENGTH] {
        &self.body
    }

    /// Returns `true` if this is a contract address.
    pub fn is_contract(&self) -> bool {
        self.kind == AddressKind::Contract
    }

    /// Returns the full wire form of the address as a fixed array.
    pub fn to_array(&self) -> [u8; ADDRESS_SERIALIZED_LENGTH] {
        let mut result = [0; ADDRESS_SERIALIZED_LENGTH];
        result[0] = self.kind.tag();
        result[1..].copy_from_slice(&self.body);
        result
    }

    /// Formats the `Address` as a prefixed, lowercase hex string.
    pub fn to_formatted_string(&self) -> String {
        let prefix = match self.kind {
            AddressKind::Account => ACCOUNT_STRING_PREFIX,
            AddressKind::Contract => CONTRACT_STRING_PREFIX,
        };
        format!("{}{}", prefix, base16::encode_lower(&self.body))
    }

    /// Parses a string formatted as per `Self::to_formatted_string()` into an `Address`.
    pub fn from_formatted_str(input: &str) -> Result<Self, FromStrError> {
        let (kind, remainder) = if let Some(hex) = input.strip_prefix(ACCOUNT_STRING_PREFIX) {
            (AddressKind::Account, hex)
        } else if let Some(hex) = input.strip_prefix(CONTRACT_STRING_PREFIX) {
            (AddressKind::Contract, hex)
        } else {
            return Err(FromStrError::InvalidPrefix);
        };
        let decoded = base16::decode(remainder)?;
        let body = <[u8; ADDRESS_BODY_LENGTH]>::try_from(decoded.as_slice())
            .map_err(|_| FromStrError::InvalidLength(decoded.len()))?;
        Ok(Address::new(kind, body))
    }
}

/// Errors from parsing a formatted string as an [`Address`].
#[derive(Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum FromStrError {
    /// The prefix is invalid.
    InvalidPrefix,
    /// The address is not valid hex.
    Hex(base16::DecodeError),
    /// The address body is not exactly [`ADDRESS_BODY_LENGTH`] bytes.
    InvalidLength(usize),
}

impl From<base16::DecodeError> for FromStrError {
    fn from(error: base16::DecodeError) -> Self {
        FromStrError::Hex(error)
    }
}

impl Display for FromStrError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            FromStrError::InvalidPrefix => write!(f, "invalid prefix"),
            FromStrError::Hex(error) => write!(f, "decode from hex: {}", error),
            FromStrError::InvalidLength(len) => {
                write!(f, "address body is {} bytes, expected {}", len, ADDRESS_BODY_LENGTH)
            }
        }
    }
}

impl std::error::Error for FromStrError {}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_formatted_string())
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Address({:?}, {})", self.kind, HexFmt(&self.body))
    }
}

impl ToBytes for Address {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(self.to_array().to_vec())
    }

    fn serialized_length(&self) -> usize {
        ADDRESS_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.push(self.kind.tag());
        writer.extend_from_slice(&self.body);
        Ok(())
    }
}

impl FromBytes for Address {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (tag, remainder) = u8::from_bytes(bytes)?;
        let kind = AddressKind::from_tag(tag)?;
        let (body, remainder) = <[u8; ADDRESS_BODY_LENGTH]>::from_bytes(remainder)?;
        Ok((Address::new(kind, body), remainder))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            self.to_formatted_string().serialize(serializer)
        } else {
            (self.kind, self.body).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let formatted_string = String::deserialize(deserializer)?;
            Address::from_formatted_str(&formatted_string).map_err(SerdeError::custom)
        } else {
            let (kind, body) = <(AddressKind, [u8; ADDRESS_BODY_LENGTH])>::deserialize(deserializer)?;
            Ok(Address::new(kind, body))
        }
    }
}

#[cfg(any(feature = "testing", test))]
impl Distribution<AddressKind> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> AddressKind {
        if rng.gen() {
            AddressKind::Contract
        } else {
            AddressKind::Account
        }
    }
}

#[cfg(any(feature = "testing", test))]
impl Distribution<Address> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Address {
        Address::new(rng.gen(), rng.gen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytesrepr;

    #[test]
    fn should_round_trip_bytes() {
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            let address: Address = rng.gen();
            let serialized = address.to_bytes().unwrap();
            assert_eq!(serialized.len(), ADDRESS_SERIALIZED_LENGTH);
            assert_eq!(bytesrepr::deserialize::<Address>(&serialized).unwrap(), address);
        }
    }

    #[test]
    fn should_round_trip_formatted_string() {
        let address = Address::contract([42; ADDRESS_BODY_LENGTH]);
        let formatted = address.to_formatted_string();
        assert!(formatted.starts_with(CONTRACT_STRING_PREFIX));
        assert_eq!(Address::from_formatted_str(&formatted).unwrap(), address);

        let account = Address::account([7; ADDRESS_BODY_LENGTH]);
        assert_eq!(
            Address::from_formatted_str(&account.to_formatted_string()).unwrap(),
            account
        );
    }

    #[test]
    fn should_fail_to_parse_bad_formatted_string() {
        assert_eq!(
            Address::from_formatted_str("entity-0000"),
            Err(FromStrError::InvalidPrefix)
        );
        assert!(matches!(
            Address::from_formatted_str("contract-zz"),
            Err(FromStrError::Hex(_))
        ));
        assert_eq!(
            Address::from_formatted_str("contract-0011"),
            Err(FromStrError::InvalidLength(2))
        );
    }

    #[test]
    fn should_reject_unknown_kind_tag() {
        let mut bytes = ZERO_CONTRACT_ADDRESS.to_array();
        bytes[0] = 9;
        assert_eq!(
            bytesrepr::deserialize::<Address>(&bytes).unwrap_err(),
            Error::Formatting
        );
    }

    #[test]
    fn zero_contract_address_is_contract_kind() {
        assert!(ZERO_CONTRACT_ADDRESS.is_contract());
        assert_eq!(ZERO_CONTRACT_ADDRESS.body(), &[0; ADDRESS_BODY_LENGTH]);
    }

    #[test]
    fn serde_json_uses_formatted_string() {
        let address = Address::account([1; ADDRESS_BODY_LENGTH]);
        let json = serde_json::to_string(&address).unwrap();
        assert!(json.contains(ACCOUNT_STRING_PREFIX));
        let decoded: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, address);
    }
}
