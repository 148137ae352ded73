use std::fmt::{self, Debug, Display, Formatter};

use datasize::DataSize;
use hex_fmt::HexFmt;
#[cfg(any(feature = "testing", test))]
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{Deserialize, Serialize};

use crate::bytesrepr::{Error, FromBytes, ToBytes};

/// The number of bytes in a [`TransactionHash`].
pub const TRANSACTION_HASH_LENGTH: usize = 32;

/// The hash of a transaction.
///
/// The all-zero value is a sentinel reserved for contracts installed outside
/// normal transaction flow (builtins); it never identifies a real transaction.
#[derive(
    Clone, Copy, DataSize, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct TransactionHash([u8; TRANSACTION_HASH_LENGTH]);

impl TransactionHash {
    /// Constructs a new `TransactionHash` from raw bytes.
    pub const fn new(value: [u8; TRANSACTION_HASH_LENGTH]) -> TransactionHash {
        TransactionHash(value)
    }

    /// Returns the all-zero sentinel hash.
    pub const fn zero() -> TransactionHash {
        TransactionHash([0; TRANSACTION_HASH_LENGTH])
    }

    /// Returns `true` if this is the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; TRANSACTION_HASH_LENGTH]
    }

    /// Returns the raw bytes of the hash as an array.
    pub fn value(&self) -> [u8; TRANSACTION_HASH_LENGTH] {
        self.0
    }

    /// Returns the raw bytes of the hash as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for TransactionHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; TRANSACTION_HASH_LENGTH]> for TransactionHash {
    fn from(value: [u8; TRANSACTION_HASH_LENGTH]) -> Self {
        TransactionHash(value)
    }
}

impl Display for TransactionHash {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", HexFmt(&self.0))
    }
}

impl Debug for TransactionHash {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "TransactionHash({})", HexFmt(&self.0))
    }
}

impl ToBytes for TransactionHash {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        TRANSACTION_HASH_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.extend_from_slice(&self.0);
        Ok(())
    }
}

impl FromBytes for TransactionHash {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (hash, remainder) = <[u8; TRANSACTION_HASH_LENGTH]>::from_bytes(bytes)?;
        Ok((TransactionHash(hash), remainder))
    }
}

#[cfg(any(feature = "testing", test))]
impl Distribution<TransactionHash> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionHash {
        TransactionHash(rng.gen())
    }
}
