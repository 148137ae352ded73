//! Typed key and value encoding shared by all containers.
//!
//! The supported kinds form a closed set (integers, text, addresses, booleans
//! and raw bytes), enforced at compile time through the two traits below
//! rather than by runtime type checks.

use keystone_types::{bytesrepr, Address};

use super::Error;

/// Encodes `value` as minimal-length two's-complement big-endian bytes,
/// sign-extended only as far as needed. Zero encodes as a single zero byte.
pub fn int_to_bytes(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start + 1 < bytes.len() {
        let lead = bytes[start];
        let next = bytes[start + 1];
        let redundant = (lead == 0x00 && next < 0x80) || (lead == 0xff && next >= 0x80);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// Decodes sign-extended big-endian bytes into an integer; empty input decodes
/// to zero.
pub fn int_from_bytes(bytes: &[u8]) -> Result<i64, Error> {
    if bytes.len() > 8 {
        return Err(Error::TypeMismatch(format!(
            "integer wider than 64 bits ({} bytes)",
            bytes.len()
        )));
    }
    let negative = bytes.first().map_or(false, |byte| byte & 0x80 != 0);
    let mut buffer = if negative { [0xff; 8] } else { [0; 8] };
    buffer[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(buffer))
}

/// A type usable as a container key.
pub trait ContainerKey {
    /// Encodes the key for use in the flat key space.
    fn encode_key(&self) -> Vec<u8>;
}

impl ContainerKey for i64 {
    fn encode_key(&self) -> Vec<u8> {
        int_to_bytes(*self)
    }
}

impl ContainerKey for str {
    fn encode_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl ContainerKey for String {
    fn encode_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl ContainerKey for Address {
    fn encode_key(&self) -> Vec<u8> {
        self.to_array().to_vec()
    }
}

impl ContainerKey for [u8] {
    fn encode_key(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl ContainerKey for Vec<u8> {
    fn encode_key(&self) -> Vec<u8> {
        self.clone()
    }
}

impl<T: ContainerKey + ?Sized> ContainerKey for &T {
    fn encode_key(&self) -> Vec<u8> {
        (**self).encode_key()
    }
}

/// A type storable as a container value.
///
/// Absent keys decode to the type-appropriate default: zero for integers,
/// `false` for booleans, the empty string for text, and nothing at all for
/// addresses and raw bytes.
pub trait ContainerValue: Sized + PartialEq {
    /// Encodes the value for storage.
    fn encode_value(&self) -> Vec<u8>;

    /// Decodes stored bytes as this type.
    fn decode_value(bytes: &[u8]) -> Result<Self, Error>;

    /// The value an absent key decodes to, if the type has one.
    fn absent() -> Option<Self>;
}

impl ContainerValue for i64 {
    fn encode_value(&self) -> Vec<u8> {
        int_to_bytes(*self)
    }

    fn decode_value(bytes: &[u8]) -> Result<Self, Error> {
        int_from_bytes(bytes)
    }

    fn absent() -> Option<Self> {
        Some(0)
    }
}

impl ContainerValue for bool {
    fn encode_value(&self) -> Vec<u8> {
        int_to_bytes(i64::from(*self))
    }

    fn decode_value(bytes: &[u8]) -> Result<Self, Error> {
        Ok(int_from_bytes(bytes)? != 0)
    }

    fn absent() -> Option<Self> {
        Some(false)
    }
}

impl ContainerValue for String {
    fn encode_value(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode_value(bytes: &[u8]) -> Result<Self, Error> {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::TypeMismatch("stored value is not valid UTF-8".to_string()))
    }

    fn absent() -> Option<Self> {
        Some(String::new())
    }
}

impl ContainerValue for Address {
    fn encode_value(&self) -> Vec<u8> {
        self.to_array().to_vec()
    }

    fn decode_value(bytes: &[u8]) -> Result<Self, Error> {
        bytesrepr::deserialize(bytes).map_err(|_| {
            Error::TypeMismatch(format!(
                "stored value of {} bytes is not an address",
                bytes.len()
            ))
        })
    }

    fn absent() -> Option<Self> {
        None
    }
}

impl ContainerValue for Vec<u8> {
    fn encode_value(&self) -> Vec<u8> {
        self.clone()
    }

    fn decode_value(bytes: &[u8]) -> Result<Self, Error> {
        Ok(bytes.to_vec())
    }

    fn absent() -> Option<Self> {
        None
    }
}
