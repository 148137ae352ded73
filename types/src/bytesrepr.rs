//! Deterministic binary serialization of consensus-critical records.
//!
//! Multi-byte integers are big-endian and fixed-size byte arrays are written
//! raw, with no length prefix; the layout of a record is fully determined by
//! its field order.

use std::fmt::{self, Display, Formatter};

/// The number of bytes in a serialized `u8`.
pub const U8_SERIALIZED_LENGTH: usize = 1;
/// The number of bytes in a serialized `u32`.
pub const U32_SERIALIZED_LENGTH: usize = 4;
/// The number of bytes in a serialized `u64`.
pub const U64_SERIALIZED_LENGTH: usize = 8;

/// Serialization and deserialization errors.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Early end of stream while deserializing.
    EarlyEndOfStream,
    /// Formatting error while deserializing.
    Formatting,
    /// Not all input bytes were consumed.
    LeftOverBytes,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Error::EarlyEndOfStream => {
                write!(f, "deserialization error: early end of stream")
            }
            Error::Formatting => write!(f, "deserialization error: formatting"),
            Error::LeftOverBytes => write!(f, "deserialization error: left over bytes"),
        }
    }
}

impl std::error::Error for Error {}

/// A type which can be serialized to a `Vec<u8>`.
pub trait ToBytes {
    /// Serializes `&self` to a `Vec<u8>`.
    fn to_bytes(&self) -> Result<Vec<u8>, Error>;

    /// Consumes `self` and serializes to a `Vec<u8>`.
    fn into_bytes(self) -> Result<Vec<u8>, Error>
    where
        Self: Sized,
    {
        self.to_bytes()
    }

    /// Returns the length of the `Vec<u8>` which `to_bytes()` would return.
    fn serialized_length(&self) -> usize;

    /// Writes `&self` into a mutable `writer`.
    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.extend(self.to_bytes()?);
        Ok(())
    }
}

/// A type which can be deserialized from a `&[u8]`.
pub trait FromBytes: Sized {
    /// Deserializes the slice into `Self`, returning the remaining input.
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error>;
}

/// Returns a `Vec<u8>` with the capacity to hold the serialized `to_be_serialized`.
pub fn allocate_buffer<T: ToBytes>(to_be_serialized: &T) -> Vec<u8> {
    Vec::with_capacity(to_be_serialized.serialized_length())
}

/// Serializes `t` into a `Vec<u8>`.
pub fn serialize(t: impl ToBytes) -> Result<Vec<u8>, Error> {
    t.into_bytes()
}

/// Deserializes `bytes` into an instance of `T`.
///
/// Returns an error if the bytes cannot be deserialized into `T` or if not
/// all of the input bytes are consumed in the operation.
pub fn deserialize<T: FromBytes>(bytes: &[u8]) -> Result<T, Error> {
    let (t, remainder) = T::from_bytes(bytes)?;
    if remainder.is_empty() {
        Ok(t)
    } else {
        Err(Error::LeftOverBytes)
    }
}

/// Safely splits the slice at the given point.
pub fn safe_split_at(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8]), Error> {
    if n > bytes.len() {
        Err(Error::EarlyEndOfStream)
    } else {
        Ok(bytes.split_at(n))
    }
}

impl ToBytes for u8 {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(vec![*self])
    }

    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.push(*self);
        Ok(())
    }
}

impl FromBytes for u8 {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        match bytes.split_first() {
            Some((byte, remainder)) => Ok((*byte, remainder)),
            None => Err(Error::EarlyEndOfStream),
        }
    }
}

macro_rules! impl_to_from_bytes_for_integer {
    ($type:ty, $serialized_length:ident) => {
        impl ToBytes for $type {
            fn to_bytes(&self) -> Result<Vec<u8>, Error> {
                Ok(self.to_be_bytes().to_vec())
            }

            fn serialized_length(&self) -> usize {
                $serialized_length
            }

            fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
                writer.extend_from_slice(&self.to_be_bytes());
                Ok(())
            }
        }

        impl FromBytes for $type {
            fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
                let (be_bytes, remainder) = safe_split_at(bytes, $serialized_length)?;
                let mut buffer = [0u8; $serialized_length];
                buffer.copy_from_slice(be_bytes);
                Ok((<$type>::from_be_bytes(buffer), remainder))
            }
        }
    };
}

impl_to_from_bytes_for_integer!(u32, U32_SERIALIZED_LENGTH);
impl_to_from_bytes_for_integer!(u64, U64_SERIALIZED_LENGTH);

macro_rules! impl_to_from_bytes_for_byte_array {
    ($($len:expr),+) => {
        $(
            impl ToBytes for [u8; $len] {
                fn to_bytes(&self) -> Result<Vec<u8>, Error> {
                    Ok(self.to_vec())
                }

                fn serialized_length(&self) -> usize {
                    $len
                }

                fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
                    writer.extend_from_slice(self);
                    Ok(())
                }
            }

            impl FromBytes for [u8; $len] {
                fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
                    let (array_bytes, remainder) = safe_split_at(bytes, $len)?;
                    let mut result = [0u8; $len];
                    result.copy_from_slice(array_bytes);
                    Ok((result, remainder))
                }
            }
        )+
    }
}

impl_to_from_bytes_for_byte_array!(20, 21, 32);
