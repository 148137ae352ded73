use thiserror::Error;

use crate::global_state;

/// Errors raised by container operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Failure of the underlying key-value store.
    #[error(transparent)]
    Store(#[from] global_state::Error),

    /// The operation does not match the container's declared shape, or stored
    /// bytes do not decode as the expected value type.
    #[error("container type mismatch: {0}")]
    TypeMismatch(String),

    /// Index outside the container bounds.
    #[error("index out of range: {index}, size {size}")]
    IndexOutOfRange {
        /// The index as supplied by the caller.
        index: i64,
        /// The container size at the time of the operation.
        size: u64,
    },

    /// A stored linked-list node record is malformed or a link points at a
    /// missing node.
    #[error("corrupt linked-list node record")]
    CorruptNode,
}
