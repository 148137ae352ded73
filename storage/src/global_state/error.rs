use std::sync;

use thiserror::Error;

/// Error enum representing possible failures of key-value store interactions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Another thread panicked while holding a lock.
    #[error("another thread panicked while holding a lock")]
    Poison,

    /// Failure reported by the backing store.
    #[error("backing store failure: {0}")]
    Backend(String),
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_error: sync::PoisonError<T>) -> Self {
        Error::Poison
    }
}
