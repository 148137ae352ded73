//! An in-memory key-value store which buffers a block's writes over a
//! committed base map.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use super::{Error, KeyValueStore};

#[derive(Debug, Default)]
struct Cache {
    committed: BTreeMap<Vec<u8>, Vec<u8>>,
    // `None` is a delete tombstone, applied to `committed` on commit.
    cached_writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

/// In-memory state with a per-block write overlay.
///
/// Reads see buffered writes immediately; the committed map changes only via
/// [`commit`](ScratchState::commit). Clones share the underlying maps.
#[derive(Clone, Debug, Default)]
pub struct ScratchState {
    cache: Arc<RwLock<Cache>>,
}

impl ScratchState {
    /// Creates a new, empty `ScratchState`.
    pub fn new() -> ScratchState {
        ScratchState::default()
    }

    /// Applies all buffered writes and deletes to the committed map and clears
    /// the overlay.
    pub fn commit(&self) -> Result<(), Error> {
        let mut cache = self.cache.write()?;
        let cached_writes = std::mem::take(&mut cache.cached_writes);
        for (key, maybe_value) in cached_writes {
            match maybe_value {
                Some(value) => {
                    cache.committed.insert(key, value);
                }
                None => {
                    cache.committed.remove(&key);
                }
            }
        }
        Ok(())
    }

    /// Discards all buffered writes and deletes.
    pub fn discard(&self) -> Result<(), Error> {
        let mut cache = self.cache.write()?;
        cache.cached_writes.clear();
        Ok(())
    }
}

impl KeyValueStore for ScratchState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        let cache = self.cache.read()?;
        match cache.cached_writes.get(key) {
            Some(maybe_value) => Ok(maybe_value.clone()),
            None => Ok(cache.committed.get(key).cloned()),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        let mut cache = self.cache.write()?;
        cache.cached_writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), Error> {
        let mut cache = self.cache.write()?;
        cache.cached_writes.insert(key.to_vec(), None);
        Ok(())
    }
}
