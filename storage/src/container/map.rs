use std::marker::PhantomData;

use crate::global_state::{KeyValueStore, NamespaceDb};

use super::{container_db, ContainerKey, ContainerValue, Error, MAP_TAG};

/// An unordered persistent key-to-value map, optionally nested.
///
/// A map of depth `n > 1` is descended one level at a time with
/// [`sub`](MapContainer::sub); reads and writes only happen at the leaf level.
/// Presence is determined by whether a value is stored; the store never holds
/// null values, so no sentinel is needed.
#[derive(Clone, Debug)]
pub struct MapContainer<S, V> {
    db: NamespaceDb<S>,
    depth: u8,
    _value: PhantomData<V>,
}

impl<S: KeyValueStore, V: ContainerValue> MapContainer<S, V> {
    /// Creates the flat (depth 1) map named `name` inside `db`'s namespace.
    pub fn new(db: &NamespaceDb<S>, name: &str) -> MapContainer<S, V> {
        MapContainer::with_depth(db, name, 1)
    }

    /// Creates the map named `name` with `depth` levels of nesting.
    ///
    /// A depth of zero is treated as one.
    pub fn with_depth(db: &NamespaceDb<S>, name: &str, depth: u8) -> MapContainer<S, V> {
        MapContainer {
            db: container_db(db, MAP_TAG, name),
            depth: depth.max(1),
            _value: PhantomData,
        }
    }

    /// The remaining nesting depth of this view.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns the nested map one level down, under `key`.
    pub fn sub<K: ContainerKey + ?Sized>(&self, key: &K) -> Result<MapContainer<S, V>, Error> {
        if self.depth <= 1 {
            return Err(Error::TypeMismatch(
                "cannot descend below the leaf level of a map".to_string(),
            ));
        }
        Ok(MapContainer {
            db: self.db.sub_db(&key.encode_key()),
            depth: self.depth - 1,
            _value: PhantomData,
        })
    }

    fn leaf_check(&self) -> Result<(), Error> {
        if self.depth == 1 {
            Ok(())
        } else {
            Err(Error::TypeMismatch(format!(
                "operation through an intermediate map level ({} levels remain)",
                self.depth
            )))
        }
    }

    /// Returns the value stored under `key`, or the type-appropriate default.
    pub fn get<K: ContainerKey + ?Sized>(&self, key: &K) -> Result<Option<V>, Error> {
        self.leaf_check()?;
        match self.db.get(&key.encode_key())? {
            Some(bytes) => V::decode_value(&bytes).map(Some),
            None => Ok(V::absent()),
        }
    }

    /// Stores `value` under `key`.
    pub fn set<K: ContainerKey + ?Sized>(&self, key: &K, value: &V) -> Result<(), Error> {
        self.leaf_check()?;
        Ok(self.db.put(&key.encode_key(), &value.encode_value())?)
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains<K: ContainerKey + ?Sized>(&self, key: &K) -> Result<bool, Error> {
        self.leaf_check()?;
        Ok(self.db.get(&key.encode_key())?.is_some())
    }

    /// Removes the value stored under `key`, if any.
    pub fn remove<K: ContainerKey + ?Sized>(&self, key: &K) -> Result<(), Error> {
        self.leaf_check()?;
        Ok(self.db.delete(&key.encode_key())?)
    }
}
