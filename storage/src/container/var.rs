use std::marker::PhantomData;

use crate::global_state::{KeyValueStore, NamespaceDb};

use super::{ContainerKey, ContainerValue, Error, VAR_TAG};

/// A single persistent value slot.
///
/// All slots of a contract share the var sub-space; the slot name is the key.
#[derive(Clone, Debug)]
pub struct VarSlot<S, V> {
    db: NamespaceDb<S>,
    key: Vec<u8>,
    _value: PhantomData<V>,
}

impl<S: KeyValueStore, V: ContainerValue> VarSlot<S, V> {
    /// Creates the slot named `name` inside `db`'s namespace.
    pub fn new(db: &NamespaceDb<S>, name: &str) -> VarSlot<S, V> {
        VarSlot {
            db: db.sub_db(&[VAR_TAG]),
            key: name.encode_key(),
            _value: PhantomData,
        }
    }

    /// Stores `value` in the slot.
    pub fn set(&self, value: &V) -> Result<(), Error> {
        Ok(self.db.put(&self.key, &value.encode_value())?)
    }

    /// Returns the stored value, or the type-appropriate default when the slot
    /// was never written.
    pub fn get(&self) -> Result<Option<V>, Error> {
        match self.db.get(&self.key)? {
            Some(bytes) => V::decode_value(&bytes).map(Some),
            None => Ok(V::absent()),
        }
    }

    /// Deletes the stored value.
    pub fn remove(&self) -> Result<(), Error> {
        Ok(self.db.delete(&self.key)?)
    }
}
