//! The flat, byte-oriented key-value interface the state layer is built on,
//! plus prefix-scoped views of it.

mod error;
pub mod scratch;

pub use error::Error;

/// Separator byte between namespace components.
const NAMESPACE_SEPARATOR: u8 = b'|';

/// Flat key-value access.
///
/// Writes are buffered against the caller's per-block write context and become
/// durable only when that context is committed; the caller owns commit and
/// rollback boundaries. Handles are cheap to clone and clones share the
/// underlying state, so implementations take `&self` and synchronize
/// internally.
pub trait KeyValueStore: Clone {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;

    /// Stores `value` under `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), Error>;

    /// Deletes the value stored under `key`, if any.
    fn delete(&self, key: &[u8]) -> Result<(), Error>;
}

/// A view of a [`KeyValueStore`] scoped to a byte-prefix namespace.
///
/// Namespaces compose by prefix concatenation with a separator byte, so a
/// sub-namespace can never escape its parent's key space.
#[derive(Clone, Debug)]
pub struct NamespaceDb<S> {
    store: S,
    prefix: Vec<u8>,
}

impl<S: KeyValueStore> NamespaceDb<S> {
    /// Creates a view of `store` scoped to `prefix`.
    pub fn new(store: S, prefix: &[u8]) -> NamespaceDb<S> {
        NamespaceDb {
            store,
            prefix: prefix.to_vec(),
        }
    }

    /// Returns a view scoped one level deeper, under `prefix`.
    pub fn sub_db(&self, prefix: &[u8]) -> NamespaceDb<S> {
        NamespaceDb {
            store: self.store.clone(),
            prefix: join(&self.prefix, prefix),
        }
    }

    /// The namespace prefix of this view.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        join(&self.prefix, key)
    }

    /// Returns the value stored under `key` within this namespace.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        self.store.get(&self.full_key(key))
    }

    /// Stores `value` under `key` within this namespace.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        self.store.put(&self.full_key(key), value)
    }

    /// Deletes the value stored under `key` within this namespace.
    pub fn delete(&self, key: &[u8]) -> Result<(), Error> {
        self.store.delete(&self.full_key(key))
    }
}

fn join(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut joined = Vec::with_capacity(prefix.len() + 1 + suffix.len());
    joined.extend_from_slice(prefix);
    joined.push(NAMESPACE_SEPARATOR);
    joined.extend_from_slice(suffix);
    joined
}

#[cfg(test)]
mod tests {
    use super::{scratch::ScratchState, *};

    #[test]
    fn sub_namespaces_compose_with_separator() {
        let state = ScratchState::new();
        let db = NamespaceDb::new(state, b"contract");
        let sub = db.sub_db(b"inner");
        assert_eq!(sub.prefix(), b"contract|inner");
        assert_eq!(sub.full_key(b"k"), b"contract|inner|k".to_vec());
    }

    #[test]
    fn sibling_namespaces_do_not_collide() {
        let state = ScratchState::new();
        let db = NamespaceDb::new(state, b"contract");
        let left = db.sub_db(b"a");
        let right = db.sub_db(b"b");
        left.put(b"k", b"left").unwrap();
        right.put(b"k", b"right").unwrap();
        assert_eq!(left.get(b"k").unwrap(), Some(b"left".to_vec()));
        assert_eq!(right.get(b"k").unwrap(), Some(b"right".to_vec()));
        left.delete(b"k").unwrap();
        assert_eq!(left.get(b"k").unwrap(), None);
        assert_eq!(right.get(b"k").unwrap(), Some(b"right".to_vec()));
    }
}
