use std::marker::PhantomData;

use crate::global_state::{KeyValueStore, NamespaceDb};

use super::{container_db, int_from_bytes, int_to_bytes, ContainerValue, Error, LINKED_LIST_TAG};

// Reserved counter keys. Node keys are encoded integers and therefore never
// collide with these.
const LAST_NODE_ID_KEY: &[u8] = b"node_id";
const SIZE_KEY: &[u8] = b"size_id";
const HEAD_ID_KEY: &[u8] = b"head_node_id";
const TAIL_ID_KEY: &[u8] = b"tail_node_id";

// Node id 0 is the "no node" sentinel; real ids start at 1.
const NO_NODE: u64 = 0;

/// One stored node: neighbor links plus the encoded payload.
///
/// Record layout: prev-id byte-length(1) ‖ next-id byte-length(1) ‖ prev-id ‖
/// next-id ‖ payload, stored under key = node id.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Node {
    id: u64,
    prev: u64,
    next: u64,
    data: Vec<u8>,
}

impl Node {
    fn encode(&self) -> Vec<u8> {
        let prev = int_to_bytes(self.prev as i64);
        let next = int_to_bytes(self.next as i64);
        let mut buffer = Vec::with_capacity(2 + prev.len() + next.len() + self.data.len());
        buffer.push(prev.len() as u8);
        buffer.push(next.len() as u8);
        buffer.extend_from_slice(&prev);
        buffer.extend_from_slice(&next);
        buffer.extend_from_slice(&self.data);
        buffer
    }

    fn decode(id: u64, bytes: &[u8]) -> Result<Node, Error> {
        if bytes.len() < 2 {
            return Err(Error::CorruptNode);
        }
        let prev_length = bytes[0] as usize;
        let next_length = bytes[1] as usize;
        let payload_start = 2 + prev_length + next_length;
        if bytes.len() < payload_start {
            return Err(Error::CorruptNode);
        }
        let prev = decode_id(&bytes[2..2 + prev_length])?;
        let next = decode_id(&bytes[2 + prev_length..payload_start])?;
        Ok(Node {
            id,
            prev,
            next,
            data: bytes[payload_start..].to_vec(),
        })
    }
}

fn decode_id(bytes: &[u8]) -> Result<u64, Error> {
    u64::try_from(int_from_bytes(bytes)?).map_err(|_| Error::CorruptNode)
}

fn node_key(id: u64) -> Vec<u8> {
    int_to_bytes(id as i64)
}

fn read_node<S: KeyValueStore>(db: &NamespaceDb<S>, id: u64) -> Result<Option<Node>, Error> {
    match db.get(&node_key(id))? {
        Some(bytes) => Node::decode(id, &bytes).map(Some),
        None => Ok(None),
    }
}

fn write_node<S: KeyValueStore>(db: &NamespaceDb<S>, node: &Node) -> Result<(), Error> {
    Ok(db.put(&node_key(node.id), &node.encode())?)
}

/// An ordered persistent sequence supporting insertion and removal at the
/// head, tail, or an arbitrary index, built from individually addressable
/// nodes in the flat key space.
///
/// Node ids are allocated monotonically and never reused, so a stale reference
/// to a removed node can never alias a later insert. Indexed access walks from
/// whichever end is closer.
#[derive(Clone, Debug)]
pub struct LinkedListContainer<S, V> {
    db: NamespaceDb<S>,
    _value: PhantomData<V>,
}

impl<S: KeyValueStore, V: ContainerValue> LinkedListContainer<S, V> {
    /// Creates the list named `name` inside `db`'s namespace.
    pub fn new(db: &NamespaceDb<S>, name: &str) -> LinkedListContainer<S, V> {
        LinkedListContainer {
            db: container_db(db, LINKED_LIST_TAG, name),
            _value: PhantomData,
        }
    }

    fn counter(&self, key: &[u8]) -> Result<u64, Error> {
        match self.db.get(key)? {
            Some(bytes) => decode_id(&bytes).map_err(|_| {
                Error::TypeMismatch("stored list counter is not a valid id".to_string())
            }),
            None => Ok(0),
        }
    }

    fn set_counter(&self, key: &[u8], value: u64) -> Result<(), Error> {
        Ok(self.db.put(key, &int_to_bytes(value as i64))?)
    }

    /// Returns the number of elements.
    pub fn len(&self) -> Result<u64, Error> {
        self.counter(SIZE_KEY)
    }

    /// Returns `true` if the list holds no elements.
    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// The id of the head node, or zero when the list is empty.
    pub fn head_id(&self) -> Result<u64, Error> {
        self.counter(HEAD_ID_KEY)
    }

    /// The id of the tail node, or zero when the list is empty.
    pub fn tail_id(&self) -> Result<u64, Error> {
        self.counter(TAIL_ID_KEY)
    }

    /// Inserts `value` at the front of the list.
    pub fn push_front(&self, value: &V) -> Result<(), Error> {
        self.insert_at(0, value)
    }

    /// Appends `value` at the back of the list.
    pub fn push_back(&self, value: &V) -> Result<(), Error> {
        self.insert_at(-1, value)
    }

    /// Inserts `value` so that it ends up at `index`.
    ///
    /// `index == len()` appends; negative indices normalize as
    /// `index + len() + 1`, so `-1` also appends. Fails with
    /// [`Error::IndexOutOfRange`] when `index > len()`.
    pub fn insert_at(&self, index: i64, value: &V) -> Result<(), Error> {
        let last_id = self.counter(LAST_NODE_ID_KEY)?;
        let head_id = self.head_id()?;
        let tail_id = self.tail_id()?;
        let size = self.len()?;

        if index > size as i64 {
            return Err(Error::IndexOutOfRange { index, size });
        }
        let mut target = index;
        if target < 0 {
            target += size as i64 + 1;
        }

        let mut new_node = Node {
            id: last_id + 1,
            prev: NO_NODE,
            next: NO_NODE,
            data: value.encode_value(),
        };

        if size == 0 {
            write_node(&self.db, &new_node)?;
            self.set_counter(HEAD_ID_KEY, new_node.id)?;
            self.set_counter(TAIL_ID_KEY, new_node.id)?;
        } else if target == size as i64 {
            // Append: link after the current tail.
            let mut prev_node = self.node_by_index(head_id, tail_id, size, target - 1)?;
            prev_node.next = new_node.id;
            new_node.prev = prev_node.id;
            write_node(&self.db, &prev_node)?;
            write_node(&self.db, &new_node)?;
            self.set_counter(TAIL_ID_KEY, new_node.id)?;
        } else {
            // Interior insert: the node currently at `target` becomes the new
            // node's next neighbor.
            let mut next_node = self.node_by_index(head_id, tail_id, size, target)?;
            let prev_node = read_node(&self.db, next_node.prev)?;
            next_node.prev = new_node.id;
            new_node.next = next_node.id;
            match prev_node {
                Some(mut prev_node) => {
                    prev_node.next = new_node.id;
                    new_node.prev = prev_node.id;
                    write_node(&self.db, &prev_node)?;
                }
                // No previous neighbor: the new node becomes head.
                None => self.set_counter(HEAD_ID_KEY, new_node.id)?,
            }
            write_node(&self.db, &next_node)?;
            write_node(&self.db, &new_node)?;
        }

        self.set_counter(LAST_NODE_ID_KEY, new_node.id)?;
        self.set_counter(SIZE_KEY, size + 1)
    }

    /// Removes the element at the front of the list.
    pub fn remove_front(&self) -> Result<(), Error> {
        self.remove_at(0)
    }

    /// Removes the element at the back of the list.
    pub fn remove_back(&self) -> Result<(), Error> {
        self.remove_at(-1)
    }

    /// Removes the element at `index`; negative indices normalize as
    /// `index + len()`. Fails with [`Error::IndexOutOfRange`] when
    /// `index >= len()`.
    pub fn remove_at(&self, index: i64) -> Result<(), Error> {
        let head_id = self.head_id()?;
        let tail_id = self.tail_id()?;
        let size = self.len()?;

        if size == 0 || index >= size as i64 {
            return Err(Error::IndexOutOfRange { index, size });
        }
        let mut target = index;
        if target < 0 {
            target += size as i64;
        }
        if target < 0 {
            return Err(Error::IndexOutOfRange { index, size });
        }

        if size == 1 {
            self.db.delete(&node_key(head_id))?;
            self.set_counter(HEAD_ID_KEY, NO_NODE)?;
            self.set_counter(TAIL_ID_KEY, NO_NODE)?;
        } else if target == size as i64 - 1 {
            // Tail removal: the previous node becomes tail.
            let removed = self.node_by_index(head_id, tail_id, size, target)?;
            let mut prev_node =
                read_node(&self.db, removed.prev)?.ok_or(Error::CorruptNode)?;
            prev_node.next = NO_NODE;
            write_node(&self.db, &prev_node)?;
            self.db.delete(&node_key(removed.id))?;
            self.set_counter(TAIL_ID_KEY, prev_node.id)?;
        } else {
            let removed = self.node_by_index(head_id, tail_id, size, target)?;
            let prev_node = read_node(&self.db, removed.prev)?;
            let next_node = read_node(&self.db, removed.next)?;
            match (prev_node, next_node) {
                (Some(mut prev_node), Some(mut next_node)) => {
                    prev_node.next = next_node.id;
                    next_node.prev = prev_node.id;
                    write_node(&self.db, &prev_node)?;
                    write_node(&self.db, &next_node)?;
                }
                // No previous neighbor: the removed node was head.
                (None, Some(mut next_node)) => {
                    next_node.prev = NO_NODE;
                    write_node(&self.db, &next_node)?;
                    self.set_counter(HEAD_ID_KEY, next_node.id)?;
                }
                // No next neighbor: the removed node was tail.
                (Some(mut prev_node), None) => {
                    prev_node.next = NO_NODE;
                    write_node(&self.db, &prev_node)?;
                    self.set_counter(TAIL_ID_KEY, prev_node.id)?;
                }
                (None, None) => return Err(Error::CorruptNode),
            }
            self.db.delete(&node_key(removed.id))?;
        }

        self.set_counter(SIZE_KEY, size - 1)
    }

    /// Returns the element at `index`; negative indices count from the end.
    pub fn get(&self, index: i64) -> Result<V, Error> {
        let head_id = self.head_id()?;
        let tail_id = self.tail_id()?;
        let size = self.len()?;
        let node = self.node_by_index(head_id, tail_id, size, index)?;
        V::decode_value(&node.data)
    }

    /// Returns `true` if any element equals `value`. Scans the whole list.
    pub fn contains(&self, value: &V) -> Result<bool, Error> {
        for element in self.iter()? {
            if element? == *value {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns a lazy iterator walking the list from head to tail.
    ///
    /// Counters are snapshotted when the iterator is created; calling `iter`
    /// again restarts from the current state.
    pub fn iter(&self) -> Result<LinkedListIter<S, V>, Error> {
        Ok(LinkedListIter {
            db: self.db.clone(),
            next_id: self.head_id()?,
            remaining: self.len()?,
            reverse: false,
            _value: PhantomData,
        })
    }

    /// Returns a lazy iterator walking the list from tail to head.
    pub fn iter_rev(&self) -> Result<LinkedListIter<S, V>, Error> {
        Ok(LinkedListIter {
            db: self.db.clone(),
            next_id: self.tail_id()?,
            remaining: self.len()?,
            reverse: true,
            _value: PhantomData,
        })
    }

    /// Locates the node at `index` by walking from whichever end is closer:
    /// indices in the second half of the list are reached backward from the
    /// tail, halving the average traversal cost.
    fn node_by_index(
        &self,
        head_id: u64,
        tail_id: u64,
        size: u64,
        index: i64,
    ) -> Result<Node, Error> {
        if index >= size as i64 {
            return Err(Error::IndexOutOfRange { index, size });
        }
        let mut target = index;
        if target < 0 {
            target += size as i64;
        }
        if target < 0 {
            return Err(Error::IndexOutOfRange { index, size });
        }

        let (start_id, steps, reverse) = if target > (size / 2) as i64 {
            (tail_id, size as i64 - target - 1, true)
        } else {
            (head_id, target, false)
        };

        let mut node = read_node(&self.db, start_id)?.ok_or(Error::CorruptNode)?;
        for _ in 0..steps {
            let next_id = if reverse { node.prev } else { node.next };
            node = read_node(&self.db, next_id)?.ok_or(Error::CorruptNode)?;
        }
        Ok(node)
    }
}

/// A lazy, finite iterator over a [`LinkedListContainer`].
#[derive(Debug)]
pub struct LinkedListIter<S, V> {
    db: NamespaceDb<S>,
    next_id: u64,
    remaining: u64,
    reverse: bool,
    _value: PhantomData<V>,
}

impl<S: KeyValueStore, V: ContainerValue> Iterator for LinkedListIter<S, V> {
    type Item = Result<V, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = match read_node(&self.db, self.next_id) {
            Ok(Some(node)) => node,
            Ok(None) => {
                self.remaining = 0;
                return Some(Err(Error::CorruptNode));
            }
            Err(error) => {
                self.remaining = 0;
                return Some(Err(error));
            }
        };
        self.next_id = if self.reverse { node.prev } else { node.next };
        self.remaining -= 1;
        Some(V::decode_value(&node.data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}
