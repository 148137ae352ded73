//! Persistent container primitives for contract state.
//!
//! Each container instance lives inside a contract's key-value sub-space under
//! a prefix of `kind tag ‖ separator ‖ name`, so two container declarations of
//! different kinds never collide even when given the same name. Instances are
//! created fresh per invocation and hold no state beyond their namespace view;
//! all durable state lives in the key-value store.

mod array;
mod error;
mod linked_list;
mod map;
mod value;
mod var;

pub use array::{ArrayContainer, ArrayIter};
pub use error::Error;
pub use linked_list::{LinkedListContainer, LinkedListIter};
pub use map::MapContainer;
pub use value::{int_from_bytes, int_to_bytes, ContainerKey, ContainerValue};
pub use var::VarSlot;

use crate::global_state::{KeyValueStore, NamespaceDb};

/// Container kind discriminators.
const ARRAY_TAG: u8 = 0x00;
const MAP_TAG: u8 = 0x01;
const VAR_TAG: u8 = 0x02;
const LINKED_LIST_TAG: u8 = 0x03;

fn container_db<S: KeyValueStore>(db: &NamespaceDb<S>, tag: u8, name: &str) -> NamespaceDb<S> {
    db.sub_db(&[tag]).sub_db(name.as_bytes())
}
