//! Storage for the Keystone contract-execution engine: the flat key-value
//! interface, the container primitives contracts use for persistent state,
//! and deploy-record storage.

#![doc(html_root_url = "https://docs.rs/keystone-storage/0.1.0")]
#![warn(missing_docs)]

/// Container primitives over a namespaced key-value sub-space.
pub mod container;
/// Deploy record and deploy tx params storage.
pub mod deploy;
/// The flat key-value interface and namespaced views of it.
pub mod global_state;

pub use container::{ArrayContainer, LinkedListContainer, MapContainer, VarSlot};
pub use deploy::DeployStorage;
pub use global_state::{scratch::ScratchState, KeyValueStore, NamespaceDb};
