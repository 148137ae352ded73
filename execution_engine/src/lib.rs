//! The Keystone deploy engine: orchestration of contract install, update and
//! audit over deploy-record storage, delegating code materialization and
//! instantiation to runtime collaborators.

#![doc(html_root_url = "https://docs.rs/keystone-execution-engine/0.1.0")]
#![warn(missing_docs)]

pub mod engine_state;
pub mod runtime;
