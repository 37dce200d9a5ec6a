//! Durable lifecycle state for externally provisioned instances.
//!
//! The store keeps one typed, persisted record per instance: what was asked
//! for and what was produced at each lifecycle stage (provision,
//! configuration), plus a bounded log of lifecycle events. Durability is
//! delegated to a pluggable [`StateBackend`]; the [`StateWriter`] guarantees
//! the in-memory copy never outruns what the backend has acknowledged.

pub mod backend;
pub mod error;
pub mod loader;
pub mod merge;
pub mod model;
pub mod parser;
pub mod writer;

pub use backend::StateBackend;
pub use error::StateError;
pub use loader::StateLoader;
pub use model::{
    AnonymousSchema, CommonConfiguration, EventType, InstanceEvent, InstanceState, Payload,
    ProviderSchema, RawRecord, StepState, STATE_MAX_EVENTS,
};
pub use writer::StateWriter;
