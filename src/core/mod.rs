//! Shared utilities with no knowledge of the semantic model.

pub mod events;

pub use events::{EventBus, EventEmitter};
