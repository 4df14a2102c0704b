//! Foundation types for the Dyad semantic core.
//!
//! Primitives with no dependencies on the rest of the crate: source
//! positions/spans and the entity addressing scheme.

pub mod entity;
pub mod position;

pub use entity::{Entity, EntityKind, EntityParseError};
pub use position::{Position, SourceLocation, Span};
