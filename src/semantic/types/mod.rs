pub mod assertion;
pub mod events;
pub mod outcome;
pub mod problem;

pub use assertion::CompilerAssertion;
pub use events::WorkspaceEvent;
pub use outcome::Outcome;
pub use problem::{Problem, Severity, kinds, unique_problems};
