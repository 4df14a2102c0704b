//! # Workspace
//!
//! Owns the mutable abstract syntax forest, the attribute index, and all
//! memoization caches, and wraps them in an incremental update loop:
//! provider file events trigger AST reconstruction for the affected files
//! only, followed by lazy re-indexing on next access.
//!
//! All shared state is owned exclusively by the [`Workspace`]; external
//! access goes through its query/transaction API.

mod cache;
mod core;
mod events;
mod forest;
mod query;
mod transaction;

pub use cache::{MemoCache, RevisionLog};
pub use core::Workspace;
pub use forest::{Forest, Library, Module};
pub use query::QueryContext;
pub use transaction::Transaction;
