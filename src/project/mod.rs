//! # Project
//!
//! Project manifests and the contracts the semantic core consumes from
//! its collaborators: the file-system provider, the textual parser, and
//! the pretty-printer. Concrete implementations (local disk, zip,
//! in-memory) live outside this crate.

pub mod manifest;
pub mod provider;

pub use manifest::{ManifestError, ProjectManifest};
pub use provider::{
    FileEvent, LibraryStamp, Provider, ProviderError, ProviderKey, SourceParser, SourceRenderer,
    TransactionId,
};
