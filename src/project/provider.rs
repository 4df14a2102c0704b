//! Contracts consumed from the file-system provider and the parser /
//! pretty-printer collaborators.
//!
//! The semantic core never touches a disk or a grammar: providers hand it
//! text and change events, the parser turns text into [`SourceFile`]
//! trees, and the renderer turns edited trees back into text at commit.

use uuid::Uuid;

use crate::semantic::types::Outcome;
use crate::syntax::SourceFile;

/// Identifier stamped on every provider event and commit; callers use it
/// to wait for a specific mutation's effects to propagate.
///
/// The workspace allocates ids for its own commits; a provider stamps
/// externally observed changes with ids of its own that must not reuse
/// the workspace's.
pub type TransactionId = u64;

/// What a provider path points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKey {
    /// A Dyad source file, addressed by library-relative path.
    Source(String),
    /// A non-source asset (icons, data files).
    Asset(String),
    /// The library's project manifest.
    ProjectManifest,
    /// The library's lock manifest.
    LockManifest,
}

impl ProviderKey {
    pub fn source(path: impl Into<String>) -> Self {
        ProviderKey::Source(path.into())
    }
}

/// Identity and version of the library a provider serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStamp {
    pub uuid: Uuid,
    pub version: String,
}

/// One batch of changes observed by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEvent {
    pub transaction_id: TransactionId,
    pub library: LibraryStamp,
    pub added: Vec<ProviderKey>,
    pub changed: Vec<ProviderKey>,
    pub deleted: Vec<ProviderKey>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("i/o failure: {0}")]
    Io(String),
    #[error("operation not supported by this provider: {0}")]
    Unsupported(&'static str),
}

/// The file-system provider contract.
///
/// One provider serves one library. Writes carry the caller's transaction
/// id; the provider must echo every mutation (its own observations and
/// the caller's writes alike) through [`Provider::take_events`].
pub trait Provider {
    fn init(&mut self) -> Result<(), ProviderError>;
    fn connect(&mut self) -> Result<(), ProviderError>;

    /// The name the library is registered under in the workspace.
    fn library_name(&self) -> &str;
    fn stamp(&self) -> LibraryStamp;

    fn read_file(&self, key: &ProviderKey) -> Result<String, ProviderError>;
    fn write_file(
        &mut self,
        key: &ProviderKey,
        text: &str,
        transaction: TransactionId,
    ) -> Result<(), ProviderError>;
    fn mkdir(&mut self, path: &str) -> Result<(), ProviderError>;
    fn rmdir(&mut self, path: &str) -> Result<(), ProviderError>;
    fn readdir(&self, path: &str) -> Result<Vec<String>, ProviderError>;
    fn unlink(&mut self, key: &ProviderKey) -> Result<(), ProviderError>;
    fn rename(&mut self, from: &str, to: &str) -> Result<(), ProviderError>;
    fn exists(&self, key: &ProviderKey) -> bool;

    /// Drain the provider's pending events, oldest first.
    fn take_events(&mut self) -> Vec<FileEvent>;
}

/// The parser collaborator: text in, AST out.
pub trait SourceParser {
    fn parse(&self, file_name: &str, text: &str) -> Outcome<SourceFile>;
}

/// The pretty-printer collaborator: AST in, text out. Used when a
/// transaction commits edited files back to their provider.
pub trait SourceRenderer {
    fn render(&self, file: &SourceFile) -> String;
}
