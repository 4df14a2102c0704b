//! Workspace-level events.

use crate::base::Entity;
use crate::project::TransactionId;

/// Published by the workspace as the forest changes.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEvent {
    LibraryAdded { library: Entity },
    FileAdded { file: Entity },
    FileChanged { file: Entity },
    FileRemoved { file: Entity },
    TransactionCommitted { transaction_id: TransactionId },
}
