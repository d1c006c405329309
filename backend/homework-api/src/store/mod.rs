use async_trait::async_trait;
use thiserror::Error;

use crate::models::Assignment;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryAssignmentStore;
pub use mongo::MongoAssignmentStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("assignment {0} not found")]
    NotFound(String),

    /// The stored version moved since the snapshot was loaded.
    #[error("assignment {0} was modified concurrently")]
    Conflict(String),

    #[error("assignment {0} already exists")]
    AlreadyExists(String),

    #[error("assignment {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::AlreadyExists(_) => "already_exists",
            StoreError::Corrupt { .. } => "corrupt",
            StoreError::Backend(_) => "backend",
        }
    }
}

/// Persistence boundary for assignment snapshots.
///
/// `save` is a conditional write: it succeeds only when the stored version
/// equals `assignment.version`, and returns the snapshot with the bumped
/// version.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn load(&self, assignment_id: &str) -> Result<Assignment, StoreError>;

    async fn save(&self, assignment: &Assignment) -> Result<Assignment, StoreError>;

    async fn insert(&self, assignment: &Assignment) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str;
}
