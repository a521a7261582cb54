/// Persistence layer
///
/// The API holds an `Arc<dyn Store>` constructed at startup and passed down
/// through application state; there is no process-wide database handle.
///
/// # Implementations
///
/// - [`mongo::MongoStore`]: MongoDB document store (production)
/// - [`memory::MemoryStore`]: in-process store for tests and local runs
///
/// # Uniqueness
///
/// Username and email are each unique. Implementations report a clash as
/// [`StoreError::Duplicate`] naming the offending field, whether it was
/// caught by the pre-insert lookup or by the unique index.

use async_trait::async_trait;
use std::fmt;

use crate::models::{
    tool_log::ToolLog,
    user::{NewUser, User},
};

pub mod memory;
pub mod mongo;

/// Field protected by a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique field already taken
    #[error("{0} already exists")]
    Duplicate(UniqueField),

    /// Backend failure (connection, query, decoding)
    #[error("Store error: {0}")]
    Backend(String),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// User and tool-log persistence
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a new user, enforcing username and email uniqueness
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Looks up a user by username
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Looks up a user by identifier; malformed identifiers yield `None`
    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Appends a tool invocation record
    async fn record_tool_log(&self, log: ToolLog) -> StoreResult<()>;

    /// Checks backend connectivity
    async fn ping(&self) -> StoreResult<()>;
}
