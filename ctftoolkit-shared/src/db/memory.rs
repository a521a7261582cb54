/// In-process store
///
/// Keeps users and tool logs in memory behind a single `RwLock`, so the
/// uniqueness check and the insert happen under one write guard.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult, UniqueField};
use crate::models::{
    tool_log::ToolLog,
    user::{NewUser, User},
};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    tool_logs: Vec<ToolLog>,
    next_id: u64,
}

/// In-memory [`Store`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored users
    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    /// Snapshot of all recorded tool logs
    pub async fn tool_logs(&self) -> Vec<ToolLog> {
        self.state.read().await.tool_logs.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }

        state.next_id += 1;
        let now = Utc::now();
        let created = User {
            // Same shape as a hex ObjectId
            id: format!("{:024x}", state.next_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };

        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn record_tool_log(&self, log: ToolLog) -> StoreResult<()> {
        self.state.write().await.tool_logs.push(log);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::new();

        let user = store.create_user(new_user("alice", "alice@x.com")).await.unwrap();
        assert_eq!(user.id.len(), 24);
        assert_eq!(user.created_at, user.updated_at);

        let by_name = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_id = store.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@x.com");

        assert!(store.find_user_by_username("bob").await.unwrap().is_none());
        assert!(store.find_user_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", "alice@x.com")).await.unwrap();

        let err = store
            .create_user(new_user("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Username)));
        assert_eq!(err.to_string(), "username already exists");

        let err = store
            .create_user(new_user("alice2", "alice@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Email)));
        assert_eq!(err.to_string(), "email already exists");

        assert_eq!(store.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_record_tool_log() {
        let store = MemoryStore::new();
        store
            .record_tool_log(ToolLog::new(None, Tool::Exif, "a.jpg", "{}"))
            .await
            .unwrap();

        let logs = store.tool_logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].tool_name, "exif");
        assert!(store.ping().await.is_ok());
    }
}
