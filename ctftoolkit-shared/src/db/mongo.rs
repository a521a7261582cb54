/// MongoDB document store
///
/// Connects once at startup, verifies connectivity with a `ping` command, and
/// ensures unique indexes on `users.username` and `users.email`. The driver's
/// internal pool is shared by every request.
///
/// # Example
///
/// ```no_run
/// use ctftoolkit_shared::db::mongo::{MongoConfig, MongoStore};
///
/// # async fn example() -> Result<(), ctftoolkit_shared::db::StoreError> {
/// let config = MongoConfig {
///     uri: "mongodb://localhost:27017/ctf_toolkit".to_string(),
///     database: "ctf_toolkit".to_string(),
///     ..Default::default()
/// };
///
/// let store = MongoStore::connect(config).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{self, doc, oid::ObjectId},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Store, StoreError, StoreResult, UniqueField};
use crate::models::{
    tool_log::ToolLog,
    user::{NewUser, User},
};

const USERS: &str = "users";
const TOOL_LOGS: &str = "tool_logs";

/// Server error code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

/// Connection settings
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string, e.g. `mongodb://localhost:27017/ctf_toolkit`
    pub uri: String,

    /// Database name
    pub database: String,

    /// Maximum connections held by the driver pool
    ///
    /// Default: 10
    pub max_pool_size: u32,

    /// Timeout for establishing a connection (seconds)
    ///
    /// Default: 10
    pub connect_timeout_seconds: u64,

    /// Timeout for selecting a server (seconds)
    ///
    /// Default: 10
    pub server_selection_timeout_seconds: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: String::new(),
            max_pool_size: 10,
            connect_timeout_seconds: 10,
            server_selection_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    username: String,
    email: String,
    password: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl UserDocument {
    fn into_user(self) -> StoreResult<User> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Backend("user document without _id".to_string()))?;

        Ok(User {
            id: id.to_hex(),
            username: self.username,
            email: self.email,
            password_hash: self.password,
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ToolLogDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<ObjectId>,
    tool_name: String,
    timestamp: bson::DateTime,
    input: String,
    output: String,
}

impl From<ToolLog> for ToolLogDocument {
    fn from(log: ToolLog) -> Self {
        Self {
            user_id: log
                .user_id
                .as_deref()
                .and_then(|id| ObjectId::parse_str(id).ok()),
            tool_name: log.tool_name,
            timestamp: to_bson_datetime(log.timestamp),
            input: log.input,
            output: log.output,
        }
    }
}

fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_datetime(at: bson::DateTime) -> StoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(at.timestamp_millis())
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {}", at)))
}

/// Name of the unique index guarding `field`
fn index_name(field: UniqueField) -> &'static str {
    match field {
        UniqueField::Username => "username_1",
        UniqueField::Email => "email_1",
    }
}

/// Picks the violated index out of a duplicate-key message
///
/// Messages look like `E11000 duplicate key error collection: db.users
/// index: email_1 dup key: { email: "a@x.com" }`. Only the index name is
/// inspected; the duplicated value may contain anything.
fn field_from_duplicate_message(message: &str) -> UniqueField {
    let index = message
        .split_once("index: ")
        .and_then(|(_, rest)| rest.split_whitespace().next());

    match index {
        Some(name) if name == index_name(UniqueField::Email) => UniqueField::Email,
        _ => UniqueField::Username,
    }
}

fn duplicate_field(err: &MongoError) -> Option<UniqueField> {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error))
            if write_error.code == DUPLICATE_KEY =>
        {
            Some(field_from_duplicate_message(&write_error.message))
        }
        _ => None,
    }
}

impl From<MongoError> for StoreError {
    fn from(err: MongoError) -> Self {
        match duplicate_field(&err) {
            Some(field) => StoreError::Duplicate(field),
            None => StoreError::Backend(err.to_string()),
        }
    }
}

/// MongoDB-backed [`Store`]
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connects, pings and prepares indexes
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is invalid, the server is unreachable,
    /// or index creation fails.
    pub async fn connect(config: MongoConfig) -> StoreResult<Self> {
        info!(
            database = %config.database,
            max_pool_size = config.max_pool_size,
            "Connecting to MongoDB"
        );

        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some("ctftoolkit-api".to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_seconds));

        let client = Client::with_options(options)?;
        let store = Self {
            db: client.database(&config.database),
        };

        store.ping().await?;
        store.ensure_indexes().await?;

        info!("MongoDB connection established");
        Ok(store)
    }

    fn users(&self) -> Collection<UserDocument> {
        self.db.collection(USERS)
    }

    fn tool_logs(&self) -> Collection<ToolLogDocument> {
        self.db.collection(TOOL_LOGS)
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        for field in [UniqueField::Username, UniqueField::Email] {
            let key = field.to_string();
            let index = IndexModel::builder()
                .keys(doc! { key: 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name(index_name(field).to_string())
                        .build(),
                )
                .build();
            self.users().create_index(index, None).await?;
            debug!(%field, "Ensured unique index on users");
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let users = self.users();

        // The unique indexes are the real guard; these lookups give the
        // precise field in the common case.
        if users
            .find_one(doc! { "username": &user.username }, None)
            .await?
            .is_some()
        {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        if users
            .find_one(doc! { "email": &user.email }, None)
            .await?
            .is_some()
        {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }

        let now = to_bson_datetime(Utc::now());
        let mut document = UserDocument {
            id: None,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            created_at: now,
            updated_at: now,
        };

        let inserted = users.insert_one(&document, None).await?;
        let id = inserted.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::Backend("insert returned a non-ObjectId _id".to_string())
        })?;
        document.id = Some(id);

        debug!(user_id = %id, "Created user");
        document.into_user()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.users()
            .find_one(doc! { "username": username }, None)
            .await?
            .map(UserDocument::into_user)
            .transpose()
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        self.users()
            .find_one(doc! { "_id": object_id }, None)
            .await?
            .map(UserDocument::into_user)
            .transpose()
    }

    async fn record_tool_log(&self, log: ToolLog) -> StoreResult<()> {
        self.tool_logs()
            .insert_one(ToolLogDocument::from(log), None)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        debug!("Performing MongoDB health check");

        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(error = %e, "MongoDB health check failed");
                StoreError::from(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MongoConfig::default();
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.connect_timeout_seconds, 10);
        assert_eq!(config.server_selection_timeout_seconds, 10);
    }

    #[test]
    fn test_datetime_conversion_keeps_millis() {
        let now = Utc::now();
        let back = from_bson_datetime(to_bson_datetime(now)).unwrap();
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_user_document_into_user() {
        let id = ObjectId::new();
        let now = to_bson_datetime(Utc::now());
        let document = UserDocument {
            id: Some(id),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "$argon2id$hash".to_string(),
            created_at: now,
            updated_at: now,
        };

        let user = document.into_user().unwrap();
        assert_eq!(user.id, id.to_hex());
        assert_eq!(user.password_hash, "$argon2id$hash");
    }

    #[test]
    fn test_user_document_without_id() {
        let now = to_bson_datetime(Utc::now());
        let document = UserDocument {
            id: None,
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: String::new(),
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(document.into_user(), Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_duplicate_message_uses_index_name() {
        let email = r#"E11000 duplicate key error collection: ctf_toolkit.users index: email_1 dup key: { email: "alice@x.com" }"#;
        assert_eq!(field_from_duplicate_message(email), UniqueField::Email);

        // The duplicated value mentions "email" but the index is the username one
        let username = r#"E11000 duplicate key error collection: ctf_toolkit.users index: username_1 dup key: { username: "myemail" }"#;
        assert_eq!(field_from_duplicate_message(username), UniqueField::Username);
    }

    #[test]
    fn test_tool_log_document_drops_malformed_user_id() {
        let log = ToolLog::new(Some("not-an-oid".to_string()), crate::tools::Tool::Pcap, "x", "{}");
        assert!(ToolLogDocument::from(log).user_id.is_none());

        let id = ObjectId::new();
        let log = ToolLog::new(Some(id.to_hex()), crate::tools::Tool::Pcap, "x", "{}");
        assert_eq!(ToolLogDocument::from(log).user_id, Some(id));
    }
}
