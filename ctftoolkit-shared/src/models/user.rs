/// User account model
///
/// Users are stored in the `users` collection:
///
/// ```text
/// {
///   _id:        ObjectId,
///   username:   string   (unique index),
///   email:      string   (unique index),
///   password:   string   (Argon2id PHC hash),
///   created_at: date,
///   updated_at: date
/// }
/// ```
///
/// The password hash never leaves the server: [`User`] skips it when
/// serialized, and API responses are built from [`UserProfile`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identifier (hex ObjectId)
    pub id: String,

    /// Login name, unique across all users
    pub username: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    ///
    /// Never the plaintext password, never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Public view of a user returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}
