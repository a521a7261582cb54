/// JWT token issuance and validation
///
/// Login issues a single signed, time-boxed token per session. There is no
/// refresh flow: when the token expires the user logs in again.
///
/// # Security
///
/// - **Algorithm**: HS256 only. Tokens whose header names any other
///   algorithm are rejected, even when the signature would verify.
/// - **Expiration**: 7 days from issuance, validated with zero leeway
/// - **Issuer**: always `ctf-toolkit`
/// - **Secret**: supplied by validated configuration (at least 32 bytes)
///
/// # Example
///
/// ```
/// use ctftoolkit_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let claims = Claims::new("65f0c0ffee0000000000beef", "alice");
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token issuer claim
pub const ISSUER: &str = "ctf-toolkit";

/// Lifetime of a login token
pub fn token_lifetime() -> Duration {
    Duration::days(7)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, algorithm, issuer or format check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Claims carried by a login token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier (hex ObjectId)
    pub user_id: String,

    /// Username at the time of login
    pub username: String,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims issued now, expiring after [`token_lifetime`]
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self::issued_at(user_id, username, Utc::now())
    }

    /// Creates claims as if issued at `issued_at`
    ///
    /// Used to reason about expiry relative to a fixed issuance instant.
    pub fn issued_at(
        user_id: impl Into<String>,
        username: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self::with_expiration(user_id, username, issued_at, token_lifetime())
    }

    /// Creates claims with a custom lifetime
    pub fn with_expiration(
        user_id: impl Into<String>,
        username: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + expires_in).timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims
///
/// Verifies the HS256 signature, the algorithm named in the header, the
/// issuer and the expiry.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
