/// Bearer-token authentication for Axum
///
/// Extracts a bearer token from the `Authorization` header and validates it
/// against the configured JWT secret. The API server wraps
/// [`authenticate`] in a `from_fn_with_state` layer on protected routes and
/// inserts the resulting [`AuthContext`] into the request extensions.
///
/// # Rejections
///
/// | Condition | Error |
/// |---|---|
/// | No `Authorization` header | [`AuthError::MissingCredentials`] |
/// | Header not `Bearer <token>` | [`AuthError::InvalidFormat`] |
/// | Bad signature, algorithm, issuer or expired | [`AuthError::InvalidToken`] |
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use ctftoolkit_shared::auth::{jwt, middleware::authenticate};
///
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let token = jwt::create_token(&jwt::Claims::new("65f0c0ffee0000000000beef", "alice"), secret).unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
/// );
///
/// let auth = authenticate(&headers, secret).unwrap();
/// assert_eq!(auth.username, "alice");
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, Claims, JwtError};

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// User identifier (hex ObjectId)
    pub user_id: String,

    /// Username carried by the token
    pub username: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Authorization header is required")]
    MissingCredentials,

    /// Header present but not a usable bearer token
    #[error("Bearer token is required")]
    InvalidFormat,

    /// Token validation failed
    #[error("Invalid or expired token")]
    InvalidToken(#[source] JwtError),
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidFormat)?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

/// Authenticates a request from its headers
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AuthError::InvalidToken(e)
    })?;

    Ok(claims.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, token_lifetime};
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_valid_token() {
        let token = create_token(&Claims::new("abc123", "alice"), SECRET).unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        let context = authenticate(&headers, SECRET).expect("Should authenticate");
        assert_eq!(context.user_id, "abc123");
        assert_eq!(context.username, "alice");
    }

    #[test]
    fn test_missing_header() {
        let result = authenticate(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_malformed_header() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer ", "token-without-scheme"] {
            let result = authenticate(&headers_with(value), SECRET);
            assert!(
                matches!(result, Err(AuthError::InvalidFormat)),
                "{:?} should be rejected as malformed",
                value
            );
        }
    }

    #[test]
    fn test_invalid_signature() {
        let token = create_token(&Claims::new("abc123", "alice"), "x".repeat(40).as_str()).unwrap();
        let result = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token() {
        let issued = Utc::now() - token_lifetime() - Duration::hours(1);
        let token = create_token(&Claims::issued_at("abc123", "alice", issued), SECRET).unwrap();

        let result = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET);
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(JwtError::Expired))
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AuthError::MissingCredentials.to_string(),
            "Authorization header is required"
        );
        assert_eq!(AuthError::InvalidFormat.to_string(), "Bearer token is required");
        assert_eq!(
            AuthError::InvalidToken(JwtError::Expired).to_string(),
            "Invalid or expired token"
        );
    }
}
