/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 login token issuance and validation
/// - [`middleware`]: Bearer-token extraction for Axum request headers
///
/// # Example
///
/// ```
/// use ctftoolkit_shared::auth::password::{hash_password, verify_password};
/// use ctftoolkit_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret1")?;
/// assert!(verify_password("secret1", &hash)?);
///
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let token = create_token(&Claims::new("65f0c0ffee0000000000beef", "alice"), secret)?;
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.username, "alice");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
