/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Profile of the authenticated user
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register new user
/// - `POST /api/v1/auth/login` - Login and get a token
/// - `GET /api/v1/auth/profile` - Current user (JWT required)

use crate::{
    app::AppState,
    envelope::Envelope,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use ctftoolkit_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{NewUser, UserProfile},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name
    #[validate(length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"))]
    pub username: String,

    /// Password (hashed before storage)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User summary returned on login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token (7 days)
    pub token: String,

    pub user: LoginUser,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "secret1",
///   "email": "alice@example.com"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Username or email already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Envelope<RegisterResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = hash_blocking(req.password).await?;

    let user = state
        .store
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Registered user");

    Ok(Envelope::success(
        "User registered successfully",
        RegisterResponse {
            username: user.username,
            email: user.email,
        },
    ))
}

/// Login endpoint
///
/// Authenticates a user and returns a JWT.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "secret1"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: Unknown user or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Envelope<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let Some(user) = state.store.find_user_by_username(&req.username).await? else {
        verify_unknown_user_blocking(req.password).await;
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_blocking(req.password, user.password_hash.clone()).await? {
        tracing::debug!(username = %user.username, "Password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let claims = jwt::Claims::new(user.id.clone(), user.username.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Envelope::success(
        "Login successful",
        LoginResponse {
            token,
            user: LoginUser {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        },
    ))
}

/// Profile of the authenticated user
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, malformed, invalid or expired token
/// - `404 Not Found`: The token's user no longer exists
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Envelope<UserProfile>> {
    let user = state
        .store
        .find_user_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Envelope::success("Profile retrieved", UserProfile::from(&user)))
}

// Argon2 is CPU-bound; keep it off the async workers
async fn hash_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| ApiError::internal("An internal error occurred", e))?
        .map_err(ApiError::from)
}

async fn verify_blocking(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal("An internal error occurred", e))?
        .map_err(ApiError::from)
}

async fn verify_unknown_user_blocking(password: String) {
    let outcome = tokio::task::spawn_blocking(move || password::verify_dummy(&password)).await;
    if let Ok(Err(e)) = outcome {
        tracing::warn!(error = %e, "Dummy password verification failed");
    }
}
