/// Health check endpoint
///
/// Provides a simple health check endpoint that verifies:
/// - The server is running
/// - Database connectivity
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Service is healthy",
///   "data": {
///     "status": "healthy",
///     "service": "ctf-toolkit-api",
///     "version": "1.0.0",
///     "database": "connected"
///   }
/// }
/// ```

use crate::{app::AppState, envelope::Envelope};
use axum::extract::State;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Health check handler
///
/// Always answers 200; a failed store ping degrades `status` instead.
pub async fn health_check(State(state): State<AppState>) -> Envelope<HealthResponse> {
    let (status, database) = match state.store.ping().await {
        Ok(()) => ("healthy", "connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            ("degraded", "disconnected")
        }
    };

    Envelope::success(
        format!("Service is {}", status),
        HealthResponse {
            status: status.to_string(),
            service: "ctf-toolkit-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        },
    )
}
