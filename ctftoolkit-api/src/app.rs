/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use ctftoolkit_api::{app::AppState, config::Config};
/// use ctftoolkit_shared::{db::memory::MemoryStore, tools::ScriptDispatcher};
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let runner = ScriptDispatcher::new(&config.tools.python_bin, &config.tools.scripts_dir);
/// let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(runner), config);
/// let app = ctftoolkit_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiResult};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use ctftoolkit_shared::{
    auth::middleware::authenticate,
    db::Store,
    models::tool_log::ToolLog,
    tools::{ToolInvocation, ToolResult, ToolRunner},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Longest a request waits on its tool-log write
pub const TOOL_LOG_TIMEOUT: Duration = Duration::from_millis(500);

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// User and tool-log persistence
    pub store: Arc<dyn Store>,

    /// External tool runner
    pub runner: Arc<dyn ToolRunner>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, runner: Arc<dyn ToolRunner>, config: Config) -> Self {
        Self {
            store,
            runner,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Directory for uploads and generated artifacts
    pub fn upload_dir(&self) -> &Path {
        &self.config.tools.upload_dir
    }

    /// Runs a tool, parses its output and records a usage log
    pub async fn run_tool(
        &self,
        headers: &HeaderMap,
        invocation: &ToolInvocation,
    ) -> ApiResult<ToolResult> {
        let result = self.runner.run_json(invocation).await?;
        self.record_tool_log(headers, invocation, &result).await;
        Ok(result)
    }

    /// Best-effort write of a tool log entry
    ///
    /// The caller is attributed when the request carries a valid bearer
    /// token; otherwise the entry is anonymous. A write that fails or takes
    /// longer than [`TOOL_LOG_TIMEOUT`] is logged and dropped.
    async fn record_tool_log(
        &self,
        headers: &HeaderMap,
        invocation: &ToolInvocation,
        result: &ToolResult,
    ) {
        let user_id = authenticate(headers, self.jwt_secret())
            .ok()
            .map(|ctx| ctx.user_id);
        let output = serde_json::to_string(result).unwrap_or_default();
        let log = ToolLog::new(user_id, invocation.tool(), invocation.summary(), output);

        match tokio::time::timeout(TOOL_LOG_TIMEOUT, self.store.record_tool_log(log)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(tool = %invocation.tool(), error = %e, "Failed to record tool log");
            }
            Err(_) => {
                tracing::warn!(
                    tool = %invocation.tool(),
                    timeout_ms = TOOL_LOG_TIMEOUT.as_millis() as u64,
                    "Timed out recording tool log"
                );
            }
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api/v1
/// ├── GET  /health
/// ├── /auth
/// │   ├── POST /register
/// │   ├── POST /login
/// │   └── GET  /profile            (JWT required)
/// ├── POST /crypto/caesar
/// ├── POST /stego/exif             (multipart: image)
/// ├── POST /binary/strings         (multipart: file)
/// ├── POST /web/http-simulator
/// ├── POST /network/pcap           (multipart: pcap)
/// ├── POST /osint/sherlock
/// ├── POST /misc/qr
/// └── GET  /files/:name
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Body limit
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Authentication (profile route only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Profile requires JWT authentication
    let profile_routes = Router::new()
        .route("/profile", get(routes::auth::profile))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(profile_routes);

    let tool_routes = Router::new()
        .route("/crypto/caesar", post(routes::crypto::caesar))
        .route("/stego/exif", post(routes::stego::exif))
        .route("/binary/strings", post(routes::binary::strings))
        .route("/web/http-simulator", post(routes::web::http_simulator))
        .route("/network/pcap", post(routes::network::pcap))
        .route("/osint/sherlock", post(routes::osint::sherlock))
        .route("/misc/qr", post(routes::misc::qr_code))
        .route("/files/:name", get(routes::files::download));

    let v1_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .merge(tool_routes);

    Router::new()
        .nest("/api/v1", v1_routes)
        .layer(DefaultBodyLimit::max(state.config.api.max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .with_state(state)
}

/// Permissive CORS when the origin list contains `*`, otherwise an allow-list
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects AuthContext into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = %auth_context.user_id, "Authenticated request");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
