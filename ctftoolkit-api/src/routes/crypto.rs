/// Cryptography endpoints
///
/// - `POST /api/v1/crypto/caesar` - Caesar cipher

use crate::{
    app::AppState,
    envelope::Envelope,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use super::no_nul_bytes;
use ctftoolkit_shared::tools::{CipherMode, ToolInvocation, ToolResult};
use serde::Deserialize;
use validator::Validate;

/// Caesar cipher request
///
/// ```json
/// { "text": "Hello", "key": 3, "mode": "encrypt" }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct CaesarRequest {
    #[validate(
        length(min = 1, message = "Text is required"),
        custom(function = "no_nul_bytes")
    )]
    pub text: String,

    /// Shift amount; any integer, the script wraps it
    pub key: i64,

    /// `encrypt` (default) or `decrypt`
    pub mode: Option<String>,
}

pub async fn caesar(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CaesarRequest>, JsonRejection>,
) -> ApiResult<Envelope<ToolResult>> {
    let Json(req) = payload?;
    req.validate()?;

    let mode = match req.mode.as_deref() {
        None | Some("") => CipherMode::default(),
        Some(mode) => mode
            .parse::<CipherMode>()
            .map_err(|_| ApiError::BadRequest("Mode must be 'encrypt' or 'decrypt'".to_string()))?,
    };

    let invocation = ToolInvocation::caesar(&req.text, req.key, mode);
    let result = state.run_tool(&headers, &invocation).await?;

    Ok(Envelope::success("Caesar cipher executed successfully", result))
}
