/// OSINT endpoints
///
/// - `POST /api/v1/osint/sherlock` - username search across sites

use crate::{app::AppState, envelope::Envelope, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use super::no_nul_bytes;
use ctftoolkit_shared::tools::{ToolInvocation, ToolResult, DEFAULT_SHERLOCK_TIMEOUT};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SherlockRequest {
    #[validate(
        length(min = 1, message = "Username is required"),
        custom(function = "no_nul_bytes")
    )]
    pub username: String,
}

pub async fn sherlock(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SherlockRequest>, JsonRejection>,
) -> ApiResult<Envelope<ToolResult>> {
    let Json(req) = payload?;
    req.validate()?;

    let invocation = ToolInvocation::sherlock(&req.username, DEFAULT_SHERLOCK_TIMEOUT);
    let result = state.run_tool(&headers, &invocation).await?;

    Ok(Envelope::success("Sherlock search completed successfully", result))
}
