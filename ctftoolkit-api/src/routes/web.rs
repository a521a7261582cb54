/// Web exploitation endpoints
///
/// - `POST /api/v1/web/http-simulator` - crafted HTTP request

use crate::{app::AppState, envelope::Envelope, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use super::no_nul_bytes;
use ctftoolkit_shared::tools::{invocation::DEFAULT_HTTP_METHOD, ToolInvocation, ToolResult};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// HTTP simulator request
///
/// ```json
/// { "url": "http://target/login", "method": "POST", "data": "user=admin" }
/// ```
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "optional_args_have_no_nul"))]
pub struct HttpSimulatorRequest {
    #[validate(
        length(min = 1, message = "URL is required"),
        custom(function = "no_nul_bytes")
    )]
    pub url: String,

    /// Defaults to `GET`
    pub method: Option<String>,

    /// Request body, forwarded only when non-empty
    pub data: Option<String>,
}

fn optional_args_have_no_nul(req: &HttpSimulatorRequest) -> Result<(), ValidationError> {
    [&req.method, &req.data]
        .into_iter()
        .flatten()
        .try_for_each(|value| no_nul_bytes(value))
}

pub async fn http_simulator(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<HttpSimulatorRequest>, JsonRejection>,
) -> ApiResult<Envelope<ToolResult>> {
    let Json(req) = payload?;
    req.validate()?;

    let method = req.method.as_deref().unwrap_or(DEFAULT_HTTP_METHOD);
    let invocation = ToolInvocation::http_simulator(&req.url, method, req.data.as_deref());
    let result = state.run_tool(&headers, &invocation).await?;

    Ok(Envelope::success("HTTP request simulated successfully", result))
}
