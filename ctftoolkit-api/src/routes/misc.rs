/// Miscellaneous endpoints
///
/// - `POST /api/v1/misc/qr` - QR code generation (JSON or form body)
///
/// The generated image stays in the upload directory and is served by
/// `GET /api/v1/files/:name`.

use crate::{
    app::AppState,
    envelope::Envelope,
    error::{ApiError, ApiResult},
};
use super::{no_nul_bytes, JsonOrForm};
use axum::{extract::State, http::HeaderMap};
use chrono::Local;
use ctftoolkit_shared::{
    tools::{ToolInvocation, ToolResult},
    uploads,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct QrRequest {
    #[validate(
        length(min = 1, message = "Text input is required"),
        custom(function = "no_nul_bytes")
    )]
    pub text: String,
}

static QR_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Artifact name for a QR code generated now
///
/// `qr_<YYYYMMDDhhmmss>_<n>.png`, where `n` counts up per process so two
/// codes in the same second get distinct files.
pub fn qr_file_name() -> String {
    let n = QR_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("qr_{}_{}.png", uploads::timestamp(Local::now()), n)
}

pub async fn qr_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonOrForm(req): JsonOrForm<QrRequest>,
) -> ApiResult<Envelope<ToolResult>> {
    req.validate()?;

    tokio::fs::create_dir_all(state.upload_dir())
        .await
        .map_err(|e| ApiError::internal("Failed to prepare output directory", e))?;

    let file_name = qr_file_name();
    let output = state.upload_dir().join(&file_name);

    let invocation = ToolInvocation::qr_code(&req.text, &output);
    let mut result = state.run_tool(&headers, &invocation).await?;

    result.insert(
        "file_path".to_string(),
        Value::String(output.to_string_lossy().into_owned()),
    );
    result.insert(
        "download_url".to_string(),
        Value::String(format!("/api/v1/files/{}", file_name)),
    );

    Ok(Envelope::success("QR code generated and saved successfully", result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_file_names_are_distinct() {
        let first = qr_file_name();
        let second = qr_file_name();

        assert_ne!(first, second);
        assert!(first.starts_with("qr_"));
        assert!(first.ends_with(".png"));
    }
}
