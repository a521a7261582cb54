/// Generated artifact downloads
///
/// - `GET /api/v1/files/:name` - serves a file from the upload directory
///
/// Only bare file names are accepted, so requests cannot reach outside the
/// upload directory.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use ctftoolkit_shared::uploads::resolve_artifact;

fn content_type(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

pub async fn download(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let path = resolve_artifact(state.upload_dir(), &name)?;

    let contents = match tokio::fs::read(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("File not found".to_string()));
        }
        Err(e) => return Err(ApiError::internal("Failed to read file", e)),
    };

    Ok(([(header::CONTENT_TYPE, content_type(&name))], contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("qr_20240101120000.png"), "image/png");
        assert_eq!(content_type("photo.JPG"), "image/jpeg");
        assert_eq!(content_type("blob"), "application/octet-stream");
    }
}
