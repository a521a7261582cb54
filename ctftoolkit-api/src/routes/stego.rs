/// Steganography endpoints
///
/// - `POST /api/v1/stego/exif` - EXIF metadata extraction (multipart field `image`)

use crate::{app::AppState, envelope::Envelope, error::ApiResult};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::HeaderMap,
};
use ctftoolkit_shared::{
    tools::{ToolInvocation, ToolResult},
    uploads::ScratchFile,
};

use super::read_file_field;

pub async fn exif(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Envelope<ToolResult>> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart, "image", "No image file provided").await?;

    let scratch =
        ScratchFile::create(state.upload_dir(), &upload.file_name, &upload.contents).await?;

    let invocation = ToolInvocation::exif(scratch.path());
    let result = state.run_tool(&headers, &invocation).await?;

    Ok(Envelope::success("EXIF data extracted successfully", result))
}
