/// Binary analysis endpoints
///
/// - `POST /api/v1/binary/strings` - printable string extraction (multipart field `file`)

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

/// Runs the strings extractor with the script's own minimum length
pub async fn strings(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Envelope<ToolResult>> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart, "file", "No binary file provided").await?;

    let scratch =
        ScratchFile::create(state.upload_dir(), &upload.file_name, &upload.contents).await?;

    let invocation = ToolInvocation::strings(scratch.path(), None);
    let result = state.run_tool(&headers, &invocation).await?;

    Ok(Envelope::success("Strings extracted successfully", result))
}
