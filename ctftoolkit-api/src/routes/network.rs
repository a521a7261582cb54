/// Network forensics endpoints
///
/// - `POST /api/v1/network/pcap` - capture analysis (multipart field `pcap`)

use crate::{
    app::AppState,
    envelope::Envelope,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::HeaderMap,
};
use ctftoolkit_shared::{
    tools::{ToolInvocation, ToolResult},
    uploads::{has_allowed_extension, ScratchFile},
};

use super::read_file_field;

/// Accepted capture file extensions
pub const PCAP_EXTENSIONS: &[&str] = &[".pcap", ".pcapng", ".cap"];

pub async fn pcap(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Envelope<ToolResult>> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart, "pcap", "No PCAP file provided").await?;

    if !has_allowed_extension(&upload.file_name, PCAP_EXTENSIONS) {
        return Err(ApiError::BadRequest(
            "Invalid file type. Please upload a PCAP file".to_string(),
        ));
    }

    let scratch =
        ScratchFile::create(state.upload_dir(), &upload.file_name, &upload.contents).await?;

    let invocation = ToolInvocation::pcap(scratch.path(), None);
    let result = state.run_tool(&headers, &invocation).await?;

    Ok(Envelope::success("PCAP analysis completed successfully", result))
}
