/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, profile)
/// - `crypto`, `stego`, `binary`, `web`, `network`, `osint`, `misc`: tool endpoints
/// - `files`: Generated artifact downloads

pub mod auth;
pub mod binary;
pub mod crypto;
pub mod files;
pub mod health;
pub mod misc;
pub mod network;
pub mod osint;
pub mod stego;
pub mod web;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;
use validator::ValidationError;

use crate::error::{ApiError, ApiResult};

/// Request body read as JSON, or as an urlencoded form when the
/// content type says so
#[derive(Debug)]
pub(crate) struct JsonOrForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

/// Rejects text that cannot be passed as a process argument
pub(crate) fn no_nul_bytes(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        let mut error = ValidationError::new("nul_byte");
        error.message = Some("Must not contain NUL bytes".into());
        return Err(error);
    }
    Ok(())
}

/// A file received in a multipart form field
#[derive(Debug)]
pub(crate) struct UploadedFile {
    /// Client-supplied file name
    pub file_name: String,
    pub contents: Bytes,
}

/// Reads the first multipart field named `field`
///
/// Other fields are skipped. A missing field is a 400 with `missing_message`.
pub(crate) async fn read_file_field(
    multipart: &mut Multipart,
    field: &str,
    missing_message: &str,
) -> ApiResult<UploadedFile> {
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }

        let file_name = part.file_name().unwrap_or(field).to_string();
        let contents = part.bytes().await?;
        return Ok(UploadedFile {
            file_name,
            contents,
        });
    }

    Err(ApiError::BadRequest(missing_message.to_string()))
}
