//! `POST /api/upload`: store a multipart file in object storage.

use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::AppState;
use super::types::{ApiResponse, UploadData};
use crate::store::object_key;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Uploaded file part.
struct FilePart {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<FilePart>,
    file_path: String,
    file_name: Option<String>,
}

/// Form fields: `file` (required), `filePath` and `fileName` (optional).
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            tracing::debug!("Upload without a multipart body: {}", e);
            return ApiResponse::error(StatusCode::BAD_REQUEST, "File is required").into_response();
        }
    };

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::debug!("Malformed upload form: {}", e);
            let message = format!("Invalid upload form: {}", e.body_text());
            return ApiResponse::error(e.status(), message).into_response();
        }
    };

    let Some(file) = form.file else {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "File is required").into_response();
    };

    let file_path = form.file_path;
    let file_name = form.file_name.unwrap_or(file.filename);
    let key = object_key(&file_path, &file_name);
    let size = file.bytes.len() as u64;

    match state.store.put(&key, file.bytes, &file.content_type).await {
        Ok(url) => ApiResponse::ok(
            "File uploaded successfully",
            UploadData {
                filename: file_name,
                file_path,
                url,
                size,
            },
        )
        .into_response(),
        Err(e) => {
            tracing::warn!("Upload of {} failed: {}", key, e);
            ApiResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to upload file: {}", e),
            )
            .into_response()
        }
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await?;
                form.file = Some(FilePart {
                    filename,
                    content_type,
                    bytes,
                });
            }
            "filePath" => form.file_path = field.text().await?,
            "fileName" => {
                let value = field.text().await?;
                if !value.is_empty() {
                    form.file_name = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}
