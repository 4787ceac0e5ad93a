//! JSON response envelope shared by the API handlers.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Standard API response envelope.
///
/// ```json
/// { "success": true, "message": "File uploaded successfully", "data": { ... } }
/// ```
///
/// `data` is left out entirely when there is nothing to return.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    pub fn error(status: StatusCode, message: impl Into<String>) -> impl IntoResponse {
        (
            status,
            Json(ApiResponse::<()> {
                success: false,
                message: message.into(),
                data: None,
            }),
        )
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
        Json(ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

/// Result of a stored upload.
#[derive(Debug, Serialize)]
pub struct UploadData {
    pub filename: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub url: String,
    pub size: u64,
}
