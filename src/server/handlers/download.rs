//! `POST /api/download`: stream a ZIP of remote files.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use super::super::AppState;
use super::types::ApiResponse;
use crate::pipeline::{DownloadRequest, InputError};

/// Bytes buffered between the pipeline and the response body.
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

const ARCHIVE_FILENAME: &str = "download.zip";

#[derive(Debug, Deserialize)]
struct DownloadBody {
    #[serde(default)]
    urls: Option<Vec<String>>,
}

/// Accepts a JSON body `{"urls": [...]}` or a form with a `json` field
/// holding the same document.
pub async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match decode_download_request(&headers, &body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("Rejected download request: {}", e);
            return ApiResponse::error(StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    tracing::info!("Starting download of {} URLs", request.len());

    let (writer, reader) = tokio::io::duplex(STREAM_BUFFER_SIZE);
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        if let Err(e) = pipeline.run(&request, writer).await {
            tracing::warn!("Download stream aborted: {}", e);
        }
    });

    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", ARCHIVE_FILENAME),
            ),
        ],
        Body::from_stream(ReaderStream::new(reader)),
    )
        .into_response()
}

/// Parse a download request body according to its content type.
pub fn decode_download_request(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<DownloadRequest, InputError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let parsed: Option<DownloadBody> = if content_type.contains("application/json") {
        let parsed = serde_json::from_slice(body)
            .map_err(|e| InputError::MalformedBody(e.to_string()))?;
        Some(parsed)
    } else {
        match form_field(body, "json") {
            Some(json) if !json.is_empty() => {
                let parsed = serde_json::from_str(&json)
                    .map_err(|e| InputError::MalformedForm(e.to_string()))?;
                Some(parsed)
            }
            _ => None,
        }
    };

    let urls = parsed.and_then(|b| b.urls).unwrap_or_default();
    DownloadRequest::new(urls)
}

fn form_field(body: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
