//! HTTP API.
//!
//! - `POST /api/download` streams a ZIP of remote files back to the caller
//! - `POST /api/upload` stores a multipart file in object storage
//! - `GET /debug/memory` reports process memory and runtime task counts

mod handlers;
mod routes;

pub use handlers::{decode_download_request, ApiResponse, MemoryReport, UploadData};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::fetch::HttpFetcher;
use crate::pipeline::DownloadPipeline;
use crate::store::{ObjectStore, S3ObjectStore};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DownloadPipeline>,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&settings.fetch)?;

        Ok(Self {
            pipeline: Arc::new(DownloadPipeline::new(Arc::new(fetcher))),
            store: Arc::new(S3ObjectStore::new(&settings.store)),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state, settings.server.max_upload_bytes());

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);
    tracing::debug!("Object store: {:?}", settings.store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use bytes::Bytes;
    use tower::ServiceExt;

    use crate::fetch::{FetchError, FetchedBody, Fetcher};
    use crate::store::StoreError;

    /// Serves `<path>` back as the body of any URL ending in `.txt`.
    struct EchoFetcher;

    #[async_trait]
    impl Fetcher for EchoFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError> {
            if url.ends_with(".txt") {
                Ok(FetchedBody::from_chunks(vec![Bytes::from(url.to_string())]))
            } else {
                Err(FetchError::Status(404))
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<Vec<(String, Bytes, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put(
            &self,
            key: &str,
            body: Bytes,
            content_type: &str,
        ) -> Result<String, StoreError> {
            if self.fail {
                return Err(StoreError::Upload("NoSuchBucket".to_string()));
            }
            self.objects
                .lock()
                .unwrap()
                .push((key.to_string(), body, content_type.to_string()));
            Ok(format!("http://store/bucket/{}", key))
        }
    }

    fn setup_test_app(store: Arc<MemoryStore>) -> axum::Router {
        let state = AppState {
            pipeline: Arc::new(DownloadPipeline::new(Arc::new(EchoFetcher))),
            store,
        };
        create_router(state, 1024 * 1024)
    }

    fn download_request(content_type: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/download")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const BOUNDARY: &str = "streamrelay-test-boundary";

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file, value) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file {
                Some((filename, content_type)) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    ));
                    if !content_type.is_empty() {
                        body.push_str(&format!("Content-Type: {}\r\n", content_type));
                    }
                }
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n",
                    name
                )),
            }
            body.push_str("\r\n");
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_download_streams_zip() {
        let app = setup_test_app(Arc::default());

        let response = app
            .oneshot(download_request(
                "application/json",
                r#"{"urls": ["http://x/a.txt", "http://x/b.png"]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=download.zip"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
        assert_eq!(zip.len(), 2);

        let mut content = String::new();
        zip.by_name("a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "http://x/a.txt");

        let mut report = String::new();
        zip.by_name("_download_errors.txt")
            .unwrap()
            .read_to_string(&mut report)
            .unwrap();
        assert!(report.contains("  - b.png: HTTP 404\n"));
    }

    #[tokio::test]
    async fn test_download_all_failed_is_still_ok() {
        let app = setup_test_app(Arc::default());

        let response = app
            .oneshot(download_request(
                "application/json",
                r#"{"urls": ["http://x/a.png"]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert!(names.contains(&"_download_errors.txt"));
        assert!(names.contains(&"_ALL_DOWNLOADS_FAILED.txt"));
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_download_from_form_field() {
        let app = setup_test_app(Arc::default());
        let body = format!(
            "json={}",
            urlencoding::encode(r#"{"urls":["http://x/a.txt"]}"#)
        );

        let response = app
            .oneshot(download_request("application/x-www-form-urlencoded", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    }

    #[tokio::test]
    async fn test_download_empty_urls_rejected() {
        let app = setup_test_app(Arc::default());

        let response = app
            .oneshot(download_request("application/json", r#"{"urls": []}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "URLs array is required");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_download_malformed_json_rejected() {
        let app = setup_test_app(Arc::default());

        let response = app
            .oneshot(download_request("application/json", "{\"urls\": ["))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body: "));
    }

    #[tokio::test]
    async fn test_upload_stores_file() {
        let store = Arc::new(MemoryStore::default());
        let app = setup_test_app(store.clone());

        let response = app
            .oneshot(multipart_request(&[
                ("file", Some(("photo.png", "image/png")), "pngdata"),
                ("filePath", None, "images/2024"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "File uploaded successfully");
        assert_eq!(json["data"]["filename"], "photo.png");
        assert_eq!(json["data"]["filePath"], "images/2024");
        assert_eq!(json["data"]["url"], "http://store/bucket/images/2024/photo.png");
        assert_eq!(json["data"]["size"], 7);

        let objects = store.objects.lock().unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].0, "images/2024/photo.png");
        assert_eq!(&objects[0].1[..], b"pngdata");
        assert_eq!(objects[0].2, "image/png");
    }

    #[tokio::test]
    async fn test_upload_custom_file_name() {
        let store = Arc::new(MemoryStore::default());
        let app = setup_test_app(store.clone());

        let response = app
            .oneshot(multipart_request(&[
                ("fileName", None, "renamed.bin"),
                ("file", Some(("original.bin", "")), "x"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["filename"], "renamed.bin");
        assert_eq!(json["data"]["filePath"], "");

        let objects = store.objects.lock().unwrap();
        assert_eq!(objects[0].0, "renamed.bin");
        assert_eq!(objects[0].2, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_without_file_rejected() {
        let app = setup_test_app(Arc::default());

        let response = app
            .oneshot(multipart_request(&[("filePath", None, "images")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "File is required");
    }

    #[tokio::test]
    async fn test_upload_store_failure() {
        let store = Arc::new(MemoryStore {
            fail: true,
            ..Default::default()
        });
        let app = setup_test_app(store);

        let response = app
            .oneshot(multipart_request(&[(
                "file",
                Some(("a.txt", "text/plain")),
                "hello",
            )]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(
            json["message"],
            "Failed to upload file: failed to upload file: NoSuchBucket"
        );
    }

    #[tokio::test]
    async fn test_upload_without_multipart_body() {
        let app = setup_test_app(Arc::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"file": "a.png"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "File is required");
    }

    #[tokio::test]
    async fn test_upload_over_body_limit() {
        let store = Arc::new(MemoryStore::default());
        let app = setup_test_app(store.clone());
        let oversized = "x".repeat(2 * 1024 * 1024);

        let response = app
            .oneshot(multipart_request(&[(
                "file",
                Some(("big.bin", "application/octet-stream")),
                &oversized,
            )]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid upload form: "));
        assert!(store.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_debug_memory() {
        let app = setup_test_app(Arc::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/debug/memory")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["workers"].as_u64().unwrap() >= 1);
        assert!(json.get("alive_tasks").is_some());
        assert!(json.get("physical_mb").is_some());
        #[cfg(target_os = "linux")]
        assert!(json["physical_mb"].as_f64().unwrap() > 0.0);
    }
}
