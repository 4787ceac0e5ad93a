//! HTTP request handlers for the web server.

mod debug;
mod download;
mod types;
mod upload;

// Re-export handlers for use by the router
pub use debug::{memory, MemoryReport};
pub use download::{decode_download_request, download};
pub use types::{ApiResponse, UploadData};
pub use upload::upload;
