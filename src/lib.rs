//! streamrelay - relay files between clients, remote URLs and object storage.
//!
//! `POST /api/download` fetches a list of URLs and streams them back as one
//! ZIP archive while the fetches are still running. `POST /api/upload` puts a
//! multipart file into an S3-compatible bucket.

pub mod archive;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod server;
pub mod store;
pub mod utils;
