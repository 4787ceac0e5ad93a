//! Shared utility functions.
//!
//! - `errors`: flattening error source chains into one message
//! - `filename`: archive-safe file names
//! - `format`: human-readable sizes

mod errors;
mod filename;
mod format;

pub use errors::error_chain;
pub use filename::sanitize_filename;
pub use format::format_size;
