//! Error message helpers.

use std::error::Error;

/// Render an error and all of its sources as `outer: inner: root`.
///
/// HTTP and SDK errors keep the useful part (DNS failure, refused
/// connection, service message) in their source chain rather than in their
/// own `Display` output.
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
