//! Archive entry names derived from URLs.

use std::collections::HashSet;

use url::Url;

use crate::utils::sanitize_filename;

/// Used when a URL yields no usable segment or host.
pub const FALLBACK_NAME: &str = "download";

/// Entry name for a URL: its last non-empty path segment, percent-decoded.
///
/// Query strings and fragments are ignored. A URL without a path segment
/// falls back to its host; anything unusable becomes [`FALLBACK_NAME`].
pub fn derive_entry_name(url: &str) -> String {
    let candidate = match Url::parse(url) {
        Ok(parsed) => last_segment(parsed.path())
            .or_else(|| parsed.host_str().map(|host| host.to_string())),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            last_segment(path)
        }
    };

    candidate
        .and_then(|name| sanitize_filename(&name))
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

fn last_segment(path: &str) -> Option<String> {
    let segment = path.split('/').filter(|s| !s.is_empty()).next_back()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(decoded)
}

/// Hands out unique entry names within one archive.
///
/// A repeated name gets a counter before its extension: `a.png`,
/// `a (1).png`, `a (2).png`.
#[derive(Debug, Default)]
pub struct EntryNames {
    used: HashSet<String>,
}

impl EntryNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `name` out of circulation (report entries written later).
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn allocate(&mut self, name: &str) -> String {
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }

        let (stem, extension) = split_extension(name);
        let mut counter = 1;
        loop {
            let candidate = format!("{} ({}){}", stem, counter, extension);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Return a name whose entry never made it into the archive.
    pub fn release(&mut self, name: &str) {
        self.used.remove(name);
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}
