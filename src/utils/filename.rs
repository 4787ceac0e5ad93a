//! File name sanitization for archive entries.

/// Longest entry name kept, in bytes.
const MAX_NAME_LEN: usize = 200;

/// Make a name safe to use as a flat archive entry.
///
/// Path separators, reserved characters and control characters become `_`,
/// names made only of dots are rejected, and long names are cut on a char
/// boundary. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.' || c == '_') {
        return None;
    }

    let mut end = trimmed.len().min(MAX_NAME_LEN);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    Some(trimmed[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(sanitize_filename(" photo 1.jpg ").as_deref(), Some("photo 1.jpg"));
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("../etc/passwd").as_deref(), Some(".._etc_passwd"));
        assert_eq!(sanitize_filename("a\\b:c").as_deref(), Some("a_b_c"));
    }

    #[test]
    fn test_sanitize_rejects_empty_and_dots() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("/"), None);
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let name = sanitize_filename(&long).unwrap();
        assert!(name.len() <= MAX_NAME_LEN);
        assert!(name.chars().all(|c| c == 'é'));
    }
}
