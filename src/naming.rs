//! Filename handling for uploaded and processed images.
//!
//! Every file the shell writes gets a name derived from the user-supplied one:
//!
//! - `Holiday Photo.JPG` → sanitized `Holiday_Photo.JPG`
//! - upload copy: `1718000000_Holiday_Photo.JPG`
//! - processed output: `processed_1718000000_Holiday_Photo.JPG`
//!
//! The timestamp prefix keeps repeated runs from overwriting each other.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reduce a user-supplied filename to a safe, flat, ASCII name.
///
/// - Only the final path component survives (`../../etc/passwd` → `passwd`).
/// - Whitespace becomes `_`.
/// - Only ASCII letters, digits, `.`, `-` and `_` are kept.
/// - Leading dots and underscores are stripped, so the result is never hidden.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = last
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercased extension of a filename, if any.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether a filename's extension is in the allowed list (case-insensitive).
pub fn is_allowed(name: &str, allowed: &[String]) -> bool {
    extension_of(name).is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
}

/// Name under which an input is staged in the upload folder.
pub fn upload_name(timestamp: u64, sanitized: &str) -> String {
    format!("{timestamp}_{sanitized}")
}

/// Name under which a processed result is written.
pub fn processed_name(timestamp: u64, sanitized: &str) -> String {
    format!("processed_{timestamp}_{sanitized}")
}

/// Seconds since the Unix epoch, or 0 if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        ["png", "jpg", "jpeg", "webp"].map(String::from).to_vec()
    }

    #[test]
    fn sanitize_plain_name_unchanged() {
        assert_eq!(sanitize_filename("photo.png").as_deref(), Some("photo.png"));
    }

    #[test]
    fn sanitize_spaces_become_underscores() {
        assert_eq!(
            sanitize_filename("My Holiday Photo.JPG").as_deref(),
            Some("My_Holiday_Photo.JPG")
        );
    }

    #[test]
    fn sanitize_drops_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename(r"C:\Users\me\cat.webp").as_deref(), Some("cat.webp"));
    }

    #[test]
    fn sanitize_strips_non_ascii_and_symbols() {
        assert_eq!(sanitize_filename("café$%.png").as_deref(), Some("caf.png"));
    }

    #[test]
    fn sanitize_strips_leading_dots() {
        assert_eq!(sanitize_filename(".hidden.png").as_deref(), Some("hidden.png"));
        assert_eq!(sanitize_filename("__init.png").as_deref(), Some("init.png"));
    }

    #[test]
    fn sanitize_nothing_left() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("日本"), None);
    }

    #[test]
    fn extension_lowercased() {
        assert_eq!(extension_of("A.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(extension_of("noext"), None);
    }

    #[test]
    fn allowed_extensions() {
        assert!(is_allowed("a.png", &allowed()));
        assert!(is_allowed("a.JPG", &allowed()));
        assert!(!is_allowed("a.gif", &allowed()));
        assert!(!is_allowed("png", &allowed()));
    }

    #[test]
    fn names_carry_timestamp() {
        assert_eq!(upload_name(1718000000, "a.png"), "1718000000_a.png");
        assert_eq!(processed_name(1718000000, "a.png"), "processed_1718000000_a.png");
    }
}
