//! Collaborators the engine consumes but does not own
//!
//! The uniqueness store and the content sniffer are narrow traits so callers
//! can plug in a database or a richer MIME detector. A signature-table
//! sniffer ships as the default.

use async_trait::async_trait;

use crate::foundation::DependencyError;
use crate::parser::snake_case;

// ============================================================================
// UNIQUENESS
// ============================================================================

/// The `table.column` queried by a `unique` rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueTarget {
    table: String,
    column: String,
}

impl UniqueTarget {
    /// Creates a target; the column is converted to snake_case.
    pub fn new(table: impl Into<String>, column: &str) -> Self {
        Self {
            table: table.into(),
            column: snake_case(column),
        }
    }

    /// The table name, as written in the rule.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The snake_cased column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl std::fmt::Display for UniqueTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Existence checks backing the `unique` rule.
///
/// `Ok(true)` means the value is already taken, which is a violation.
/// `Ok(false)` is the definitive "not found". Any `Err` is a dependency
/// failure handled according to the configured
/// [`DependencyPolicy`](crate::config::DependencyPolicy).
#[async_trait]
pub trait UniquenessChecker: Send + Sync {
    /// Whether `value` already exists in `target`.
    async fn exists(&self, target: &UniqueTarget, value: &str) -> Result<bool, DependencyError>;
}

// ============================================================================
// CONTENT SNIFFING
// ============================================================================

/// Detects a file's type from its content.
pub trait ContentSniffer: Send + Sync {
    /// Returns the canonical extension with a leading dot (`.png`), or an
    /// empty string when the type is unknown.
    fn detect_extension(&self, content: &[u8]) -> String;
}

/// Magic-number signatures, checked in order.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\xFF\xD8\xFF", ".jpg"),
    (b"\x89PNG\r\n\x1A\n", ".png"),
    (b"GIF87a", ".gif"),
    (b"GIF89a", ".gif"),
    (b"%PDF-", ".pdf"),
    (b"PK\x03\x04", ".zip"),
    (b"BM", ".bmp"),
    (b"\x1F\x8B", ".gz"),
];

/// A [`ContentSniffer`] over a fixed signature table.
///
/// Recognizes JPEG, PNG, GIF, WebP, PDF, ZIP, BMP, gzip and MP4. Content
/// without a signature that is valid UTF-8 with no NUL byte is `.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureSniffer;

impl ContentSniffer for SignatureSniffer {
    fn detect_extension(&self, content: &[u8]) -> String {
        if content.len() >= 12 && &content[..4] == b"RIFF" && &content[8..12] == b"WEBP" {
            return ".webp".into();
        }
        if content.len() >= 8 && &content[4..8] == b"ftyp" {
            return ".mp4".into();
        }
        if let Some((_, ext)) = SIGNATURES.iter().find(|(sig, _)| content.starts_with(sig)) {
            return (*ext).into();
        }
        if !content.is_empty() && !content.contains(&0) && std::str::from_utf8(content).is_ok() {
            return ".txt".into();
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures() {
        let sniffer = SignatureSniffer;
        assert_eq!(sniffer.detect_extension(b"\xFF\xD8\xFF\xE0\0\x10JFIF"), ".jpg");
        assert_eq!(sniffer.detect_extension(b"\x89PNG\r\n\x1A\n\0\0"), ".png");
        assert_eq!(sniffer.detect_extension(b"RIFF\0\0\0\0WEBPVP8 "), ".webp");
        assert_eq!(sniffer.detect_extension(b"%PDF-1.7\n"), ".pdf");
        assert_eq!(sniffer.detect_extension(b"\0\0\0\x18ftypmp42"), ".mp4");
        assert_eq!(sniffer.detect_extension(b"hello, world"), ".txt");
        assert_eq!(sniffer.detect_extension(b"\0\x01\x02\x03"), "");
        assert_eq!(sniffer.detect_extension(b""), "");
    }

    #[test]
    fn test_target_display() {
        let target = UniqueTarget::new("users", "emailAddress");
        assert_eq!(target.to_string(), "users.email_address");
    }
}
