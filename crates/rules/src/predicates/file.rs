//! File rules: readability, content-type allow-lists and size limits

use std::sync::LazyLock;

use regex::Regex;

use crate::external::ContentSniffer;
use crate::foundation::FileUpload;

static FILE_SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9]|[1-9][0-9]+)(kb|KB|mb|MB|gb|GB|tb|TB)$").expect("valid file size regex")
});

const KILOBYTE: u64 = 1024;
const MEGABYTE: u64 = KILOBYTE * 1024;
const GIGABYTE: u64 = MEGABYTE * 1024;

/// Extensions accepted by the bare `image` rule.
pub const IMAGE_EXTENSIONS: &str = "jpg,jpeg,png,webp";

/// Whether the upload cannot be read.
pub async fn violates_readable(file: &FileUpload) -> bool {
    file.read().await.is_err()
}

/// Whether the upload's detected extension is outside `extensions`, a
/// comma-separated list such as `jpg,png`. Unreadable uploads violate.
pub async fn violates_mimes(
    file: &FileUpload,
    extensions: &str,
    sniffer: &dyn ContentSniffer,
) -> bool {
    let Ok(content) = file.read().await else {
        return true;
    };
    let detected = sniffer.detect_extension(&content);
    !extensions
        .split(',')
        .any(|ext| detected.eq_ignore_ascii_case(&format!(".{ext}")))
}

/// Unit suffix of a size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    /// `kb` / `KB`
    Kilobytes,
    /// `mb` / `MB`
    Megabytes,
    /// `gb` / `GB`
    Gigabytes,
    /// `tb` / `TB`: accepted, but carries no multiplier.
    Terabytes,
}

impl SizeUnit {
    fn parse(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "kb" => Some(Self::Kilobytes),
            "mb" => Some(Self::Megabytes),
            "gb" => Some(Self::Gigabytes),
            "tb" => Some(Self::Terabytes),
            _ => None,
        }
    }

    const fn multiplier(self) -> u64 {
        match self {
            Self::Kilobytes => KILOBYTE,
            Self::Megabytes => MEGABYTE,
            Self::Gigabytes => GIGABYTE,
            Self::Terabytes => 0,
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Kilobytes => "size.file_kb",
            Self::Megabytes => "size.file_mb",
            Self::Gigabytes => "size.file_gb",
            Self::Terabytes => "size.file_tb",
        }
    }
}

/// A parsed `size:N(kb|mb|gb|tb)` limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLimit {
    amount: String,
    unit: SizeUnit,
    bytes: u64,
}

impl SizeLimit {
    /// Parses a size spec such as `2mb`. Returns `None` when the spec does not
    /// follow the size grammar.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let caps = FILE_SIZE_REGEX.captures(spec)?;
        let amount = caps.get(1)?.as_str();
        let unit = SizeUnit::parse(caps.get(2)?.as_str())?;
        let bytes = amount.parse::<u64>().ok()?.saturating_mul(unit.multiplier());
        Some(Self {
            amount: amount.to_owned(),
            unit,
            bytes,
        })
    }

    /// The limit in bytes; zero for `tb`.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// The amount as written, used as the message parameter.
    #[must_use]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Message key, e.g. `size.file_mb`.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.unit.key()
    }

    /// Whether a file of `size` bytes exceeds the limit. A zero limit never
    /// rejects.
    #[must_use]
    pub fn violates(&self, size: u64) -> bool {
        self.bytes > 0 && size > self.bytes
    }
}
