//! Character-class checks on text
//!
//! Each shape is an exact, whole-value regular-language match.

use std::sync::LazyLock;

use regex::Regex;

static STRING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z+ .\-]+$").expect("valid string regex"));

static ASCII_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\x00-\x7F]+$").expect("valid ascii regex"));

static ALPHA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").expect("valid alpha regex"));

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid numeric regex"));

static ALPHA_NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("valid alpha_numeric regex"));

/// A text shape rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `string`: ASCII letters, digits, space, `+`, `-` and `.`.
    String,
    /// `ascii`: 7-bit characters only.
    Ascii,
    /// `alpha`: ASCII letters only.
    Alpha,
    /// `numeric`: ASCII digits only.
    Numeric,
    /// `alpha_numeric`: ASCII letters and digits only.
    AlphaNumeric,
}

impl Shape {
    /// Looks a shape up by rule name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "ascii" => Some(Self::Ascii),
            "alpha" => Some(Self::Alpha),
            "numeric" => Some(Self::Numeric),
            "alpha_numeric" => Some(Self::AlphaNumeric),
            _ => None,
        }
    }

    /// Message key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Ascii => "ascii",
            Self::Alpha => "alpha",
            Self::Numeric => "numeric",
            Self::AlphaNumeric => "alpha_numeric",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::String => &STRING_REGEX,
            Self::Ascii => &ASCII_REGEX,
            Self::Alpha => &ALPHA_REGEX,
            Self::Numeric => &NUMERIC_REGEX,
            Self::AlphaNumeric => &ALPHA_NUMERIC_REGEX,
        }
    }

    /// Whether `text` falls outside this shape.
    #[must_use]
    pub fn violates(self, text: &str) -> bool {
        !self.regex().is_match(text)
    }
}
