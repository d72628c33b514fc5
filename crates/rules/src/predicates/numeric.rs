//! Numeric classification by decimal-string pattern
//!
//! Numbers are rendered to text and matched against a pattern, so the result
//! depends on the rendering. `uint` requires at least two digits: single-digit
//! unsigned values are classified as not-unsigned.

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::Value;

static INT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-?(?:0|[1-9][0-9]*))$").expect("valid int regex"));

static UINT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]+$").expect("valid uint regex"));

static FLOAT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$").expect("valid float regex")
});

/// A numeric classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// `int`
    Int,
    /// `uint`
    Uint,
    /// `float`
    Float,
}

impl Class {
    /// Looks a classification up by rule name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "uint" => Some(Self::Uint),
            "float" => Some(Self::Float),
            _ => None,
        }
    }

    /// Message key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
        }
    }

    /// Whether `value` falls outside this class.
    ///
    /// `int` and `uint` render integers in plain decimal; `float` renders
    /// floats with two decimals. Anything else renders as an empty string and
    /// therefore violates.
    #[must_use]
    pub fn violates(self, value: &Value) -> bool {
        let rendered = match (self, value.resolve()) {
            (Self::Int | Self::Uint, Value::Int(n)) => n.to_string(),
            (Self::Int | Self::Uint, Value::Uint(n)) => n.to_string(),
            (Self::Float, Value::Float(n)) => format!("{n:.2}"),
            (Self::Float, Value::Int(n)) => format!("{:.2}", *n as f64),
            (Self::Float, Value::Uint(n)) => format!("{:.2}", *n as f64),
            _ => String::new(),
        };
        let regex: &Regex = match self {
            Self::Int => &INT_REGEX,
            Self::Uint => &UINT_REGEX,
            Self::Float => &FLOAT_REGEX,
        };
        !regex.is_match(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int() {
        assert!(!Class::Int.violates(&Value::Int(-42)));
        assert!(!Class::Int.violates(&Value::Uint(7)));
        assert!(Class::Int.violates(&Value::Float(1.5)));
    }

    #[test]
    fn test_uint_requires_two_digits() {
        assert!(!Class::Uint.violates(&Value::Uint(10)));
        assert!(!Class::Uint.violates(&Value::Uint(34_359_738_368)));
        assert!(Class::Uint.violates(&Value::Uint(7)));
        assert!(Class::Uint.violates(&Value::Int(-12)));
    }

    #[test]
    fn test_float() {
        assert!(!Class::Float.violates(&Value::Float(12.345)));
        assert!(!Class::Float.violates(&Value::Float(-0.5)));
        assert!(Class::Float.violates(&Value::Float(f64::NAN)));
        assert!(Class::Float.violates(&Value::Float(f64::INFINITY)));
    }
}
