//! The validation report
//!
//! A [`Report`] maps wire-labels to the rendered outcome of the fields that
//! failed. It is a lookup structure: field order is irrelevant and an empty
//! report means the record is fully valid.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

// ============================================================================
// DETAIL
// ============================================================================

/// The payload shown for one failed field.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// A rendered message for a scalar rule.
    Message(String),
    /// The report of a nested record.
    Nested(Report),
    /// Per-element outcomes of a sequence, in element order.
    List(Vec<Detail>),
}

impl Detail {
    /// Returns the message text for [`Detail::Message`].
    #[must_use]
    pub fn as_message(&self) -> Option<&str> {
        match self {
            Detail::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the nested report for [`Detail::Nested`].
    #[must_use]
    pub fn as_nested(&self) -> Option<&Report> {
        match self {
            Detail::Nested(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the element outcomes for [`Detail::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Detail]> {
        match self {
            Detail::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<String> for Detail {
    fn from(message: String) -> Self {
        Detail::Message(message)
    }
}

impl Serialize for Detail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Detail::Message(m) => serializer.serialize_str(m),
            Detail::Nested(r) => r.serialize(serializer),
            Detail::List(items) => items.serialize(serializer),
        }
    }
}

// ============================================================================
// VIOLATION
// ============================================================================

/// The outcome recorded for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Message key of the violated rule (`required`, `min.string`, `fault`, ...).
    pub key: String,
    /// What the caller sees.
    pub detail: Detail,
}

impl Violation {
    /// Creates a violation carrying a rendered message.
    pub fn message(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            detail: Detail::Message(message.into()),
        }
    }

    /// Creates a violation carrying a nested report.
    pub fn nested(key: impl Into<String>, report: Report) -> Self {
        Self {
            key: key.into(),
            detail: Detail::Nested(report),
        }
    }

    /// Creates a violation carrying per-element outcomes.
    pub fn list(key: impl Into<String>, items: Vec<Detail>) -> Self {
        Self {
            key: key.into(),
            detail: Detail::List(items),
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Wire-label to outcome mapping for one record.
///
/// Serializes to the flat JSON shape callers put on the wire:
///
/// ```json
/// { "email": "email must be a valid email address", "address": { "zip": "..." } }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    entries: BTreeMap<String, Violation>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for `label`, replacing any previous one.
    pub fn insert(&mut self, label: impl Into<String>, violation: Violation) {
        self.entries.insert(label.into(), violation);
    }

    /// The outcome for `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Violation> {
        self.entries.get(label)
    }

    /// The rendered message for `label`, if its detail is a plain message.
    #[must_use]
    pub fn message(&self, label: &str) -> Option<&str> {
        self.get(label).and_then(|v| v.detail.as_message())
    }

    /// Whether `label` has an outcome.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// `true` when the record passed every rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates `(label, violation)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Violation)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serializes the report to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, violation) in &self.entries {
            map.serialize_entry(label, &violation.detail)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = (&'a String, &'a Violation);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
