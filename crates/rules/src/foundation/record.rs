//! Records and their field views
//!
//! A [`Record`] is any fixed-shape type that can describe its fields. The
//! engine never holds on to the caller's record: it takes a [`RecordView`]
//! snapshot at the start of every call and validates that.

use std::borrow::Cow;

use crate::foundation::value::Value;

// ============================================================================
// FIELD
// ============================================================================

/// One named member of a record.
///
/// Only fields carrying both a wire-label and a rule chain are validated.
/// A field with just a wire-label is still visible to cross-field rules.
#[derive(Debug, Clone)]
pub struct Field {
    name: Cow<'static, str>,
    label: Option<Cow<'static, str>>,
    rules: Option<Cow<'static, str>>,
    value: Value,
}

impl Field {
    /// Creates an unannotated field.
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            label: None,
            rules: None,
            value: value.into(),
        }
    }

    /// Sets the wire-label (the key used in payloads and reports).
    #[must_use = "builder methods must be chained or built"]
    pub fn wire(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the rule chain.
    #[must_use = "builder methods must be chained or built"]
    pub fn rules(mut self, chain: impl Into<Cow<'static, str>>) -> Self {
        self.rules = Some(chain.into());
        self
    }

    /// The Rust-side member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wire-label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The raw rule chain, if any.
    #[must_use]
    pub fn chain(&self) -> Option<&str> {
        self.rules.as_deref()
    }

    /// The runtime value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether this field takes part in validation.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.label.is_some() && self.rules.is_some()
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// A fixed-shape record whose fields carry rule annotations.
///
/// Usually implemented through [`record!`](crate::record); manual
/// implementations just list their fields:
///
/// ```rust,ignore
/// use nebula_rules::{Field, Record, ToValue};
///
/// impl Record for Login {
///     fn fields(&self) -> Vec<Field> {
///         vec![
///             Field::new("email", self.email.to_value()).wire("email").rules("required|email"),
///             Field::new("remember", self.remember.to_value()).wire("remember"),
///         ]
///     }
/// }
/// ```
pub trait Record: Send + Sync {
    /// Lists every field with its current value, in declaration order.
    fn fields(&self) -> Vec<Field>;
}

// ============================================================================
// RECORD VIEW
// ============================================================================

/// An owned snapshot of a record's fields, shared read-only between the
/// per-field tasks of one validation call.
#[derive(Debug, Clone, Default)]
pub struct RecordView {
    fields: Vec<Field>,
}

impl RecordView {
    /// Snapshots a record.
    pub fn of<R: Record + ?Sized>(record: &R) -> Self {
        Self {
            fields: record.fields(),
        }
    }

    /// Builds a view from explicit fields.
    #[must_use]
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// All fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Indices of the fields that take part in validation.
    pub fn eligible(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.is_eligible())
            .map(|(index, _)| index)
    }

    /// Finds a field by wire-label.
    #[must_use]
    pub fn by_label(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label() == Some(label))
    }

    /// Returns the field at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Number of fields, eligible or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Record for RecordView {
    fn fields(&self) -> Vec<Field> {
        self.fields.clone()
    }
}
