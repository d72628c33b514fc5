//! Runtime values of record fields
//!
//! A [`Value`] is the closed set of shapes a field can take at validation
//! time. The dispatcher routes on [`Kind`], never on concrete Rust types, so
//! every record type is lowered into this union once per validation call.

use std::fmt;
use std::sync::Arc;

use crate::foundation::record::{Record, RecordView};
use crate::foundation::upload::FileUpload;

// ============================================================================
// VALUE
// ============================================================================

/// The runtime value of a single field.
#[derive(Debug, Clone)]
pub enum Value {
    /// String-like data.
    Text(String),
    /// Signed integers of any width, widened to `i64`.
    Int(i64),
    /// Unsigned integers of any width, widened to `u64`.
    Uint(u64),
    /// Floating-point numbers, widened to `f64`.
    Float(f64),
    /// Booleans.
    Bool(bool),
    /// Sequences (lists and arrays).
    List(Vec<Value>),
    /// Optional references; `None` is the unset state.
    Optional(Option<Box<Value>>),
    /// An uploaded file.
    File(FileUpload),
    /// A nested record, already lowered into its field views.
    Record(Arc<RecordView>),
}

/// Value-kind tag used by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// [`Value::Text`]
    Text,
    /// [`Value::Int`]
    Signed,
    /// [`Value::Uint`]
    Unsigned,
    /// [`Value::Float`]
    Float,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::List`]
    Sequence,
    /// Files, nested records and unset optionals.
    Reference,
}

impl Kind {
    /// Returns a short lowercase name, used in logs and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Text => "text",
            Kind::Signed => "signed integer",
            Kind::Unsigned => "unsigned integer",
            Kind::Float => "float",
            Kind::Bool => "boolean",
            Kind::Sequence => "sequence",
            Kind::Reference => "reference",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Lowers a record into a nested record value.
    pub fn record<R: Record + ?Sized>(record: &R) -> Self {
        Value::Record(Arc::new(RecordView::of(record)))
    }

    /// Follows `Optional(Some(..))` layers down to the referenced value.
    ///
    /// An unset optional resolves to itself.
    #[must_use]
    pub fn resolve(&self) -> &Value {
        match self {
            Value::Optional(Some(inner)) => inner.resolve(),
            other => other,
        }
    }

    /// The kind of the resolved value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self.resolve() {
            Value::Text(_) => Kind::Text,
            Value::Int(_) => Kind::Signed,
            Value::Uint(_) => Kind::Unsigned,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::List(_) => Kind::Sequence,
            Value::Optional(_) | Value::File(_) | Value::Record(_) => Kind::Reference,
        }
    }

    /// Presence check backing the `required` rule.
    ///
    /// Text and sequences are empty at zero length, booleans when `false`,
    /// numbers at zero, optionals when unset. Files and nested records are
    /// references and only an unset optional counts as empty for them; a
    /// nested record held by value is empty when every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Int(n) => *n == 0,
            Value::Uint(n) => *n == 0,
            Value::Float(n) => *n == 0.0,
            Value::Bool(b) => !*b,
            Value::List(items) => items.is_empty(),
            Value::Optional(inner) => inner.is_none(),
            Value::File(_) => false,
            Value::Record(view) => view.fields().iter().all(|f| f.value().is_empty()),
        }
    }

    /// Renders a scalar as the string compared by `enum`, `same` and `match`.
    ///
    /// Non-scalar values render as an empty string.
    #[must_use]
    pub fn render(&self) -> String {
        match self.resolve() {
            Value::Text(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Uint(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Returns the text content if this resolves to text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self.resolve() {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested record view if this resolves to a record.
    #[must_use]
    pub fn as_record(&self) -> Option<&Arc<RecordView>> {
        match self.resolve() {
            Value::Record(view) => Some(view),
            _ => None,
        }
    }

    /// Returns the upload if this resolves to a file.
    #[must_use]
    pub fn as_file(&self) -> Option<&FileUpload> {
        match self.resolve() {
            Value::File(file) => Some(file),
            _ => None,
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Lowers a Rust value into a [`Value`].
///
/// Every field type used inside [`record!`](crate::record) must implement
/// this trait. Nested record types get an implementation from the macro.
pub trait ToValue {
    /// Produces an owned snapshot of `self`.
    fn to_value(&self) -> Value;
}

macro_rules! to_value_via {
    ($variant:ident as $wide:ty => $($ty:ty),+ $(,)?) => {
        $(
            impl ToValue for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    Value::$variant(<$wide>::from(*self))
                }
            }
        )+
    };
}

to_value_via!(Int as i64 => i8, i16, i32, i64);
to_value_via!(Uint as u64 => u8, u16, u32, u64);
to_value_via!(Float as f64 => f32, f64);

impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Value {
        Value::Uint(*self as u64)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl ToValue for FileUpload {
    fn to_value(&self) -> Value {
        Value::File(self.clone())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        Value::Optional(self.as_ref().map(|inner| Box::new(inner.to_value())))
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<FileUpload> for Value {
    fn from(value: FileUpload) -> Self {
        Value::File(value)
    }
}

// ============================================================================
// TESTS
// ============================================================================
