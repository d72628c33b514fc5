//! Macros for declaring validated records.
//!
//! # Available Macros
//!
//! - [`record!`]: declare a struct whose fields carry rule annotations and
//!   implement [`Record`](crate::Record) and [`ToValue`](crate::ToValue) for it

// ============================================================================
// RECORD MACRO
// ============================================================================

/// Declares a record type: struct definition, [`Record`](crate::Record)
/// implementation and [`ToValue`](crate::ToValue) implementation.
///
/// Each field may be followed by `=> ("wire-label", "rule|chain")`. A field
/// with only `=> ("wire-label")` is visible to `same:` and `match:` but is
/// not validated; a field without annotations is skipped entirely.
///
/// Every field type must implement [`ToValue`](crate::ToValue). Nested
/// record types declared with this macro do.
///
/// ```rust,ignore
/// use nebula_rules::record;
///
/// record! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Address {
///         pub city: String => ("city", "required|alpha"),
///     }
/// }
///
/// record! {
///     #[derive(Debug, Clone)]
///     pub struct SignUp {
///         pub email: String => ("email", "required|email|unique:users.emailAddress"),
///         pub password: String => ("password", "required|min:8"),
///         pub confirm: String => ("confirm", "same:password"),
///         pub address: Option<Address> => ("address", "_"),
///         pub tags: Vec<String> => ("tags"),
///         pub session: u64,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $(=> ($label:literal $(, $rules:literal)?))?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Record for $name {
            fn fields(&self) -> ::std::vec::Vec<$crate::Field> {
                ::std::vec![
                    $(
                        $crate::Field::new(
                            stringify!($field),
                            $crate::ToValue::to_value(&self.$field),
                        )
                        $( .wire($label) $( .rules($rules) )? )?
                    ),*
                ]
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::record(self)
            }
        }
    };
}
