//! # nebula-rules
//!
//! Rule-chain validation for typed records, with localized reports.
//!
//! Each field of a record carries a wire-label and a `|`-separated rule
//! chain. Every annotated field is validated concurrently; within a field,
//! rules run left to right and stop at the first violation. The outcome is a
//! [`Report`] keyed by wire-label, holding one rendered message, a nested
//! report, or a list of per-element details for each failing field.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nebula_rules::prelude::*;
//!
//! record! {
//!     #[derive(Debug, Clone)]
//!     pub struct SignUp {
//!         pub name: String => ("name", "required|string|from:1,50"),
//!         pub email: String => ("email", "required|email"),
//!         pub password: String => ("password", "required|min:8"),
//!         pub confirm: String => ("confirmPassword", "same:password"),
//!     }
//! }
//!
//! let validator = Validator::default();
//! let report = validator.validate(&sign_up).await?;
//! println!("{}", report.to_json());
//! ```
//!
//! ## Rules
//!
//! - **Presence**: `required`
//! - **Shape**: `string`, `ascii`, `alpha`, `numeric`, `alpha_numeric`
//! - **Format**: `email`, `phone`, `phone_with_code`, `username`, `gh_card`,
//!   `gh_gps`, `rfc3339`, `datetime`, `dateonly`, `timeonly`
//! - **Numeric class**: `int`, `uint`, `float`
//! - **Comparison**: `min:`, `max:`, `equal:`, `size:`, `between:`, `from:`
//! - **Membership**: `enum:`, `same:`, `match:`
//! - **Uniqueness**: `unique:table.column`
//! - **Sequences**: `slice:min:N`, `slice:max:N`
//! - **Files**: `image`, `image:`, `file`, `file:`, `mimes:`, `size:N(kb|mb|gb|tb)`
//!
//! Any rule may carry a message override after `>`, e.g.
//! `required>Please enter your name`.

pub mod config;
pub mod dispatch;
mod engine;
mod evaluator;
pub mod external;
pub mod foundation;
mod macros;
pub mod message;
pub mod parser;
pub mod predicates;
pub mod prelude;
pub mod testing;

pub use config::{DependencyPolicy, ValidatorConfig};
pub use engine::{Validator, ValidatorBuilder};
pub use external::{ContentSniffer, SignatureSniffer, UniqueTarget, UniquenessChecker};
pub use foundation::{
    DependencyError, Detail, Field, FileUpload, Kind, Record, RecordView, Report, RulesError,
    ToValue, Value, Violation,
};
pub use message::{BuiltinLocales, LocaleStore, Messages, format_label};
pub use parser::{RuleSpec, parse_chain};
