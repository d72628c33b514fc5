//! Core data model: values, records, uploads, reports and errors.

pub mod error;
pub mod record;
pub mod report;
pub mod upload;
pub mod value;

pub use error::{DependencyError, RulesError};
pub use record::{Field, Record, RecordView};
pub use report::{Detail, Report, Violation};
pub use upload::FileUpload;
pub use value::{Kind, ToValue, Value};
