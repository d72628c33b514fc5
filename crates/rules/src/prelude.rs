//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use nebula_rules::prelude::*;
//! ```

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::config::{DependencyPolicy, ValidatorConfig};
pub use crate::engine::{Validator, ValidatorBuilder};

// ============================================================================
// DATA MODEL
// ============================================================================

pub use crate::foundation::{
    Detail, Field, FileUpload, Record, RecordView, Report, RulesError, ToValue, Value, Violation,
};

// ============================================================================
// COLLABORATORS
// ============================================================================

pub use crate::external::{ContentSniffer, UniqueTarget, UniquenessChecker};
pub use crate::foundation::DependencyError;
pub use crate::message::LocaleStore;

pub use crate::record;
