//! Error types.

use std::error::Error as StdError;
use std::fmt;

use crate::config::DependencyPolicy;

/// Errors raised while validating a record.
///
/// Only [`is_fatal`](RulesError::is_fatal) errors abort a call. Everything
/// else is caught at the field boundary and shown as that field's outcome.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// The argument was not a record.
    #[error("expected a record, found {found}")]
    Structural {
        /// Kind of the value that was passed instead.
        found: String,
    },

    /// A rule carried parameters it cannot use.
    #[error("malformed rule `{rule}`: {reason}")]
    MalformedRule {
        /// The rule name.
        rule: String,
        /// What is wrong with its parameters.
        reason: String,
    },

    /// A cross-field rule named a label the record does not have.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// Nested records went deeper than the configured limit.
    #[error("nesting deeper than {limit} levels")]
    DepthExceeded {
        /// The configured maximum depth.
        limit: usize,
    },

    /// A `unique` rule ran without a uniqueness checker.
    #[error("no uniqueness checker configured")]
    MissingCollaborator,

    /// The per-call worker pool was closed.
    #[error("worker pool closed")]
    WorkerPool,

    /// The uniqueness store failed.
    #[error("uniqueness check on `{target}` failed: {source}")]
    Dependency {
        /// `table.column` that was queried.
        target: String,
        /// The store's error.
        #[source]
        source: DependencyError,
        /// Policy in force when the error happened.
        policy: DependencyPolicy,
    },

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RulesError {
    /// Shorthand for [`RulesError::MalformedRule`].
    pub fn malformed(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the whole call instead of a single field.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Structural { .. } => true,
            Self::Dependency { policy, .. } => *policy == DependencyPolicy::Abort,
            _ => false,
        }
    }
}

/// Error returned by a [`UniquenessChecker`](crate::external::UniquenessChecker).
#[derive(Debug)]
pub struct DependencyError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl DependencyError {
    /// Creates an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for DependencyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}
