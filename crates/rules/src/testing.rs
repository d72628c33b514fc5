//! Test doubles for the external collaborators.
//!
//! [`MemoryUniqueness`] keeps taken values in memory; [`FailingUniqueness`]
//! always fails, for exercising [`DependencyPolicy`](crate::DependencyPolicy).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::external::{UniqueTarget, UniquenessChecker};
use crate::foundation::DependencyError;

/// An in-memory uniqueness store keyed by `(table, column)`.
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use nebula_rules::{Validator, testing::MemoryUniqueness};
///
/// let store = MemoryUniqueness::new().with_value("users", "email", "taken@example.com");
/// let validator = Validator::builder().uniqueness(Arc::new(store)).build()?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryUniqueness {
    taken: RwLock<HashMap<(String, String), HashSet<String>>>,
}

impl MemoryUniqueness {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `value` as taken in `table.column`. The column is snake-cased
    /// the same way `unique:` targets are.
    pub fn insert(&self, table: &str, column: &str, value: impl Into<String>) {
        let target = UniqueTarget::new(table, column);
        self.taken
            .write()
            .entry((target.table().to_owned(), target.column().to_owned()))
            .or_default()
            .insert(value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_value(self, table: &str, column: &str, value: impl Into<String>) -> Self {
        self.insert(table, column, value);
        self
    }
}

#[async_trait]
impl UniquenessChecker for MemoryUniqueness {
    async fn exists(&self, target: &UniqueTarget, value: &str) -> Result<bool, DependencyError> {
        let taken = self.taken.read();
        Ok(taken
            .get(&(target.table().to_owned(), target.column().to_owned()))
            .is_some_and(|values| values.contains(value)))
    }
}

/// A uniqueness store that is always unreachable.
#[derive(Debug, Clone, Default)]
pub struct FailingUniqueness;

#[async_trait]
impl UniquenessChecker for FailingUniqueness {
    async fn exists(&self, target: &UniqueTarget, _value: &str) -> Result<bool, DependencyError> {
        Err(DependencyError::new(format!("store unavailable for {target}")))
    }
}
