//! Validator configuration

use serde::{Deserialize, Serialize};

use crate::foundation::RulesError;

/// What happens when the uniqueness store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyPolicy {
    /// Abort the whole call with [`RulesError::Dependency`].
    #[default]
    Abort,
    /// Report the field as a `unique` violation and carry on.
    Violation,
}

/// Configuration for a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Locale used to render messages.
    pub locale: String,
    /// Fields evaluated at the same time within one call, across all nesting
    /// levels.
    pub max_concurrency: usize,
    /// Deepest nested record that is still validated.
    pub max_depth: usize,
    /// Handling of uniqueness store failures.
    pub on_dependency_error: DependencyPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_owned(),
            max_concurrency: 64,
            max_depth: 16,
            on_dependency_error: DependencyPolicy::Abort,
        }
    }
}

impl ValidatorConfig {
    /// Defaults overridden by `NEBULA_RULES_LOCALE`,
    /// `NEBULA_RULES_MAX_CONCURRENCY`, `NEBULA_RULES_MAX_DEPTH` and
    /// `NEBULA_RULES_ON_DEPENDENCY_ERROR` (`abort` or `violation`).
    ///
    /// Unparsable values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(locale) = std::env::var("NEBULA_RULES_LOCALE") {
            config.locale = locale;
        }
        if let Some(n) = env_usize("NEBULA_RULES_MAX_CONCURRENCY") {
            config.max_concurrency = n;
        }
        if let Some(n) = env_usize("NEBULA_RULES_MAX_DEPTH") {
            config.max_depth = n;
        }
        if let Ok(policy) = std::env::var("NEBULA_RULES_ON_DEPENDENCY_ERROR") {
            config.on_dependency_error = match policy.to_lowercase().as_str() {
                "violation" => DependencyPolicy::Violation,
                "abort" => DependencyPolicy::Abort,
                other => {
                    tracing::warn!(value = other, "unknown NEBULA_RULES_ON_DEPENDENCY_ERROR, keeping abort");
                    DependencyPolicy::Abort
                }
            };
        }

        config
    }

    /// Sets the locale.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets the per-call concurrency bound.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the nesting limit.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the dependency failure policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_dependency_policy(mut self, policy: DependencyPolicy) -> Self {
        self.on_dependency_error = policy;
        self
    }

    /// Validate configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.locale.trim().is_empty() {
            return Err(RulesError::Config("locale must not be empty".into()));
        }
        if self.max_concurrency == 0 {
            return Err(RulesError::Config(
                "max_concurrency must be greater than 0".into(),
            ));
        }
        if self.max_concurrency > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(RulesError::Config(format!(
                "max_concurrency ({}) exceeds the semaphore limit",
                self.max_concurrency
            )));
        }
        if self.max_depth == 0 {
            return Err(RulesError::Config("max_depth must be greater than 0".into()));
        }
        Ok(())
    }
}

fn env_usize(var: &str) -> Option<usize> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(err) => {
            tracing::warn!(var, value = %raw, error = %err, "ignoring unparsable setting");
            None
        }
    }
}
