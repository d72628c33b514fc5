//! The validation engine
//!
//! [`Validator`] fans one task per eligible field out into a
//! [`JoinSet`], joins them all, and folds the outcomes into a [`Report`].
//! Nested records re-enter the same pipeline one level deeper. A per-call
//! [`Semaphore`] bounds how many fields evaluate at once across every nesting
//! level.
//!
//! Faults stay with the field that raised them: an internal error becomes a
//! `fault` entry, a panic becomes a `panic` entry, and sibling fields are
//! unaffected. Only [fatal](RulesError::is_fatal) errors abort the call.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::{self, AbortHandle, JoinSet};
use tracing::{debug, error, warn};

use crate::config::ValidatorConfig;
use crate::evaluator::evaluate_field;
use crate::external::{ContentSniffer, SignatureSniffer, UniquenessChecker};
use crate::foundation::{Field, Record, RecordView, Report, RulesError, Value, Violation};
use crate::message::{BuiltinLocales, LocaleStore, Messages};

// ============================================================================
// VALIDATOR
// ============================================================================

/// Validates records against the rule chains on their fields.
///
/// Cheap to clone; clones share configuration and collaborators.
///
/// # Examples
///
/// ```rust,ignore
/// use nebula_rules::{Validator, record};
///
/// record! {
///     pub struct SignUp {
///         pub email: String => ("email", "required|email"),
///         pub age: u32 => ("age", "from:18,120"),
///     }
/// }
///
/// let validator = Validator::builder().locale("fr").build()?;
/// let report = validator.validate(&sign_up).await?;
/// if !report.is_empty() {
///     return Err(report.to_json());
/// }
/// ```
#[derive(Clone)]
pub struct Validator {
    inner: Arc<Shared>,
}

/// Configuration and collaborators shared by every call.
pub(crate) struct Shared {
    config: ValidatorConfig,
    messages: Messages,
    uniqueness: Option<Arc<dyn UniquenessChecker>>,
    sniffer: Arc<dyn ContentSniffer>,
}

impl Validator {
    /// Creates a validator with built-in locales, the signature sniffer and
    /// no uniqueness checker.
    pub fn new(config: ValidatorConfig) -> Result<Self, RulesError> {
        Self::builder().config(config).build()
    }

    /// Starts a builder with default configuration.
    #[must_use]
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.inner.config
    }

    /// Validates a record.
    ///
    /// Returns an empty report when every eligible field passes. Must be
    /// called from within a Tokio runtime.
    pub async fn validate<R: Record + ?Sized>(&self, record: &R) -> Result<Report, RulesError> {
        self.run(Arc::new(RecordView::of(record))).await
    }

    /// Validates a dynamically built value.
    ///
    /// The value must be a record, or an optional that is set and refers to
    /// one; anything else is a [`RulesError::Structural`] error.
    pub async fn validate_value(&self, value: &Value) -> Result<Report, RulesError> {
        match value.resolve() {
            Value::Record(view) => self.run(Arc::clone(view)).await,
            Value::Optional(None) => Err(RulesError::Structural {
                found: "unset optional".into(),
            }),
            other => Err(RulesError::Structural {
                found: other.kind().to_string(),
            }),
        }
    }

    async fn run(&self, view: Arc<RecordView>) -> Result<Report, RulesError> {
        let call = Arc::new(Call {
            shared: Arc::clone(&self.inner),
            permits: Semaphore::new(self.inner.config.max_concurrency),
        });
        run_record(call, view, 0).await
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            inner: Arc::new(Shared {
                config: ValidatorConfig::default(),
                messages: Messages::new(Arc::new(BuiltinLocales), "en"),
                uniqueness: None,
                sniffer: Arc::new(SignatureSniffer),
            }),
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.inner.config)
            .field("uniqueness", &self.inner.uniqueness.is_some())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Validator`].
#[derive(Default)]
pub struct ValidatorBuilder {
    config: ValidatorConfig,
    locales: Option<Arc<dyn LocaleStore>>,
    uniqueness: Option<Arc<dyn UniquenessChecker>>,
    sniffer: Option<Arc<dyn ContentSniffer>>,
}

impl ValidatorBuilder {
    /// Replaces the whole configuration.
    #[must_use = "builder methods must be chained or built"]
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the message locale.
    #[must_use = "builder methods must be chained or built"]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = locale.into();
        self
    }

    /// Uses a custom template store instead of the built-in catalogs.
    #[must_use = "builder methods must be chained or built"]
    pub fn messages(mut self, store: Arc<dyn LocaleStore>) -> Self {
        self.locales = Some(store);
        self
    }

    /// Sets the checker backing `unique:table.column` rules.
    #[must_use = "builder methods must be chained or built"]
    pub fn uniqueness(mut self, checker: Arc<dyn UniquenessChecker>) -> Self {
        self.uniqueness = Some(checker);
        self
    }

    /// Replaces the content sniffer used by file-type rules.
    #[must_use = "builder methods must be chained or built"]
    pub fn sniffer(mut self, sniffer: Arc<dyn ContentSniffer>) -> Self {
        self.sniffer = Some(sniffer);
        self
    }

    /// Validates the configuration and builds the validator.
    pub fn build(self) -> Result<Validator, RulesError> {
        self.config.validate()?;
        let store = self
            .locales
            .unwrap_or_else(|| Arc::new(BuiltinLocales) as Arc<dyn LocaleStore>);
        let messages = Messages::new(store, self.config.locale.clone());
        Ok(Validator {
            inner: Arc::new(Shared {
                config: self.config,
                messages,
                uniqueness: self.uniqueness,
                sniffer: self
                    .sniffer
                    .unwrap_or_else(|| Arc::new(SignatureSniffer) as Arc<dyn ContentSniffer>),
            }),
        })
    }
}

// ============================================================================
// CALL
// ============================================================================

/// State of one `validate` call, shared by every nesting level.
pub(crate) struct Call {
    shared: Arc<Shared>,
    permits: Semaphore,
}

impl Call {
    pub(crate) fn config(&self) -> &ValidatorConfig {
        &self.shared.config
    }

    pub(crate) fn messages(&self) -> &Messages {
        &self.shared.messages
    }

    pub(crate) fn uniqueness(&self) -> Option<&dyn UniquenessChecker> {
        self.shared.uniqueness.as_deref()
    }

    pub(crate) fn sniffer(&self) -> &dyn ContentSniffer {
        self.shared.sniffer.as_ref()
    }

    pub(crate) fn permits(&self) -> &Semaphore {
        &self.permits
    }
}

type FieldOutcome = Result<Result<Option<Violation>, RulesError>, Box<dyn Any + Send>>;

/// Validates one record at `depth`: one task per eligible field, then join.
pub(crate) fn run_record(
    call: Arc<Call>,
    view: Arc<RecordView>,
    depth: usize,
) -> BoxFuture<'static, Result<Report, RulesError>> {
    async move {
        let mut tasks = FieldTasks::default();

        for index in view.eligible() {
            let label = view
                .get(index)
                .and_then(Field::label)
                .unwrap_or_default()
                .to_owned();
            tasks.spawn(
                label,
                FieldTask {
                    call: Arc::clone(&call),
                    view: Arc::clone(&view),
                    index,
                    depth,
                }
                .run(),
            );
        }

        debug!(fields = tasks.len(), depth, "validating record");
        let report = tasks.collect_outcomes().await?;
        debug!(violations = report.len(), depth, "record validated");
        Ok(report)
    }
    .boxed()
}

/// Bundled parameters for a single field evaluation task.
struct FieldTask {
    call: Arc<Call>,
    view: Arc<RecordView>,
    index: usize,
    depth: usize,
}

impl FieldTask {
    /// Evaluate the field, catching panics at the task boundary.
    async fn run(self) -> FieldOutcome {
        AssertUnwindSafe(evaluate_field(
            &self.call,
            &self.view,
            self.index,
            self.depth,
        ))
        .catch_unwind()
        .await
    }
}

/// The field tasks of one record, with the wire-label of every task so an
/// outcome can be attributed even when the task never completes.
#[derive(Default)]
struct FieldTasks {
    set: JoinSet<FieldOutcome>,
    labels: HashMap<task::Id, String>,
}

impl FieldTasks {
    fn spawn<F>(&mut self, label: String, task: F) -> AbortHandle
    where
        F: Future<Output = FieldOutcome> + Send + 'static,
    {
        let handle = self.set.spawn(task);
        self.labels.insert(handle.id(), label);
        handle
    }

    fn len(&self) -> usize {
        self.set.len()
    }

    /// Fold task outcomes into a report. A fatal error aborts the remaining tasks.
    async fn collect_outcomes(mut self) -> Result<Report, RulesError> {
        let mut report = Report::new();
        while let Some(joined) = self.set.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, Ok(outcome)),
                Err(join_err) => (join_err.id(), Err(join_err)),
            };
            let label = self.labels.remove(&id).unwrap_or_default();
            match outcome {
                Ok(Ok(Ok(Some(violation)))) => report.insert(label, violation),
                Ok(Ok(Ok(None))) => {}
                Ok(Ok(Err(err))) if err.is_fatal() => {
                    error!(field = %label, error = %err, "validation aborted");
                    self.set.abort_all();
                    return Err(err);
                }
                Ok(Ok(Err(err))) => {
                    warn!(field = %label, error = %err, "field fault converted to outcome");
                    report.insert(
                        label,
                        Violation::message("fault", format!("validation fault: {err}")),
                    );
                }
                Ok(Err(panic)) => {
                    let message = panic_message(panic.as_ref());
                    error!(field = %label, panic = %message, "field task panicked");
                    report.insert(
                        label,
                        Violation::message("panic", format!("validation panic: {message}")),
                    );
                }
                Err(join_err) => {
                    error!(field = %label, ?join_err, "field task did not complete");
                    report.insert(
                        label,
                        Violation::message("fault", format!("validation fault: {join_err}")),
                    );
                }
            }
        }
        Ok(report)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
