//! Type-directed dispatch
//!
//! Routes one rule to the predicate family that applies to the field's value
//! kind. The routing table is indexed by [`Kind`]: a rule name that is not
//! listed for a kind passes without evaluating anything, so foreign or
//! misplaced rule names never block the rest of a chain.
//!
//! Rule names without arguments (`email`, `int`) and rule names with
//! arguments (`min:3`, `enum:a,b`) are distinct: `min` without `:` is unknown
//! and `email:x` is unknown.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{error, warn};

use crate::config::DependencyPolicy;
use crate::engine::run_record;
use crate::evaluator::{FieldContext, Slot};
use crate::foundation::{Detail, FileUpload, Kind, RecordView, Report, RulesError, Value};
use crate::message::format_label;
use crate::parser::{Params, RuleSpec};
use crate::predicates::file::{self, IMAGE_EXTENSIONS};
use crate::predicates::membership::{violates_enum, violates_same};
use crate::predicates::{Class, Comparison, Format, Measure, Shape, SizeLimit};

// ============================================================================
// ROUTING TABLE
// ============================================================================

/// Rule names that apply to a value kind.
#[derive(Debug, Clone, Copy)]
pub enum Applicable {
    /// Every rule name is routed; the handler decides.
    Any,
    /// Only the listed rule names are routed.
    Only(&'static [&'static str]),
    /// No rule is routed.
    None,
}

const TEXT_RULES: &[&str] = &[
    "string",
    "ascii",
    "alpha",
    "numeric",
    "alpha_numeric",
    "email",
    "rfc3339",
    "datetime",
    "dateonly",
    "timeonly",
    "phone",
    "phone_with_code",
    "username",
    "gh_card",
    "gh_gps",
    "min",
    "max",
    "equal",
    "size",
    "from",
    "between",
    "enum",
    "same",
    "match",
    "unique",
];

const INTEGER_RULES: &[&str] = &[
    "int", "uint", "min", "max", "equal", "size", "from", "between", "enum", "same", "match",
];

const FLOAT_RULES: &[&str] = &[
    "float", "min", "max", "equal", "size", "from", "between", "enum", "same", "match",
];

/// The routing table.
#[must_use]
pub const fn applicable(kind: Kind) -> Applicable {
    match kind {
        Kind::Text => Applicable::Only(TEXT_RULES),
        Kind::Signed | Kind::Unsigned => Applicable::Only(INTEGER_RULES),
        Kind::Float => Applicable::Only(FLOAT_RULES),
        Kind::Bool => Applicable::None,
        // Sequences and references recurse into their contents for any rule.
        Kind::Sequence | Kind::Reference => Applicable::Any,
    }
}

/// Whether `name` is routed for `kind`.
#[must_use]
pub fn applies(kind: Kind, name: &str) -> bool {
    match applicable(kind) {
        Applicable::Any => true,
        Applicable::Only(names) => names.contains(&name),
        Applicable::None => false,
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Result of evaluating one rule against one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The rule holds.
    Pass,
    /// The rule is violated; rendered later with the rule's override message.
    Violation {
        /// Message key.
        key: String,
        /// Template parameters.
        params: Params,
    },
    /// A nested record produced a non-empty report.
    Nested(Report),
    /// Some sequence elements failed; details are already rendered.
    Elements(Vec<Detail>),
}

impl Verdict {
    fn violation(key: impl Into<String>) -> Self {
        Self::Violation {
            key: key.into(),
            params: Params::new(),
        }
    }

    fn violation_with(key: impl Into<String>, param: impl Into<String>) -> Self {
        let mut params = Params::new();
        params.push(param.into());
        Self::Violation {
            key: key.into(),
            params,
        }
    }

    fn when(violated: bool, make: impl FnOnce() -> Self) -> Self {
        if violated { make() } else { Self::Pass }
    }
}

/// Results of nested pipelines, computed at most once per field.
#[derive(Debug, Default)]
pub(crate) struct Memo {
    nested: Option<Report>,
    elements: Option<Vec<Option<Report>>>,
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Evaluates `rule` against the field in `cx`.
pub(crate) async fn dispatch(
    cx: &FieldContext<'_>,
    rule: &RuleSpec,
    memo: &mut Memo,
    slot: &mut Slot<'_>,
) -> Result<Verdict, RulesError> {
    let kind = cx.value.kind();
    if !applies(kind, rule.name()) {
        return Ok(Verdict::Pass);
    }
    match kind {
        Kind::Text => text(cx, rule).await,
        Kind::Signed | Kind::Unsigned => scalar(cx, rule, &[Class::Int, Class::Uint]),
        Kind::Float => scalar(cx, rule, &[Class::Float]),
        Kind::Bool => Ok(Verdict::Pass),
        Kind::Sequence => sequence(cx, rule, memo, slot).await,
        Kind::Reference => reference(cx, rule, memo, slot).await,
    }
}

/// Comparisons, `enum`, `same` and `match`, shared by every scalar kind.
fn common(cx: &FieldContext<'_>, rule: &RuleSpec) -> Result<Verdict, RulesError> {
    let name = rule.name();
    if let Some(cmp) = Comparison::from_name(name) {
        let Some(measure) = Measure::of(cx.value) else {
            return Ok(Verdict::Pass);
        };
        let violated = cmp.violates(measure, rule)?;
        return Ok(Verdict::when(violated, || Verdict::Violation {
            key: cmp.key(measure),
            params: cmp.params(rule),
        }));
    }
    match name {
        "enum" => {
            let violated = violates_enum(cx.value, rule)?;
            Ok(Verdict::when(violated, || {
                Verdict::violation_with("enum", rule.args().unwrap_or_default())
            }))
        }
        "same" => {
            let (violated, other) = violates_same(cx.value, rule, cx.record)?;
            Ok(Verdict::when(violated, || {
                Verdict::violation_with("same", format_label(other))
            }))
        }
        "match" => {
            let (violated, _) = violates_same(cx.value, rule, cx.record)?;
            Ok(Verdict::when(violated, || Verdict::violation("match")))
        }
        _ => Ok(Verdict::Pass),
    }
}

async fn text(cx: &FieldContext<'_>, rule: &RuleSpec) -> Result<Verdict, RulesError> {
    let Some(text) = cx.value.as_text() else {
        return Ok(Verdict::Pass);
    };
    if rule.args().is_none() {
        if let Some(shape) = Shape::from_name(rule.name()) {
            return Ok(Verdict::when(shape.violates(text), || {
                Verdict::violation(shape.key())
            }));
        }
        if let Some(format) = Format::from_name(rule.name()) {
            return Ok(Verdict::when(format.violates(text), || {
                Verdict::violation(format.key())
            }));
        }
        return Ok(Verdict::Pass);
    }
    if rule.name() == "unique" {
        return unique(cx, rule, text).await;
    }
    common(cx, rule)
}

fn scalar(cx: &FieldContext<'_>, rule: &RuleSpec, classes: &[Class]) -> Result<Verdict, RulesError> {
    if rule.args().is_none() {
        let class = Class::from_name(rule.name()).filter(|c| classes.contains(c));
        return Ok(match class {
            Some(class) => Verdict::when(class.violates(cx.value), || {
                Verdict::violation(class.key())
            }),
            None => Verdict::Pass,
        });
    }
    common(cx, rule)
}

async fn unique(cx: &FieldContext<'_>, rule: &RuleSpec, text: &str) -> Result<Verdict, RulesError> {
    let target = rule.target()?;
    let checker = cx
        .call
        .uniqueness()
        .ok_or(RulesError::MissingCollaborator)?;
    match checker.exists(&target, text).await {
        Ok(taken) => Ok(Verdict::when(taken, || Verdict::violation("unique"))),
        Err(source) => match cx.call.config().on_dependency_error {
            DependencyPolicy::Violation => {
                warn!(%target, error = %source, "uniqueness check failed, reporting a violation");
                Ok(Verdict::violation("unique"))
            }
            policy @ DependencyPolicy::Abort => {
                error!(%target, error = %source, "uniqueness check failed");
                Err(RulesError::Dependency {
                    target: target.to_string(),
                    source,
                    policy,
                })
            }
        },
    }
}

// ============================================================================
// FILES
// ============================================================================

async fn file_rule(
    cx: &FieldContext<'_>,
    file: &FileUpload,
    rule: &RuleSpec,
) -> Result<Verdict, RulesError> {
    let sniffer = cx.call.sniffer();
    let verdict = match (rule.name(), rule.args()) {
        ("image", None) => Verdict::when(
            file::violates_mimes(file, IMAGE_EXTENSIONS, sniffer).await,
            || Verdict::violation("image"),
        ),
        ("file", None) => Verdict::when(file::violates_readable(file).await, || {
            Verdict::violation("file")
        }),
        ("image" | "file" | "mimes", Some(extensions)) => {
            let key = match rule.name() {
                "image" => "image_type",
                "file" => "file_type",
                _ => "mimes",
            };
            Verdict::when(
                file::violates_mimes(file, extensions, sniffer).await,
                || Verdict::violation_with(key, extensions),
            )
        }
        ("size", Some(spec)) => size_rule(file, spec),
        _ => Verdict::Pass,
    };
    Ok(verdict)
}

fn size_rule(file: &FileUpload, spec: &str) -> Verdict {
    match SizeLimit::parse(spec) {
        Some(limit) => Verdict::when(limit.violates(file.size()), || {
            Verdict::violation_with(limit.key(), limit.amount())
        }),
        None => {
            warn!(spec, "file size rule does not match `N(kb|mb|gb|tb)`, ignoring");
            Verdict::Pass
        }
    }
}

// ============================================================================
// REFERENCES AND SEQUENCES
// ============================================================================

async fn reference(
    cx: &FieldContext<'_>,
    rule: &RuleSpec,
    memo: &mut Memo,
    slot: &mut Slot<'_>,
) -> Result<Verdict, RulesError> {
    match cx.value.resolve() {
        Value::File(file) => file_rule(cx, file, rule).await,
        Value::Record(view) => {
            if memo.nested.is_none() {
                slot.release();
                memo.nested = Some(nested(cx, Arc::clone(view)).await?);
            }
            Ok(match &memo.nested {
                Some(report) if !report.is_empty() => Verdict::Nested(report.clone()),
                _ => Verdict::Pass,
            })
        }
        _ => Ok(Verdict::Pass),
    }
}

async fn sequence(
    cx: &FieldContext<'_>,
    rule: &RuleSpec,
    memo: &mut Memo,
    slot: &mut Slot<'_>,
) -> Result<Verdict, RulesError> {
    let Value::List(items) = cx.value.resolve() else {
        return Ok(Verdict::Pass);
    };

    if rule.name() == "slice" {
        let (bound, amount) = rule.slice_bound()?;
        let cmp = if bound == "min" {
            Comparison::Min
        } else {
            Comparison::Max
        };
        if cmp.violates_bounds(Measure::Length(items.len()), amount, amount, rule)? {
            return Ok(Verdict::violation_with(
                format!("{}.slice", cmp.name()),
                amount,
            ));
        }
        // Within bounds: the elements are still checked below.
    }

    if items.iter().any(|item| item.as_record().is_some()) && memo.elements.is_none() {
        slot.release();
        let pending = items.iter().map(|item| {
            let view = item.as_record().cloned();
            async move {
                match view {
                    Some(view) => nested(cx, view).await.map(Some),
                    None => Ok(None),
                }
            }
        });
        memo.elements = Some(try_join_all(pending).await?);
    }

    let messages = cx.call.messages();
    let mut details = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let verdict = match item.resolve() {
            Value::Text(text) if rule.name() == "email" && rule.args().is_none() => {
                Verdict::when(Format::Email.violates(text), || Verdict::violation("email"))
            }
            Value::File(file) if matches!(rule.name(), "image" | "mimes" | "size") => {
                file_rule(cx, file, rule).await?
            }
            Value::Record(_) => match memo.elements.as_ref().and_then(|reports| reports.get(i)) {
                Some(Some(report)) if !report.is_empty() => Verdict::Nested(report.clone()),
                _ => Verdict::Pass,
            },
            _ => Verdict::Pass,
        };
        match verdict {
            Verdict::Pass => {}
            Verdict::Violation { key, params } => {
                let label = format!("{} ({})", cx.label, i + 1);
                details.push(Detail::Message(messages.render(
                    &key,
                    rule.message(),
                    &label,
                    &params,
                )));
            }
            Verdict::Nested(report) => details.push(Detail::Nested(report)),
            Verdict::Elements(inner) => details.push(Detail::List(inner)),
        }
    }

    Ok(if details.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Elements(details)
    })
}

/// Runs the full pipeline on a nested record one level deeper.
async fn nested(cx: &FieldContext<'_>, view: Arc<RecordView>) -> Result<Report, RulesError> {
    let depth = cx.depth + 1;
    let limit = cx.call.config().max_depth;
    if depth > limit {
        return Err(RulesError::DepthExceeded { limit });
    }
    run_record(Arc::clone(cx.call), view, depth).await
}
