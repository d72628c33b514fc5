//! Per-field evaluation
//!
//! Drives one field's rule chain as a small state machine:
//!
//! ```text
//! Scanning(i) --rule i holds-----------> Scanning(i + 1)
//! Scanning(i) --rule i violated--------> Violated
//! Scanning(n) -------------------------> Passed
//! ```
//!
//! An empty value never reaches the dispatcher: it is either a `required`
//! violation (wherever `required` sits in the chain) or a pass.

use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::trace;

use crate::dispatch::{Memo, Verdict, dispatch};
use crate::engine::Call;
use crate::foundation::{Kind, RecordView, RulesError, Value, Violation};
use crate::message::format_label;
use crate::parser::{RuleSpec, parse_chain};

/// Everything a rule needs to know about the field it runs on.
pub(crate) struct FieldContext<'a> {
    pub(crate) call: &'a Arc<Call>,
    pub(crate) record: &'a RecordView,
    pub(crate) value: &'a Value,
    /// The formatted label used in messages.
    pub(crate) label: &'a str,
    pub(crate) depth: usize,
}

/// A worker-pool slot held while a field evaluates.
///
/// Released before waiting on a nested record so nested fields can run.
pub(crate) struct Slot<'a> {
    _permit: Option<SemaphorePermit<'a>>,
}

impl<'a> Slot<'a> {
    async fn acquire(permits: &'a Semaphore) -> Result<Self, RulesError> {
        let permit = permits.acquire().await.map_err(|_| RulesError::WorkerPool)?;
        Ok(Self {
            _permit: Some(permit),
        })
    }

    pub(crate) fn release(&mut self) {
        self._permit = None;
    }
}

enum State {
    Scanning(usize),
    Violated(Violation),
    Passed,
}

/// Evaluates field `index` of `record`.
///
/// Returns `None` when the field passes.
pub(crate) async fn evaluate_field(
    call: &Arc<Call>,
    record: &RecordView,
    index: usize,
    depth: usize,
) -> Result<Option<Violation>, RulesError> {
    let Some(field) = record.get(index) else {
        return Ok(None);
    };
    let (Some(label), Some(chain)) = (field.label(), field.chain()) else {
        return Ok(None);
    };

    let rules = parse_chain(chain);
    let value = field.value();
    let display = format_label(label);
    let messages = call.messages();

    if value.is_empty() {
        let Some(required) = rules.iter().find(|r| r.is_required()) else {
            return Ok(None);
        };
        let key = if matches!(value.resolve(), Value::Bool(_)) {
            "bool"
        } else {
            "required"
        };
        trace!(field = label, key, "empty value");
        return Ok(Some(Violation::message(
            key,
            messages.render(key, required.message(), &display, &[]),
        )));
    }

    let mut slot = Slot::acquire(call.permits()).await?;
    let cx = FieldContext {
        call,
        record,
        value,
        label: &display,
        depth,
    };
    let mut memo = Memo::default();
    let mut state = State::Scanning(0);

    loop {
        state = match state {
            State::Scanning(i) if i == rules.len() => State::Passed,
            State::Scanning(i) => {
                let rule = &rules[i];
                let verdict = step(&cx, rule, &mut memo, &mut slot).await?;
                trace!(field = label, rule = rule.name(), ?verdict, "rule evaluated");
                match into_violation(&cx, rule, verdict) {
                    Some(violation) => State::Violated(violation),
                    None => State::Scanning(i + 1),
                }
            }
            State::Violated(violation) => return Ok(Some(violation)),
            State::Passed => return Ok(None),
        };
    }
}

async fn step(
    cx: &FieldContext<'_>,
    rule: &RuleSpec,
    memo: &mut Memo,
    slot: &mut Slot<'_>,
) -> Result<Verdict, RulesError> {
    if rule.is_placeholder() || rule.is_required() {
        // Placeholders and `required` carry no predicate of their own, but
        // they still open nested records and sequences.
        if !matches!(cx.value.kind(), Kind::Sequence | Kind::Reference) {
            return Ok(Verdict::Pass);
        }
    }
    dispatch(cx, rule, memo, slot).await
}

fn into_violation(cx: &FieldContext<'_>, rule: &RuleSpec, verdict: Verdict) -> Option<Violation> {
    match verdict {
        Verdict::Pass => None,
        Verdict::Violation { key, params } => {
            let message = cx
                .call
                .messages()
                .render(&key, rule.message(), cx.label, &params);
            Some(Violation::message(key, message))
        }
        Verdict::Nested(report) => Some(Violation::nested("nested", report)),
        Verdict::Elements(items) => Some(Violation::list("elements", items)),
    }
}
