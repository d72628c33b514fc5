//! `enum:a,b,c` membership and `same` / `match` cross-field equality

use crate::foundation::{RecordView, RulesError, Value};
use crate::parser::RuleSpec;

/// Whether `value` is not one of the rule's comma-separated tokens.
///
/// Comparison is exact: no trimming, no case folding.
pub fn violates_enum(value: &Value, rule: &RuleSpec) -> Result<bool, RulesError> {
    let rendered = value.render();
    Ok(!rule.list()?.contains(&rendered.as_str()))
}

/// Whether `value` differs from the sibling field named by the rule.
///
/// Both sides are compared as rendered text with surrounding whitespace
/// trimmed. The sibling is found by wire-label and does not need a rule chain
/// of its own. Returns the sibling's label alongside the outcome.
pub fn violates_same<'a>(
    value: &Value,
    rule: &'a RuleSpec,
    record: &RecordView,
) -> Result<(bool, &'a str), RulesError> {
    let label = rule.single()?;
    let other = record
        .by_label(label)
        .ok_or_else(|| RulesError::UnknownField(label.to_owned()))?;
    let differs = value.render().trim() != other.value().render().trim();
    Ok((differs, label))
}
