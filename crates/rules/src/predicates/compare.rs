//! Comparative rules: `min`, `max`, `equal`, `size`, `between`, `from`
//!
//! Text is measured by its byte length, sequences by their element count,
//! numbers by their value. `between` bounds are exclusive, `from` bounds are
//! inclusive.

use std::str::FromStr;

use crate::foundation::{RulesError, Value};
use crate::parser::{Params, RuleSpec};

/// A comparative rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// At least the bound.
    Min,
    /// At most the bound.
    Max,
    /// Exactly the bound.
    Equal,
    /// Exactly the bound; alias of [`Comparison::Equal`] with its own key.
    Size,
    /// Strictly inside `(min, max)`.
    Between,
    /// Inside `[min, max]`.
    From,
}

impl Comparison {
    /// Looks a comparison up by rule name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "equal" => Some(Self::Equal),
            "size" => Some(Self::Size),
            "between" => Some(Self::Between),
            "from" => Some(Self::From),
            _ => None,
        }
    }

    /// The rule name, also the message group.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Equal => "equal",
            Self::Size => "size",
            Self::Between => "between",
            Self::From => "from",
        }
    }

    /// Whether the rule takes a `min,max` pair.
    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Between | Self::From)
    }

    fn holds<T: PartialOrd>(self, value: T, low: T, high: T) -> bool {
        match self {
            Self::Min => value >= low,
            Self::Max => value <= low,
            Self::Equal | Self::Size => value == low,
            Self::Between => value > low && value < high,
            Self::From => value >= low && value <= high,
        }
    }

    /// Evaluates the rule against a measure.
    ///
    /// Returns whether the measure violates it, or a
    /// [`RulesError::MalformedRule`] when a bound does not parse for the
    /// measure's type.
    pub fn violates(self, measure: Measure, rule: &RuleSpec) -> Result<bool, RulesError> {
        let (low, high) = if self.is_range() {
            rule.bounds()?
        } else {
            let bound = rule.single()?;
            (bound, bound)
        };
        self.violates_bounds(measure, low, high, rule)
    }

    /// Evaluates against explicit bounds; `high` is ignored unless the
    /// comparison is a range. `rule` is only used to report parse failures.
    pub fn violates_bounds(
        self,
        measure: Measure,
        low: &str,
        high: &str,
        rule: &RuleSpec,
    ) -> Result<bool, RulesError> {
        let high = if self.is_range() { high } else { low };
        let holds = match measure {
            Measure::Length(len) => {
                let len = i64::try_from(len).unwrap_or(i64::MAX);
                self.holds(len, parse(rule, low)?, parse(rule, high)?)
            }
            Measure::Int(n) => self.holds(n, parse(rule, low)?, parse(rule, high)?),
            Measure::Uint(n) => self.holds(n, parse(rule, low)?, parse(rule, high)?),
            Measure::Float(n) => self.holds(n, parse(rule, low)?, parse(rule, high)?),
        };
        Ok(!holds)
    }

    /// Message key for a measure, e.g. `min.string` or `between.numeric`.
    #[must_use]
    pub fn key(self, measure: Measure) -> String {
        format!("{}.{}", self.name(), measure.group())
    }

    /// Message parameters: the bound, or both bounds of a range.
    #[must_use]
    pub fn params(self, rule: &RuleSpec) -> Params {
        let mut params = Params::new();
        match (self.is_range(), rule.args()) {
            (true, Some(args)) => {
                if let Some((low, high)) = args.split_once(',') {
                    params.push(low.to_owned());
                    params.push(high.to_owned());
                }
            }
            (false, Some(arg)) => params.push(arg.to_owned()),
            (_, None) => {}
        }
        params
    }
}

fn parse<T: FromStr>(rule: &RuleSpec, raw: &str) -> Result<T, RulesError> {
    raw.parse()
        .map_err(|_| rule.malformed(format!("bound `{raw}` is not a number")))
}

/// What a comparative rule compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    /// Text byte length or sequence element count.
    Length(usize),
    /// A signed number.
    Int(i64),
    /// An unsigned number.
    Uint(u64),
    /// A floating-point number.
    Float(f64),
}

impl Measure {
    /// Measures a value; `None` for kinds without a measure.
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value.resolve() {
            Value::Text(s) => Some(Self::Length(s.len())),
            Value::List(items) => Some(Self::Length(items.len())),
            Value::Int(n) => Some(Self::Int(*n)),
            Value::Uint(n) => Some(Self::Uint(*n)),
            Value::Float(n) => Some(Self::Float(*n)),
            _ => None,
        }
    }

    /// Message group suffix. Lengths report as `string`; sequences use
    /// [`Measure::Length`] through the `slice:` rules, which pick their own key.
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::Length(_) => "string",
            Self::Int(_) | Self::Uint(_) | Self::Float(_) => "numeric",
        }
    }
}
