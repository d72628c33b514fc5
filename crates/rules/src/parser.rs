//! Rule-chain parser
//!
//! Grammar, per field:
//!
//! ```text
//! chain := rule ("|" rule)*
//! rule  := name [":" args] [">" message]
//! ```
//!
//! The override message is split off first, at the first `>`, and consumes
//! the rest of the rule token. The name is then split from its arguments at
//! the first `:`. There is no quoting or escaping: a `|`, `:` or `>` can never
//! be part of an argument. Parsing itself never fails; arguments are
//! interpreted lazily by the accessors below, which report
//! [`RulesError::MalformedRule`] when a rule cannot use what it was given.

use smallvec::SmallVec;

use crate::external::UniqueTarget;
use crate::foundation::RulesError;

/// Rule arguments as handed to the message templates (at most two).
pub type Params = SmallVec<[String; 2]>;

/// One parsed rule of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    name: String,
    args: Option<String>,
    message: Option<String>,
}

impl RuleSpec {
    /// Parses a single rule token.
    pub fn parse(token: &str) -> Self {
        let (head, message) = match token.split_once('>') {
            Some((head, message)) => (head, Some(message.to_owned())),
            None => (token, None),
        };
        let (name, args) = match head.split_once(':') {
            Some((name, args)) => (name, Some(args.to_owned())),
            None => (head, None),
        };
        Self {
            name: name.to_owned(),
            args,
            message,
        }
    }

    /// The rule name (`required`, `min`, `slice`, ...).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Everything after the first `:`, if present.
    #[must_use]
    pub fn args(&self) -> Option<&str> {
        self.args.as_deref()
    }

    /// The caller-supplied override message, if present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    /// `true` for `required`.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.name == "required" && self.args.is_none()
    }

    /// `true` for the placeholder rules (`""` and `_`) that only mark a field
    /// for validation.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.args.is_none() && matches!(self.name.as_str(), "" | "_")
    }

    /// The single scalar argument.
    pub fn single(&self) -> Result<&str, RulesError> {
        match self.args() {
            Some(arg) if !arg.is_empty() => Ok(arg),
            _ => Err(self.malformed("expected one argument")),
        }
    }

    /// The `min,max` argument pair of a range rule.
    pub fn bounds(&self) -> Result<(&str, &str), RulesError> {
        self.single()?
            .split_once(',')
            .ok_or_else(|| self.malformed("expected two comma-separated bounds"))
    }

    /// The comma-separated token list of an enumeration-like rule.
    pub fn list(&self) -> Result<Vec<&str>, RulesError> {
        Ok(self.single()?.split(',').collect())
    }

    /// The `table.column` target of a `unique` rule.
    pub fn target(&self) -> Result<UniqueTarget, RulesError> {
        let (table, column) = self
            .single()?
            .split_once('.')
            .filter(|(table, column)| !table.is_empty() && !column.is_empty())
            .ok_or_else(|| self.malformed("expected `table.column`"))?;
        Ok(UniqueTarget::new(table, column))
    }

    /// The `(bound, amount)` pair of a `slice:min:N` / `slice:max:N` rule.
    pub fn slice_bound(&self) -> Result<(&str, &str), RulesError> {
        self.single()?
            .split_once(':')
            .filter(|(bound, _)| matches!(*bound, "min" | "max"))
            .ok_or_else(|| self.malformed("expected `slice:min:N` or `slice:max:N`"))
    }

    /// Builds a [`RulesError::MalformedRule`] for this rule.
    pub(crate) fn malformed(&self, reason: impl Into<String>) -> RulesError {
        RulesError::malformed(self.name.clone(), reason)
    }
}

/// Parses a whole rule chain, left to right.
///
/// ```rust,ignore
/// let chain = parse_chain("required>Name is required|string|from:1,5");
/// assert_eq!(chain.len(), 3);
/// assert_eq!(chain[0].message(), Some("Name is required"));
/// assert_eq!(chain[2].bounds()?, ("1", "5"));
/// ```
pub fn parse_chain(chain: &str) -> Vec<RuleSpec> {
    chain.split('|').map(RuleSpec::parse).collect()
}

/// Converts a camelCase column name to snake_case (`emailAddress` becomes
/// `email_address`, `HTTPStatus` becomes `http_status`).
pub fn snake_case(camel: &str) -> String {
    let chars: Vec<char> = camel.chars().collect();
    let mut snake = String::with_capacity(camel.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            snake.push(c);
            continue;
        }
        let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
        let before_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
        if i > 0 && (after_lower || before_lower) && !snake.ends_with('_') {
            snake.push('_');
        }
        snake.push(c.to_ascii_lowercase());
    }
    snake
}
