//! Message synthesis
//!
//! Turns a violated rule into the string shown to the caller. Templates come
//! from a [`LocaleStore`]; placeholders are positional: `{0}` is the field
//! label, `{1}` and `{2}` are rule parameters. An override message from the
//! rule chain replaces the template verbatim. A key with no template renders
//! as the key itself.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use serde::Deserialize;

// ============================================================================
// LOCALE STORE
// ============================================================================

/// Read-only source of message templates.
pub trait LocaleStore: Send + Sync {
    /// The template for `key` in `locale`.
    ///
    /// Compound keys such as `min.string` address a template nested under a
    /// group.
    fn lookup(&self, locale: &str, key: &str) -> Option<&str>;
}

/// One catalog entry: a template, or a group of templates for compound keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Entry {
    Template(String),
    Group(HashMap<String, String>),
}

type Catalog = HashMap<String, Entry>;

const DEFAULT_LOCALE: &str = "en";

static CATALOGS: LazyLock<HashMap<&'static str, Catalog>> = LazyLock::new(|| {
    [
        ("en", include_str!("../locales/en.json")),
        ("fr", include_str!("../locales/fr.json")),
    ]
    .into_iter()
    .map(|(locale, raw)| {
        let catalog = serde_json::from_str(raw).unwrap_or_else(|err| {
            tracing::error!(locale, error = %err, "embedded locale catalog is invalid");
            Catalog::new()
        });
        (locale, catalog)
    })
    .collect()
});

/// The catalogs compiled into the crate (`en`, `fr`).
///
/// Loaded once per process and never mutated. Unknown locales fall back to
/// `en`; locale identifiers are matched case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLocales;

impl BuiltinLocales {
    /// Locales with an embedded catalog.
    #[must_use]
    pub fn available() -> Vec<&'static str> {
        let mut locales: Vec<_> = CATALOGS.keys().copied().collect();
        locales.sort_unstable();
        locales
    }
}

impl LocaleStore for BuiltinLocales {
    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        let catalog = CATALOGS
            .get(locale.to_ascii_lowercase().as_str())
            .or_else(|| CATALOGS.get(DEFAULT_LOCALE))?;
        match key.split_once('.') {
            Some((group, sub)) => match catalog.get(group)? {
                Entry::Group(templates) => templates.get(sub).map(String::as_str),
                Entry::Template(_) => None,
            },
            None => match catalog.get(key)? {
                Entry::Template(template) => Some(template.as_str()),
                Entry::Group(_) => None,
            },
        }
    }
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

/// Renders violations for one locale.
#[derive(Clone)]
pub struct Messages {
    store: Arc<dyn LocaleStore>,
    locale: String,
}

impl Messages {
    /// Creates a synthesizer over `store` for `locale`.
    pub fn new(store: Arc<dyn LocaleStore>, locale: impl Into<String>) -> Self {
        Self {
            store,
            locale: locale.into(),
        }
    }

    /// The locale in use.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Renders the message for a violated rule.
    ///
    /// `label` is the already formatted field label.
    #[must_use]
    pub fn render(
        &self,
        key: &str,
        override_message: Option<&str>,
        label: &str,
        params: &[String],
    ) -> String {
        if let Some(message) = override_message {
            return message.to_owned();
        }
        match self.store.lookup(&self.locale, key) {
            Some(template) => fill(template, label, params),
            None => key.to_owned(),
        }
    }
}

impl std::fmt::Debug for Messages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messages")
            .field("locale", &self.locale)
            .finish()
    }
}

fn fill(template: &str, label: &str, params: &[String]) -> String {
    let mut out = template.replace("{0}", label);
    for (i, param) in params.iter().enumerate().take(2) {
        out = out.replace(&format!("{{{}}}", i + 1), param);
    }
    out
}

/// Converts a wire-label into lowercase words.
///
/// A space goes in at every lower-to-upper case transition and before the
/// last capital of an acronym followed by lowercase; `_` and `-` become
/// spaces. `userType` becomes `user type`, `HTTPStatus` becomes
/// `http status`, `first_name` becomes `first name`.
pub fn format_label(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    let mut out = String::with_capacity(label.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let after_lower = prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            let acronym_end = prev.is_some_and(|p| p.is_ascii_uppercase())
                && chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if (after_lower || acronym_end) && !out.ends_with(' ') {
                out.push(' ');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out.trim_end().to_owned()
}
