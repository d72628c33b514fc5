//! Format checks on text: emails, phone numbers, dates and identifiers

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

// ============================================================================
// PATTERNS
// ============================================================================

/// International calling-code prefixes accepted by `phone_with_code`.
///
/// Longer codes come first so the alternation prefers the longest prefix.
const CALLING_CODES: &[&str] = &[
    "999", "998", "997", "996", "995", "994", "993", "992", "991", "990", "979", "978",
    "977", "976", "975", "974", "973", "972", "971", "970", "969", "968", "967", "966",
    "965", "964", "963", "962", "961", "960", "899", "898", "897", "896", "895", "894",
    "893", "892", "891", "890", "889", "888", "887", "886", "885", "884", "883", "882",
    "881", "880", "879", "878", "877", "876", "875", "874", "873", "872", "871", "870",
    "859", "858", "857", "856", "855", "854", "853", "852", "851", "850", "839", "838",
    "837", "836", "835", "834", "833", "832", "831", "830", "809", "808", "807", "806",
    "805", "804", "803", "802", "801", "800", "699", "698", "697", "696", "695", "694",
    "693", "692", "691", "690", "689", "688", "687", "686", "685", "684", "683", "682",
    "681", "680", "679", "678", "677", "676", "675", "674", "673", "672", "671", "670",
    "599", "598", "597", "596", "595", "594", "593", "592", "591", "590", "509", "508",
    "507", "506", "505", "504", "503", "502", "501", "500", "429", "428", "427", "426",
    "425", "424", "423", "422", "421", "420", "389", "388", "387", "386", "385", "384",
    "383", "382", "381", "380", "379", "378", "377", "376", "375", "374", "373", "372",
    "371", "370", "359", "358", "357", "356", "355", "354", "353", "352", "351", "350",
    "299", "298", "297", "296", "295", "294", "293", "292", "291", "290", "289", "288",
    "287", "286", "285", "284", "283", "282", "281", "280", "269", "268", "267", "266",
    "265", "264", "263", "262", "261", "260", "259", "258", "257", "256", "255", "254",
    "253", "252", "251", "250", "249", "248", "247", "246", "245", "244", "243", "242",
    "241", "240", "239", "238", "237", "236", "235", "234", "233", "232", "231", "230",
    "229", "228", "227", "226", "225", "224", "223", "222", "221", "220", "219", "218",
    "217", "216", "215", "214", "213", "212", "211", "210", "98", "95", "94", "93",
    "92", "91", "90", "86", "84", "82", "81", "66", "65", "64", "63", "62",
    "61", "60", "58", "57", "56", "55", "54", "53", "52", "51", "49", "48",
    "47", "46", "45", "44", "43", "41", "40", "39", "36", "34", "33", "32",
    "31", "30", "27", "20", "7", "1",
];

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[0-9]{9}$").expect("valid phone regex"));

static PHONE_WITH_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^\+({})[0-9]{{1,14}}$", CALLING_CODES.join("|"));
    Regex::new(&pattern).expect("valid phone_with_code regex")
});

static GH_CARD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^GHA-[0-9]{9}-[0-9]$").expect("valid gh_card regex"));

static GH_GPS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}-[0-9]{1,4}-[0-9]{4}$").expect("valid gh_gps regex")
});

static RFC3339_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2})$",
    )
    .expect("valid rfc3339 regex")
});

static DATETIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?$")
        .expect("valid datetime regex")
});

static DATEONLY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid dateonly regex"));

static TIMEONLY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?$").expect("valid timeonly regex")
    });

/// Email domains that are never accepted.
const BLOCKED_DOMAINS: &[&str] = &["localhost", "localhost.com", "example.com"];

// ============================================================================
// FORMAT
// ============================================================================

/// A date or time layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `2006-01-02T15:04:05Z07:00`, fractional seconds allowed.
    Rfc3339,
    /// `2006-01-02 15:04:05`, fractional seconds allowed.
    DateTime,
    /// `2006-01-02`
    DateOnly,
    /// `15:04:05`, fractional seconds allowed.
    TimeOnly,
}

impl DateLayout {
    /// Rule name of the layout, also the message sub-key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rfc3339 => "rfc3339",
            Self::DateTime => "datetime",
            Self::DateOnly => "dateonly",
            Self::TimeOnly => "timeonly",
        }
    }

    /// Whether `text` does not parse exactly under this layout.
    #[must_use]
    pub fn violates(self, text: &str) -> bool {
        match self {
            Self::Rfc3339 => {
                !RFC3339_REGEX.is_match(text) || DateTime::parse_from_rfc3339(text).is_err()
            }
            Self::DateTime => {
                !DATETIME_REGEX.is_match(text)
                    || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").is_err()
                    || leap_second(text, 17)
            }
            Self::DateOnly => {
                !DATEONLY_REGEX.is_match(text)
                    || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err()
            }
            Self::TimeOnly => {
                !TIMEONLY_REGEX.is_match(text)
                    || NaiveTime::parse_from_str(text, "%H:%M:%S%.f").is_err()
                    || leap_second(text, 6)
            }
        }
    }
}

/// chrono accepts a leap second `60`; these layouts do not.
fn leap_second(text: &str, seconds_at: usize) -> bool {
    text.get(seconds_at..seconds_at + 2) == Some("60")
}

/// A text format rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `email`
    Email,
    /// `phone`: a leading `0` and nine digits.
    Phone,
    /// `phone_with_code`: `+`, a calling code and up to 14 digits.
    PhoneWithCode,
    /// `username`: an email, or a phone number with or without code.
    Username,
    /// `gh_card`: `GHA-#########-#`.
    GhCard,
    /// `gh_gps`: `XX-####-####` with one to four digits in the middle.
    GhGps,
    /// `rfc3339`, `datetime`, `dateonly`, `timeonly`.
    Date(DateLayout),
}

impl Format {
    /// Looks a format up by rule name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "email" => Self::Email,
            "phone" => Self::Phone,
            "phone_with_code" => Self::PhoneWithCode,
            "username" => Self::Username,
            "gh_card" => Self::GhCard,
            "gh_gps" => Self::GhGps,
            "rfc3339" => Self::Date(DateLayout::Rfc3339),
            "datetime" => Self::Date(DateLayout::DateTime),
            "dateonly" => Self::Date(DateLayout::DateOnly),
            "timeonly" => Self::Date(DateLayout::TimeOnly),
            _ => return None,
        })
    }

    /// Message key; date layouts live under the `date` group.
    #[must_use]
    pub fn key(self) -> String {
        match self {
            Self::Email => "email".into(),
            Self::Phone => "phone".into(),
            Self::PhoneWithCode => "phone_with_code".into(),
            Self::Username => "username".into(),
            Self::GhCard => "gh_card".into(),
            Self::GhGps => "gh_gps".into(),
            Self::Date(layout) => format!("date.{}", layout.name()),
        }
    }

    /// Whether `text` is not in this format.
    #[must_use]
    pub fn violates(self, text: &str) -> bool {
        match self {
            Self::Email => !is_email(text),
            Self::Phone => !PHONE_REGEX.is_match(text),
            Self::PhoneWithCode => !PHONE_WITH_CODE_REGEX.is_match(text),
            Self::Username => {
                if text.contains('@') {
                    Self::Email.violates(text)
                } else if text.starts_with('+') {
                    Self::PhoneWithCode.violates(text)
                } else {
                    Self::Phone.violates(text)
                }
            }
            Self::GhCard => !GH_CARD_REGEX.is_match(text),
            Self::GhGps => !GH_GPS_REGEX.is_match(text),
            Self::Date(layout) => layout.violates(text),
        }
    }
}

// ============================================================================
// EMAIL
// ============================================================================

/// Email acceptance: 6 to 254 bytes, a non-empty local part of at most 64
/// bytes before the last `@`, at least two bytes of domain outside the
/// blocked list, and a well-formed RFC 5322 mailbox overall.
pub fn is_email(text: &str) -> bool {
    if !(6..=254).contains(&text.len()) {
        return false;
    }
    let Some(at) = text.rfind('@') else {
        return false;
    };
    if at == 0 || at > text.len() - 3 {
        return false;
    }
    if BLOCKED_DOMAINS.contains(&&text[at + 1..]) {
        return false;
    }
    if at > 64 {
        return false;
    }
    mailbox::parse(text)
}

/// A small RFC 5322 mailbox recognizer.
///
/// Accepts `addr-spec` or `[display-name] <addr-spec>`, with comments and
/// folding whitespace between tokens. Local parts are dot-atoms (dots are
/// tolerated anywhere) or quoted strings; domains are strict dot-atoms or
/// domain literals.
mod mailbox {
    pub(super) fn parse(input: &str) -> bool {
        let mut plain = Cursor::new(input);
        plain.skip_cfws();
        if plain.addr_spec() {
            plain.skip_cfws();
            if plain.at_end() {
                return true;
            }
        }

        let mut named = Cursor::new(input);
        named.skip_cfws();
        named.phrase();
        named.skip_cfws();
        if !named.eat(b'<') || !named.addr_spec() || !named.eat(b'>') {
            return false;
        }
        named.skip_cfws();
        named.at_end()
    }

    fn is_atext(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b >= 0x80 || b"!#$%&'*+-/=?^_`{|}~".contains(&b)
    }

    struct Cursor<'a> {
        bytes: &'a [u8],
        pos: usize,
    }

    impl<'a> Cursor<'a> {
        fn new(input: &'a str) -> Self {
            Self {
                bytes: input.as_bytes(),
                pos: 0,
            }
        }

        fn peek(&self) -> Option<u8> {
            self.bytes.get(self.pos).copied()
        }

        fn at_end(&self) -> bool {
            self.pos >= self.bytes.len()
        }

        fn eat(&mut self, b: u8) -> bool {
            if self.peek() == Some(b) {
                self.pos += 1;
                true
            } else {
                false
            }
        }

        fn skip_cfws(&mut self) {
            loop {
                match self.peek() {
                    Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                    Some(b'(') => {
                        if !self.comment() {
                            return;
                        }
                    }
                    _ => return,
                }
            }
        }

        fn comment(&mut self) -> bool {
            let start = self.pos;
            let mut depth = 0usize;
            while let Some(b) = self.peek() {
                self.pos += 1;
                match b {
                    b'\\' => self.pos += 1,
                    b'(' => depth += 1,
                    b')' => {
                        depth -= 1;
                        if depth == 0 {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
            self.pos = start;
            false
        }

        /// One or more atext bytes, dots allowed when `dots` is set.
        fn atom(&mut self, dots: bool) -> Option<&'a [u8]> {
            let start = self.pos;
            while let Some(b) = self.peek() {
                if is_atext(b) || (dots && b == b'.') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            (self.pos > start).then(|| &self.bytes[start..self.pos])
        }

        fn quoted_string(&mut self) -> bool {
            let start = self.pos;
            if !self.eat(b'"') {
                return false;
            }
            while let Some(b) = self.peek() {
                self.pos += 1;
                match b {
                    b'"' => return true,
                    b'\\' if self.pos < self.bytes.len() => self.pos += 1,
                    b'\r' | b'\n' => break,
                    _ => {}
                }
            }
            self.pos = start;
            false
        }

        fn phrase(&mut self) {
            loop {
                self.skip_cfws();
                let progressed = if self.peek() == Some(b'"') {
                    self.quoted_string()
                } else {
                    self.atom(true).is_some()
                };
                if !progressed {
                    return;
                }
            }
        }

        fn addr_spec(&mut self) -> bool {
            let local = if self.peek() == Some(b'"') {
                self.quoted_string()
            } else {
                self.atom(true).is_some()
            };
            if !local || !self.eat(b'@') {
                return false;
            }
            self.domain()
        }

        fn domain(&mut self) -> bool {
            if self.eat(b'[') {
                while let Some(b) = self.peek() {
                    self.pos += 1;
                    match b {
                        b']' => return true,
                        b'[' | b'\\' => return false,
                        _ => {}
                    }
                }
                return false;
            }
            match self.atom(true) {
                Some(domain) => {
                    domain.first() != Some(&b'.')
                        && domain.last() != Some(&b'.')
                        && !domain.windows(2).any(|w| w == b"..")
                }
                None => false,
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
