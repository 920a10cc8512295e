//! Field validators
//!
//! Every form field is described by a [`FieldSpec`]: its name, the kind of
//! content it holds, whether it is required and which catalog keys explain
//! its errors. [`FieldKind::validate`] is the pure check behind all three
//! site forms:
//!
//! - required and blank gives [`FieldError::MissingRequired`]
//! - present but failing the kind's pattern gives [`FieldError::InvalidFormat`]
//! - message bodies shorter than 10 characters or 3 words give
//!   [`FieldError::MessageTooShort`]
//! - optional and blank is valid
//!
//! Patterns accept the accented Latin letters used in Spanish and Catalan
//! names and addresses. Email checking is a deliberately loose
//! "something@domain.tld" heuristic, not RFC 5322.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::predicate::{
    self, contains_markup, matches, min_chars, min_words, not_blank, Predicate, PredicateExt,
};
use crate::{Semigroup, Validation};

/// Minimum trimmed length of a message body.
pub const MESSAGE_MIN_CHARS: usize = 10;
/// Minimum word count of a message body.
pub const MESSAGE_MIN_WORDS: usize = 3;

static NAME_OR_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9À-ÿñÑ\s.,'&()/-]{2,}$").expect("valid pattern"));
static BUSINESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9À-ÿñÑ\s.,'&()/-]{3,}$").expect("valid pattern"));
static PERSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZÀ-ÿñÑ\s']{3,}$").expect("valid pattern"));
static PLACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZÀ-ÿñÑ\s']{1,}$").expect("valid pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]{7,}$").expect("valid pattern"));

/// What a field holds, which decides the pattern it must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Person's full name (letters, digits, common punctuation, 2+ chars)
    Name,
    /// Free text such as company, city or address (same rule as `Name`)
    Text,
    /// Email address
    Email,
    /// Loose international phone number
    Phone,
    /// Message body, guarded by length and word count
    Message,
    /// Selection from a fixed option list; only presence is checked here
    Choice,
    /// Letters-only person name, 3+ chars
    PersonName,
    /// Letters-only place name
    Place,
    /// Business name, 3+ chars
    Business,
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldError {
    /// Required field left blank
    MissingRequired,
    /// Value does not match the field's pattern
    InvalidFormat,
    /// Message body under the minimum length or word count
    MessageTooShort,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::MissingRequired => write!(f, "missing required value"),
            FieldError::InvalidFormat => write!(f, "invalid format"),
            FieldError::MessageTooShort => write!(f, "message too short"),
        }
    }
}

impl FieldKind {
    /// Check `value` against this kind.
    ///
    /// The value is trimmed first. Returns `None` when it passes.
    ///
    /// ```
    /// use bites_forms::field::{FieldError, FieldKind};
    ///
    /// assert_eq!(FieldKind::Email.validate("user@example.com", true), None);
    /// assert_eq!(FieldKind::Email.validate("", true), Some(FieldError::MissingRequired));
    /// assert_eq!(FieldKind::Phone.validate("", false), None);
    /// assert_eq!(
    ///     FieldKind::Message.validate("Hola hola", true),
    ///     Some(FieldError::MessageTooShort)
    /// );
    /// ```
    pub fn validate(self, value: &str, required: bool) -> Option<FieldError> {
        let value = value.trim();
        if !not_blank().check(value) {
            return required.then_some(FieldError::MissingRequired);
        }

        let passes = match self {
            FieldKind::Name | FieldKind::Text => matches(&NAME_OR_TEXT).check(value),
            FieldKind::Email => matches(&EMAIL).check(value),
            FieldKind::Phone => matches(&PHONE).check(value),
            FieldKind::PersonName => matches(&PERSON_NAME).check(value),
            FieldKind::Place => matches(&PLACE).check(value),
            FieldKind::Business => matches(&BUSINESS).check(value),
            FieldKind::Choice => true,
            FieldKind::Message => {
                let long_enough = min_chars(MESSAGE_MIN_CHARS).and(min_words(MESSAGE_MIN_WORDS));
                return (!long_enough.check(value)).then_some(FieldError::MessageTooShort);
            }
        };

        (!passes).then_some(FieldError::InvalidFormat)
    }
}

/// Static description of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, also the key in [`FieldErrors`]
    pub name: &'static str,
    /// Content kind
    pub kind: FieldKind,
    /// Whether a blank value is an error
    pub required: bool,
    /// Reject raw values containing markup or SQL comment characters
    pub reject_markup: bool,
    /// Catalog key shown for [`FieldError::MissingRequired`]
    pub required_key: &'static str,
    /// Catalog key shown for format and length errors
    pub invalid_key: &'static str,
}

impl FieldSpec {
    /// Catalog key explaining `error` for this field.
    pub fn message_key(&self, error: FieldError) -> &'static str {
        match error {
            FieldError::MissingRequired => self.required_key,
            FieldError::InvalidFormat | FieldError::MessageTooShort => self.invalid_key,
        }
    }

    /// Run the field rule on a raw value.
    pub fn validate(&self, raw: &str) -> Option<FieldError> {
        if let Some(error) = self.kind.validate(raw, self.required) {
            return Some(error);
        }
        if !self.reject_markup {
            return None;
        }
        predicate::validate(raw, &contains_markup().not(), FieldError::InvalidFormat)
            .into_result()
            .err()
    }
}

/// Per-field errors of one validation pass, keyed by field name.
///
/// Absence of a key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, FieldError>);

impl FieldErrors {
    /// No errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A report with one entry.
    pub fn single(field: &'static str, error: FieldError) -> Self {
        Self(BTreeMap::from([(field, error)]))
    }

    /// Error recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<FieldError> {
        self.0.get(field).copied()
    }

    /// Record an error, replacing any previous one for the field.
    pub fn insert(&mut self, field: &'static str, error: FieldError) {
        self.0.insert(field, error);
    }

    /// Forget the error for `field`; returns whether one was present.
    pub fn clear(&mut self, field: &str) -> bool {
        self.0.remove(field).is_some()
    }

    /// True when every field passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FieldError)> + '_ {
        self.0.iter().map(|(name, error)| (*name, *error))
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl FromIterator<(&'static str, FieldError)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (&'static str, FieldError)>>(iter: I) -> Self {
        FieldErrors(iter.into_iter().collect())
    }
}

/// Validate one raw value and return it trimmed.
///
/// ```
/// use bites_forms::field::{check, FieldKind, FieldSpec};
/// use bites_forms::Validation;
///
/// const CITY: FieldSpec = FieldSpec {
///     name: "city",
///     kind: FieldKind::Text,
///     required: true,
///     reject_markup: false,
///     required_key: "required",
///     invalid_key: "invalidCity",
/// };
///
/// assert_eq!(check(&CITY, "  Lleida "), Validation::Success("Lleida".to_string()));
/// assert!(check(&CITY, "").is_failure());
/// ```
pub fn check(spec: &FieldSpec, raw: &str) -> Validation<String, FieldErrors> {
    match spec.validate(raw) {
        None => Validation::success(raw.trim().to_string()),
        Some(error) => Validation::failure(FieldErrors::single(spec.name, error)),
    }
}
