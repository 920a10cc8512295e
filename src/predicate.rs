//! Composable predicates for field checks
//!
//! Field rules are built from small string predicates combined with
//! `and` and `not`, then lifted into a [`Validation`] with [`validate`].
//!
//! ```rust
//! use bites_forms::predicate::*;
//!
//! let message_body = min_chars(10).and(min_words(3));
//! assert!(message_body.check("Quiero probar los snacks"));
//! assert!(!message_body.check("Hola"));
//! ```

use regex::Regex;

use crate::Validation;

/// A composable predicate over values of type `T`.
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// Check if the value satisfies this predicate.
    fn check(&self, value: &T) -> bool;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    #[inline]
    fn check(&self, value: &T) -> bool {
        self(value)
    }
}

/// Method chaining for predicate combinators.
pub trait PredicateExt<T: ?Sized>: Predicate<T> + Sized {
    /// True only when both predicates are true.
    fn and<P: Predicate<T>>(self, other: P) -> And<Self, P> {
        And(self, other)
    }

    /// Inverts the predicate.
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: ?Sized, P: Predicate<T>> PredicateExt<T> for P {}

/// AND combinator.
#[derive(Clone, Copy, Debug)]
pub struct And<P1, P2>(pub P1, pub P2);

impl<T: ?Sized, P1: Predicate<T>, P2: Predicate<T>> Predicate<T> for And<P1, P2> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value) && self.1.check(value)
    }
}

/// NOT combinator.
#[derive(Clone, Copy, Debug)]
pub struct Not<P>(pub P);

impl<T: ?Sized, P: Predicate<T>> Predicate<T> for Not<P> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        !self.0.check(value)
    }
}

/// Predicate that holds when the text has something besides whitespace.
#[derive(Clone, Copy, Default, Debug)]
pub struct NotBlank;

impl Predicate<str> for NotBlank {
    #[inline]
    fn check(&self, value: &str) -> bool {
        !value.trim().is_empty()
    }
}

/// Text has something besides whitespace.
///
/// ```rust
/// use bites_forms::predicate::*;
///
/// assert!(not_blank().check(" a "));
/// assert!(!not_blank().check("   "));
/// ```
pub fn not_blank() -> NotBlank {
    NotBlank
}

/// Minimum number of characters in the trimmed text.
#[derive(Clone, Copy, Debug)]
pub struct MinChars(pub usize);

impl Predicate<str> for MinChars {
    #[inline]
    fn check(&self, value: &str) -> bool {
        value.trim().chars().count() >= self.0
    }
}

/// Trimmed text has at least `min` characters (not bytes).
///
/// ```rust
/// use bites_forms::predicate::*;
///
/// assert!(min_chars(3).check("  ñoñ "));
/// assert!(!min_chars(3).check("ño"));
/// ```
pub fn min_chars(min: usize) -> MinChars {
    MinChars(min)
}

/// Minimum number of whitespace-separated words.
#[derive(Clone, Copy, Debug)]
pub struct MinWords(pub usize);

impl Predicate<str> for MinWords {
    #[inline]
    fn check(&self, value: &str) -> bool {
        value.split_whitespace().count() >= self.0
    }
}

/// Text has at least `min` words.
pub fn min_words(min: usize) -> MinWords {
    MinWords(min)
}

/// Full-text regex match.
#[derive(Clone, Copy, Debug)]
pub struct Matches<'r>(pub &'r Regex);

impl Predicate<str> for Matches<'_> {
    #[inline]
    fn check(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

/// Text matches `pattern`. Anchor the pattern for whole-value checks.
pub fn matches(pattern: &Regex) -> Matches<'_> {
    Matches(pattern)
}

/// Holds when the text carries characters used for markup or SQL injection.
#[derive(Clone, Copy, Default, Debug)]
pub struct ContainsMarkup;

impl Predicate<str> for ContainsMarkup {
    fn check(&self, value: &str) -> bool {
        value.contains(['<', '>', ';']) || value.contains("--")
    }
}

/// Text contains `<`, `>`, `;` or `--`.
///
/// ```rust
/// use bites_forms::predicate::*;
///
/// assert!(contains_markup().check("<script>"));
/// assert!(contains_markup().check("x' --"));
/// assert!(!contains_markup().check("Bar-Restaurante"));
/// ```
pub fn contains_markup() -> ContainsMarkup {
    ContainsMarkup
}

/// Lift a predicate check into a [`Validation`] carrying `error`.
///
/// ```rust
/// use bites_forms::{Validation, predicate::*};
///
/// let result = validate("Girona", &min_chars(2), "too short");
/// assert_eq!(result, Validation::success("Girona"));
/// ```
pub fn validate<'v, T, E, P>(value: &'v T, predicate: &P, error: E) -> Validation<&'v T, E>
where
    T: ?Sized,
    P: Predicate<T>,
{
    if predicate.check(value) {
        Validation::success(value)
    } else {
        Validation::failure(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_predicate() {
        let has_at = |s: &str| s.contains('@');
        assert!(has_at.check("a@b"));
        assert!(!has_at.check("ab"));
    }

    #[test]
    fn test_combinators() {
        let p = min_chars(2).and(contains_markup().not());
        assert!(p.check("Reus"));
        assert!(!p.check("R"));
        assert!(!p.check("Reus;"));
    }

    #[test]
    fn test_min_chars_counts_characters() {
        // "àéí" is six bytes but three characters.
        assert!(min_chars(3).check("àéí"));
        assert!(!min_chars(4).check("àéí"));
    }

    #[test]
    fn test_min_words_ignores_repeated_whitespace() {
        assert!(min_words(3).check("  uno   dos\ttres "));
        assert!(!min_words(3).check("uno    dos"));
    }

    #[test]
    fn test_matches() {
        let digits = Regex::new(r"^\d+$").unwrap();
        assert!(matches(&digits).check("123"));
        assert!(!matches(&digits).check("12a"));
    }

    #[test]
    fn test_validate_failure() {
        assert_eq!(
            validate("x", &min_chars(2), "too short"),
            Validation::failure("too short")
        );
    }
}
