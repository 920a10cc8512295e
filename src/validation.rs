//! Validation type for accumulating field errors
//!
//! `Validation` looks like `Result`, but combining two failures merges their
//! errors instead of keeping only the first. A form is validated by running
//! every field check and combining the results, so the user sees every
//! problem after one submit attempt.
//!
//! # Examples
//!
//! ```
//! use bites_forms::validation::ValidateAll;
//! use bites_forms::Validation;
//!
//! let name = Validation::<_, Vec<&str>>::success("Marta");
//! let email = Validation::<&str, _>::failure(vec!["email"]);
//! let phone = Validation::<&str, _>::failure(vec!["phone"]);
//!
//! let all = (name, email, phone).validate_all();
//! assert_eq!(all, Validation::Failure(vec!["email", "phone"]));
//! ```

use crate::Semigroup;

/// A validation that either succeeds with a value or fails with accumulated errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E> {
    /// Successful validation with a value
    Success(T),
    /// Failed validation with accumulated errors
    Failure(E),
}

impl<T, E> Validation<T, E> {
    /// Create a successful validation
    #[inline]
    pub fn success(value: T) -> Self {
        Validation::Success(value)
    }

    /// Create a failed validation
    #[inline]
    pub fn failure(error: E) -> Self {
        Validation::Failure(error)
    }

    /// Create a validation from a `Result`
    ///
    /// ```
    /// use bites_forms::Validation;
    ///
    /// let v = Validation::from_result("42".parse::<u8>().map_err(|_| "not a number"));
    /// assert_eq!(v, Validation::Success(42));
    /// ```
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Validation::Success(value),
            Err(error) => Validation::Failure(error),
        }
    }

    /// Convert this validation into a `Result`
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(error),
        }
    }

    /// Check if this validation is successful
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Validation::Success(_))
    }

    /// Check if this validation failed
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Validation::Failure(_))
    }

    /// Transform the success value if present
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Validation::Success(value) => Validation::Success(f(value)),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }

    /// Transform the error value if present
    #[inline]
    pub fn map_err<E2, F>(self, f: F) -> Validation<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Validation::Success(value) => Validation::Success(value),
            Validation::Failure(error) => Validation::Failure(f(error)),
        }
    }
}

impl<T, E: Semigroup> Validation<T, E> {
    /// Combine two validations, accumulating errors from both sides.
    ///
    /// ```
    /// use bites_forms::Validation;
    ///
    /// let v1 = Validation::<i32, _>::failure(vec!["name"]);
    /// let v2 = Validation::<i32, _>::failure(vec!["city"]);
    /// assert_eq!(v1.and(v2), Validation::Failure(vec!["name", "city"]));
    /// ```
    pub fn and<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        match (self, other) {
            (Validation::Success(a), Validation::Success(b)) => Validation::Success((a, b)),
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
            (Validation::Failure(e), _) | (_, Validation::Failure(e)) => Validation::Failure(e),
        }
    }

    /// Chain a dependent validation; `f` only runs on success.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> Validation<U, E>,
    {
        match self {
            Validation::Success(value) => f(value),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }

    /// Combine a list of validations of the same type.
    ///
    /// ```
    /// use bites_forms::Validation;
    ///
    /// let checks = vec![
    ///     Validation::<_, Vec<&str>>::success(1),
    ///     Validation::failure(vec!["two"]),
    ///     Validation::failure(vec!["three"]),
    /// ];
    /// assert_eq!(Validation::all_vec(checks), Validation::Failure(vec!["two", "three"]));
    /// ```
    pub fn all_vec(validations: Vec<Validation<T, E>>) -> Validation<Vec<T>, E> {
        let mut successes = Vec::with_capacity(validations.len());
        let mut errors: Option<E> = None;

        for validation in validations {
            match validation {
                Validation::Success(value) => successes.push(value),
                Validation::Failure(error) => {
                    errors = Some(match errors.take() {
                        Some(acc) => acc.combine(error),
                        None => error,
                    });
                }
            }
        }

        match errors {
            Some(error) => Validation::Failure(error),
            None => Validation::Success(successes),
        }
    }

    /// Combine a tuple of validations with possibly different value types.
    ///
    /// Same as calling [`ValidateAll::validate_all`] on the tuple.
    ///
    /// ```
    /// use bites_forms::Validation;
    ///
    /// let city = Validation::<_, Vec<&str>>::success("Olot");
    /// let phone = Validation::<u32, _>::failure(vec!["phone"]);
    /// assert_eq!(Validation::all((city, phone)), Validation::Failure(vec!["phone"]));
    /// ```
    pub fn all<V>(validations: V) -> Self
    where
        V: ValidateAll<E, Output = T>,
    {
        validations.validate_all()
    }
}

/// Combine every validation in a tuple, accumulating all failures.
pub trait ValidateAll<E: Semigroup> {
    /// Tuple of success values
    type Output;

    /// Run the combination
    fn validate_all(self) -> Validation<Self::Output, E>;
}

macro_rules! impl_validate_all {
    ($($T:ident),+) => {
        impl<E: Semigroup, $($T),+> ValidateAll<E> for ($(Validation<$T, E>,)+) {
            type Output = ($($T,)+);

            #[allow(non_snake_case)]
            fn validate_all(self) -> Validation<Self::Output, E> {
                let ($($T,)+) = self;
                let mut errors: Option<E> = None;
                $(
                    let $T = match $T {
                        Validation::Success(value) => Some(value),
                        Validation::Failure(error) => {
                            errors = Some(match errors.take() {
                                Some(acc) => acc.combine(error),
                                None => error,
                            });
                            None
                        }
                    };
                )+
                if let Some(error) = errors {
                    return Validation::Failure(error);
                }
                match ($($T,)+) {
                    ($(Some($T),)+) => Validation::Success(($($T,)+)),
                    _ => unreachable!("no failure was recorded"),
                }
            }
        }
    };
}

impl_validate_all!(T1);
impl_validate_all!(T1, T2);
impl_validate_all!(T1, T2, T3);
impl_validate_all!(T1, T2, T3, T4);
impl_validate_all!(T1, T2, T3, T4, T5);
impl_validate_all!(T1, T2, T3, T4, T5, T6);
impl_validate_all!(T1, T2, T3, T4, T5, T6, T7);
impl_validate_all!(T1, T2, T3, T4, T5, T6, T7, T8);
