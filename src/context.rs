//! Backend errors with an operation trail
//!
//! A failed submission is logged with the steps that led to it ("looking up
//! an earlier sample request", "submitting sample request"), while the user
//! only ever sees a short catalog message. `ContextError` keeps the
//! original error plus that trail.
//!
//! ```
//! use bites_forms::context::{ContextError, ResultExt};
//!
//! let failed: Result<(), &str> = Err("connection reset");
//! let err = failed
//!     .context("inserting into leads")
//!     .map_err(|e| e.context("submitting lead magnet form"))
//!     .unwrap_err();
//!
//! assert_eq!(err.inner(), &"connection reset");
//! assert_eq!(
//!     err.to_string(),
//!     "connection reset\n  -> inserting into leads\n  -> submitting lead magnet form"
//! );
//! ```

use std::error::Error as StdError;
use std::fmt;

/// An error together with the operations that were running when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextError<E> {
    error: E,
    trail: Vec<String>,
}

impl<E> ContextError<E> {
    /// Wrap an error with an empty trail.
    pub fn new(error: E) -> Self {
        ContextError {
            error,
            trail: Vec::new(),
        }
    }

    /// Append an operation, innermost first.
    pub fn context(mut self, operation: impl Into<String>) -> Self {
        self.trail.push(operation.into());
        self
    }

    /// The wrapped error.
    pub fn inner(&self) -> &E {
        &self.error
    }

    /// Unwrap, discarding the trail.
    pub fn into_inner(self) -> E {
        self.error
    }

    /// Operations recorded so far, innermost first.
    pub fn trail(&self) -> &[String] {
        &self.trail
    }
}

impl<E: fmt::Display> fmt::Display for ContextError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        for operation in &self.trail {
            write!(f, "\n  -> {operation}")?;
        }
        Ok(())
    }
}

impl<E: StdError + 'static> StdError for ContextError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

/// Attach context to the error side of a `Result`.
pub trait ResultExt<T, E> {
    /// Wrap the error in a [`ContextError`] naming `operation`.
    fn context(self, operation: impl Into<String>) -> Result<T, ContextError<E>>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn context(self, operation: impl Into<String>) -> Result<T, ContextError<E>> {
        self.map_err(|error| ContextError::new(error).context(operation))
    }
}
