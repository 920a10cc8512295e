//! Backend-as-a-service seam
//!
//! The forms only need four things from the hosted data store: insert a
//! row, look one up by equality filters, call a remote procedure and sign
//! a storage download link. [`Backend`] names exactly those, so the
//! submission logic runs the same against [`SupabaseClient`] in production
//! and [`MockBackend`](crate::testing::MockBackend) in tests.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use url::Url;

mod supabase;

pub use supabase::SupabaseClient;

/// Postgres SQLSTATE for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Operations the site needs from its hosted backend.
///
/// Every method returns a `Send` future so controllers can be driven from
/// any tokio runtime.
pub trait Backend: Send + Sync {
    /// Insert one row into `table`.
    fn insert(
        &self,
        table: &str,
        row: Value,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// First row of `table` whose columns equal the given values, if any.
    fn find_one(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> impl Future<Output = Result<Option<Value>, BackendError>> + Send;

    /// Call the remote procedure `function` with named arguments.
    fn rpc(
        &self,
        function: &str,
        args: Value,
    ) -> impl Future<Output = Result<Value, BackendError>> + Send;

    /// Time-limited download link for `path` in storage `bucket`.
    fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<Url, BackendError>> + Send;
}

/// Failure reported by a [`Backend`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The service answered with an error body
    #[error("backend returned {status}: {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Postgres or storage error code, when present
        code: Option<String>,
        /// Human-readable message from the service
        message: String,
        /// Extra detail from the service
        details: Option<String>,
    },
    /// The request never got an answer
    #[error("request failed: {0}")]
    Transport(String),
    /// The request could not be built
    #[error("could not encode request: {0}")]
    Encoding(String),
    /// The answer could not be read
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Error code reported by the service.
    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this is a duplicate-key rejection.
    ///
    /// The SQLSTATE code decides when present. Otherwise the message and
    /// details are searched for the constraint name.
    ///
    /// ```
    /// use bites_forms::backend::BackendError;
    ///
    /// let err = BackendError::Api {
    ///     status: 409,
    ///     code: None,
    ///     message: "duplicate key value violates unique constraint \"unique_email_establishment\"".into(),
    ///     details: None,
    /// };
    /// assert!(err.is_unique_violation(Some("unique_email_establishment")));
    /// assert!(!err.is_unique_violation(None));
    /// ```
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        let BackendError::Api {
            code,
            message,
            details,
            ..
        } = self
        else {
            return false;
        };
        if let Some(code) = code {
            return code == UNIQUE_VIOLATION;
        }
        constraint.is_some_and(|name| {
            message.contains(name) || details.as_deref().is_some_and(|d| d.contains(name))
        })
    }

    /// Whether the request failed before the service answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if err.is_builder() {
            BackendError::Encoding(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
