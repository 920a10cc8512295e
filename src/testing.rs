//! Testing utilities
//!
//! [`MockBackend`] is an in-memory stand-in for the hosted backend with
//! unique constraints, queued failures, canned RPC answers and a call log.
//! The assertion macros shorten the checks that form tests repeat.
//!
//! ```rust
//! use bites_forms::{Validation, assert_success, assert_failure};
//!
//! let success = Validation::<_, Vec<String>>::success(42);
//! assert_success!(success);
//!
//! let failure = Validation::<i32, _>::failure(vec!["error".to_string()]);
//! assert_failure!(failure);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::{json, Value};
use url::Url;

use crate::backend::{Backend, BackendError, UNIQUE_VIOLATION};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `insert` into a table
    Insert {
        /// Table name
        table: String,
    },
    /// `find_one` on a table
    FindOne {
        /// Table name
        table: String,
        /// Equality filters
        filters: Vec<(String, String)>,
    },
    /// `rpc` call
    Rpc {
        /// Procedure name
        function: String,
        /// Arguments
        args: Value,
    },
    /// `signed_url` request
    SignedUrl {
        /// Storage bucket
        bucket: String,
        /// Object path
        path: String,
        /// Requested lifetime
        ttl: Duration,
    },
}

#[derive(Debug)]
struct Unique {
    table: String,
    columns: Vec<String>,
    name: String,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, Vec<Value>>,
    unique: Vec<Unique>,
    insert_failures: VecDeque<BackendError>,
    find_failures: VecDeque<BackendError>,
    sign_failures: VecDeque<BackendError>,
    rpc_answers: BTreeMap<String, VecDeque<Result<Value, BackendError>>>,
    calls: Vec<Call>,
}

/// In-memory [`Backend`].
///
/// Clones share state, so a test can keep one handle for inspection while
/// the code under test owns another.
///
/// ```rust
/// use bites_forms::backend::Backend;
/// use bites_forms::testing::MockBackend;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let backend = MockBackend::new().with_unique("leads", &["email"], "leads_email_key");
/// backend.insert("leads", json!({"email": "a@b.co"})).await.unwrap();
///
/// let err = backend.insert("leads", json!({"email": "a@b.co"})).await.unwrap_err();
/// assert_eq!(err.code(), Some("23505"));
/// assert_eq!(backend.rows("leads").len(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
    signing_base: Url,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Empty store with no constraints.
    pub fn new() -> Self {
        MockBackend {
            state: Arc::default(),
            signing_base: Url::parse("https://storage.test/storage/v1/")
                .unwrap_or_else(|_| unreachable!("literal URL parses")),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reject inserts into `table` that repeat `columns` of an existing row.
    pub fn with_unique(self, table: &str, columns: &[&str], name: &str) -> Self {
        self.state().unique.push(Unique {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            name: name.to_string(),
        });
        self
    }

    /// Base that signed links are resolved against.
    pub fn with_signing_base(mut self, base: Url) -> Self {
        self.signing_base = base;
        self
    }

    /// Make the next `insert` fail with `error`.
    pub fn fail_next_insert(&self, error: BackendError) {
        self.state().insert_failures.push_back(error);
    }

    /// Make the next `find_one` fail with `error`.
    pub fn fail_find(&self, error: BackendError) {
        self.state().find_failures.push_back(error);
    }

    /// Make the next `signed_url` fail with `error`.
    pub fn fail_signed_url(&self, error: BackendError) {
        self.state().sign_failures.push_back(error);
    }

    /// Queue an answer for the next call of `function`.
    pub fn rpc_returns(&self, function: &str, answer: Result<Value, BackendError>) {
        self.state()
            .rpc_answers
            .entry(function.to_string())
            .or_default()
            .push_back(answer);
    }

    /// Rows stored in `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }
}

fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl Backend for MockBackend {
    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.calls.push(Call::Insert {
            table: table.to_string(),
        });
        if let Some(error) = state.insert_failures.pop_front() {
            return Err(error);
        }

        let existing = state.tables.get(table).map(Vec::as_slice).unwrap_or_default();
        for unique in state.unique.iter().filter(|u| u.table == table) {
            let key: Vec<_> = unique.columns.iter().map(|c| column_text(&row, c)).collect();
            let clash = existing.iter().any(|other| {
                unique
                    .columns
                    .iter()
                    .zip(&key)
                    .all(|(column, value)| value.is_some() && column_text(other, column) == *value)
            });
            if clash {
                return Err(BackendError::Api {
                    status: 409,
                    code: Some(UNIQUE_VIOLATION.to_string()),
                    message: format!(
                        "duplicate key value violates unique constraint \"{}\"",
                        unique.name
                    ),
                    details: Some(format!("Key ({}) already exists.", unique.columns.join(", "))),
                });
            }
        }

        state.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn find_one(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Option<Value>, BackendError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.calls.push(Call::FindOne {
            table: table.to_string(),
            filters: filters
                .iter()
                .map(|(c, v)| (c.to_string(), v.to_string()))
                .collect(),
        });
        if let Some(error) = state.find_failures.pop_front() {
            return Err(error);
        }

        let rows = state.tables.get(table).map(Vec::as_slice).unwrap_or_default();
        Ok(rows
            .iter()
            .position(|row| {
                filters
                    .iter()
                    .all(|(column, value)| column_text(row, column).as_deref() == Some(*value))
            })
            .map(|index| json!({ "id": index + 1 })))
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.calls.push(Call::Rpc {
            function: function.to_string(),
            args,
        });
        state
            .rpc_answers
            .get_mut(function)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(BackendError::Api {
                    status: 404,
                    code: Some("PGRST202".into()),
                    message: format!("Could not find the function public.{function}"),
                    details: None,
                })
            })
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        ttl: Duration,
    ) -> Result<Url, BackendError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.calls.push(Call::SignedUrl {
            bucket: bucket.to_string(),
            path: path.to_string(),
            ttl,
        });
        if let Some(error) = state.sign_failures.pop_front() {
            return Err(error);
        }
        let mut url = self
            .signing_base
            .join(&format!("object/sign/{bucket}/{path}"))
            .map_err(|e| BackendError::Encoding(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("token", &format!("mock-{}", ttl.as_secs()));
        Ok(url)
    }
}

/// Assert that a validation is `Success`.
#[macro_export]
macro_rules! assert_success {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Success(_) => {}
            $crate::Validation::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that a validation is `Failure`.
#[macro_export]
macro_rules! assert_failure {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Failure(_) => {}
            $crate::Validation::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that a validation failed on exactly the given fields.
///
/// ```rust
/// use bites_forms::assert_validation_errors;
/// use bites_forms::field::{FieldError, FieldErrors};
/// use bites_forms::Validation;
///
/// let v = Validation::<(), _>::failure(FieldErrors::single("email", FieldError::InvalidFormat));
/// assert_validation_errors!(v, ["email"]);
/// ```
#[macro_export]
macro_rules! assert_validation_errors {
    ($validation:expr, [$($field:expr),* $(,)?]) => {
        match $validation {
            $crate::Validation::Failure(errors) => {
                let failing: Vec<&str> = errors.iter().map(|(name, _)| name).collect();
                let mut expected: Vec<&str> = vec![$($field),*];
                expected.sort_unstable();
                assert_eq!(failing, expected);
            }
            $crate::Validation::Success(v) => {
                panic!(
                    "Expected Failure on {:?}, got Success: {:?}",
                    [$($field),*], v
                );
            }
        }
    };
}

/// Assert that a controller status matches a pattern.
///
/// ```rust
/// use bites_forms::assert_status;
/// use bites_forms::form::SubmissionStatus;
///
/// let status = SubmissionStatus::Error("Revisa el formulario".into());
/// assert_status!(&status, SubmissionStatus::Error(_));
/// ```
#[macro_export]
macro_rules! assert_status {
    ($status:expr, $pattern:pat) => {
        match $status {
            $pattern => {}
            other => panic!(
                "Expected status {}, got {:?}",
                stringify!($pattern),
                other
            ),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldError, FieldErrors};
    use crate::form::SubmissionStatus;
    use crate::Validation;

    #[tokio::test]
    async fn test_find_one_by_equality() {
        let backend = MockBackend::new();
        backend
            .insert("t", json!({"email": "a@b.co", "name": "bar"}))
            .await
            .unwrap();
        backend
            .insert("t", json!({"email": "c@d.co", "name": "bar"}))
            .await
            .unwrap();

        let found = backend
            .find_one("t", &[("email", "c@d.co"), ("name", "bar")])
            .await
            .unwrap();
        assert_eq!(found, Some(json!({"id": 2})));
        assert_eq!(
            backend.find_one("t", &[("email", "x@y.co")]).await.unwrap(),
            None
        );
        assert_eq!(backend.find_one("empty", &[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unique_ignores_null_columns() {
        let backend = MockBackend::new().with_unique("t", &["phone"], "t_phone_key");
        backend.insert("t", json!({"phone": null})).await.unwrap();
        backend.insert("t", json!({"phone": null})).await.unwrap();
        assert_eq!(backend.rows("t").len(), 2);
    }

    #[tokio::test]
    async fn test_queued_failures_are_consumed_once() {
        let backend = MockBackend::new();
        backend.fail_next_insert(BackendError::Transport("reset".into()));

        assert!(backend.insert("t", json!({})).await.is_err());
        assert!(backend.insert("t", json!({})).await.is_ok());
        assert_eq!(
            backend.calls(),
            vec![
                Call::Insert { table: "t".into() },
                Call::Insert { table: "t".into() }
            ]
        );
    }

    #[tokio::test]
    async fn test_rpc_answers_in_order() {
        let backend = MockBackend::new();
        backend.rpc_returns("f", Ok(json!("success")));

        assert_eq!(backend.rpc("f", json!({})).await, Ok(json!("success")));
        let err = backend.rpc("f", json!({})).await.unwrap_err();
        assert_eq!(err.code(), Some("PGRST202"));
    }

    #[tokio::test]
    async fn test_signed_url_carries_ttl() {
        let backend = MockBackend::new();
        let url = backend
            .signed_url("catalogos", "c_es.pdf", Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.test/storage/v1/object/sign/catalogos/c_es.pdf?token=mock-300"
        );
    }

    #[test]
    fn assert_success_macro() {
        let val = Validation::<_, Vec<String>>::success(42);
        assert_success!(val);
    }

    #[test]
    fn assert_validation_errors_macro() {
        let errors: FieldErrors = [
            ("phone", FieldError::InvalidFormat),
            ("email", FieldError::MissingRequired),
        ]
        .into_iter()
        .collect();
        assert_validation_errors!(Validation::<(), _>::failure(errors), ["phone", "email"]);
    }

    #[test]
    #[should_panic(expected = "Expected Failure, got Success")]
    fn assert_failure_panics_on_success() {
        let val = Validation::<_, Vec<String>>::success(42);
        assert_failure!(val);
    }

    #[test]
    #[should_panic(expected = "Expected status")]
    fn assert_status_panics_on_mismatch() {
        assert_status!(&SubmissionStatus::Idle, SubmissionStatus::Submitting);
    }
}
