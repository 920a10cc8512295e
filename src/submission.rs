//! Submission client
//!
//! Turns a validated payload into exactly one logical backend operation and
//! classifies what came back. The three site forms use three strategies:
//!
//! - [`Strategy::Insert`]: store the row, surface any failure
//! - [`Strategy::Deduplicated`]: look up the natural key first and refuse
//!   duplicates, also when the insert loses a race and hits the unique
//!   constraint
//! - [`Strategy::InsertThenSign`]: store the row, then sign a download link
//!   for the catalog in the visitor's language and hand it back as a
//!   redirect
//!
//! Backend details are logged here with the operation trail. Callers only
//! see the classification in [`SubmitError`].

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, debug_span, error, info, warn, Instrument};
use url::Url;

use crate::backend::{Backend, BackendError};
use crate::config::SiteConfig;
use crate::context::{ContextError, ResultExt};
use crate::Locale;

/// How a form's payload is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Plain insert
    Insert {
        /// Target table
        table: &'static str,
    },
    /// Insert unless a row with the same natural key exists
    Deduplicated {
        /// Target table
        table: &'static str,
        /// Columns forming the natural key
        key: &'static [&'static str],
        /// Name of the unique constraint over `key`
        constraint: &'static str,
    },
    /// Insert, then sign the localized catalog for download
    InsertThenSign {
        /// Target table
        table: &'static str,
    },
}

impl Strategy {
    /// Table the payload goes to.
    pub fn table(&self) -> &'static str {
        match self {
            Strategy::Insert { table }
            | Strategy::Deduplicated { table, .. }
            | Strategy::InsertThenSign { table } => table,
        }
    }
}

/// A submission that went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The row is stored
    Stored,
    /// The row is stored and the visitor should be sent to this link
    Redirect(Url),
}

/// A submission that did not go through.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// The same request was already made
    #[error("request already submitted")]
    AlreadyRequested,
    /// The row was stored but the download link could not be signed
    #[error("could not generate download link: {0}")]
    LinkGeneration(ContextError<BackendError>),
    /// Any other backend failure
    #[error("submission failed: {0}")]
    Backend(ContextError<BackendError>),
}

impl SubmitError {
    /// Underlying backend error, if any.
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            SubmitError::AlreadyRequested => None,
            SubmitError::LinkGeneration(err) | SubmitError::Backend(err) => Some(err.inner()),
        }
    }
}

/// File name of the catalog for `locale`.
///
/// ```
/// use bites_forms::{submission::catalog_file_name, Locale};
///
/// assert_eq!(
///     catalog_file_name("Catalogo_Profesional_2bites", Locale::Ca),
///     "Catalogo_Profesional_2bites_ca.pdf"
/// );
/// ```
pub fn catalog_file_name(prefix: &str, locale: Locale) -> String {
    format!("{prefix}_{locale}.pdf")
}

/// Runs one [`Strategy`] against a [`Backend`].
#[derive(Debug)]
pub struct SubmissionClient<'a, B> {
    backend: &'a B,
    config: &'a SiteConfig,
}

impl<'a, B: Backend> SubmissionClient<'a, B> {
    /// Client over `backend`, signing links as `config` says.
    pub fn new(backend: &'a B, config: &'a SiteConfig) -> Self {
        SubmissionClient { backend, config }
    }

    /// Store `payload` according to `strategy`.
    pub async fn submit<P>(
        &self,
        strategy: &Strategy,
        payload: &P,
        locale: Locale,
    ) -> Result<Outcome, SubmitError>
    where
        P: Serialize + ?Sized,
    {
        let table = strategy.table();
        let span = debug_span!("submit", table, %locale);

        let row = serde_json::to_value(payload)
            .map_err(|e| BackendError::Encoding(e.to_string()))
            .context(format!("encoding row for {table}"))
            .map_err(SubmitError::Backend)?;

        let result = match *strategy {
            Strategy::Insert { table } => self.insert(table, row).instrument(span).await,
            Strategy::Deduplicated {
                table,
                key,
                constraint,
            } => {
                self.insert_unique(table, row, key, constraint)
                    .instrument(span)
                    .await
            }
            Strategy::InsertThenSign { table } => {
                self.insert_then_sign(table, row, locale)
                    .instrument(span)
                    .await
            }
        };

        match &result {
            Ok(_) => info!(table, "submission stored"),
            Err(SubmitError::AlreadyRequested) => info!(table, "duplicate submission refused"),
            Err(err) => error!(table, error = ?err, "submission failed"),
        }
        result
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Outcome, SubmitError> {
        self.backend
            .insert(table, row)
            .await
            .context(format!("inserting into {table}"))
            .map_err(SubmitError::Backend)?;
        Ok(Outcome::Stored)
    }

    async fn insert_unique(
        &self,
        table: &str,
        row: Value,
        key: &[&str],
        constraint: &str,
    ) -> Result<Outcome, SubmitError> {
        let mut filters = Vec::with_capacity(key.len());
        for column in key {
            let value = row
                .get(*column)
                .and_then(Value::as_str)
                .ok_or_else(|| BackendError::Encoding(format!("row has no text column {column}")))
                .context(format!("building duplicate check for {table}"))
                .map_err(SubmitError::Backend)?;
            filters.push((*column, value.to_string()));
        }
        let filters: Vec<(&str, &str)> = filters.iter().map(|(c, v)| (*c, v.as_str())).collect();

        let existing = self
            .backend
            .find_one(table, &filters)
            .await
            .context(format!("looking up existing row in {table}"))
            .map_err(SubmitError::Backend)?;
        if existing.is_some() {
            debug!(table, "natural key already present");
            return Err(SubmitError::AlreadyRequested);
        }

        match self.backend.insert(table, row).await {
            Ok(()) => Ok(Outcome::Stored),
            Err(err) if err.is_unique_violation(Some(constraint)) => {
                warn!(table, constraint, "insert lost a race with an identical request");
                Err(SubmitError::AlreadyRequested)
            }
            Err(err) => Err(SubmitError::Backend(
                ContextError::new(err).context(format!("inserting into {table}")),
            )),
        }
    }

    async fn insert_then_sign(
        &self,
        table: &str,
        row: Value,
        locale: Locale,
    ) -> Result<Outcome, SubmitError> {
        match self.backend.insert(table, row).await {
            Ok(()) => {}
            Err(err) if err.is_unique_violation(None) => return Err(SubmitError::AlreadyRequested),
            Err(err) => {
                return Err(SubmitError::Backend(
                    ContextError::new(err).context(format!("inserting into {table}")),
                ))
            }
        }

        let file = catalog_file_name(&self.config.catalog_prefix, locale);
        let url = self
            .backend
            .signed_url(
                &self.config.catalog_bucket,
                &file,
                self.config.signed_url_ttl(),
            )
            .await
            .context(format!("signing {file}"))
            .map_err(SubmitError::LinkGeneration)?;
        Ok(Outcome::Redirect(url))
    }
}
