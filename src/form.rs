//! Form state controller
//!
//! One [`FormController`] owns the whole mutable state of one form
//! instance: field values, per-field errors, the consent checkbox and the
//! [`SubmissionStatus`]. What differs between the site forms (fields,
//! validation, payload, storage strategy, message keys) lives in a
//! [`FormDefinition`].
//!
//! Submitting is split in two halves around the backend call so the state
//! machine stays synchronous and testable:
//!
//! ```text
//! Idle/Error --begin_submit--> Error            (invalid fields or no consent)
//! Idle/Error --begin_submit--> Submitting       (payload handed out)
//! Submitting --complete_submit--> Success | RedirectTo | Error
//! Success --dismiss--> Idle
//! ```
//!
//! [`FormController::attempt_submit`] runs both halves with one backend
//! call in between.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::backend::{Backend, BackendError};
use crate::consent::ConsentState;
use crate::env::SiteEnv;
use crate::field::{FieldError, FieldErrors, FieldSpec};
use crate::payload::PayloadContext;
use crate::submission::{Outcome, Strategy, SubmissionClient, SubmitError};
use crate::{Translator, Validation};

/// Current raw input of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    fields: BTreeMap<&'static str, String>,
    choices: Vec<String>,
}

impl FormValues {
    /// Every field of `specs` set to the empty string.
    pub fn blank(specs: &[FieldSpec]) -> Self {
        FormValues {
            fields: specs.iter().map(|spec| (spec.name, String::new())).collect(),
            choices: Vec::new(),
        }
    }

    /// Value of `field`; empty for unknown fields.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or_default()
    }

    /// Overwrite a field. Returns false for a field the form does not have.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Selected options of the form's multi-select, in selection order.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Select or deselect `option`, keeping at most `max` selected.
    ///
    /// Returns whether the selection changed.
    ///
    /// ```
    /// use bites_forms::form::FormValues;
    ///
    /// let mut values = FormValues::default();
    /// assert!(values.toggle_choice("snack_apple", true, 1));
    /// assert!(!values.toggle_choice("snack_mango", true, 1));
    /// assert!(values.toggle_choice("snack_apple", false, 1));
    /// assert!(values.choices().is_empty());
    /// ```
    pub fn toggle_choice(&mut self, option: &str, checked: bool, max: usize) -> bool {
        let position = self.choices.iter().position(|c| c == option);
        match (checked, position) {
            (true, None) if self.choices.len() < max => {
                self.choices.push(option.to_string());
                true
            }
            (false, Some(index)) => {
                self.choices.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Empty every field and the selection.
    pub fn clear(&mut self) {
        self.fields.values_mut().for_each(String::clear);
        self.choices.clear();
    }
}

/// Where a form is in its submit cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Editable, nothing to report
    #[default]
    Idle,
    /// Waiting for the backend
    Submitting,
    /// Stored; the confirmation message
    Success(String),
    /// Rejected locally or by the backend; the form-level message
    Error(String),
    /// Stored; the visitor is sent to this link
    RedirectTo(Url),
}

impl SubmissionStatus {
    /// Whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }
}

/// Catalog keys a form shows outside its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormMessages {
    /// Banner when fields are invalid
    pub form_error: &'static str,
    /// Banner when only consent is missing; `form_error` when `None`
    pub consent_banner: Option<&'static str>,
    /// Inline text under the consent checkbox
    pub consent_error: &'static str,
    /// Prefix of backend failure banners
    pub submit_error_prefix: &'static str,
    /// Suffix when the backend gave no usable message
    pub try_again: &'static str,
    /// Banner for a duplicate request
    pub already_requested: Option<&'static str>,
    /// Banner when the download link could not be created
    pub link_error: Option<&'static str>,
    /// Confirmation message
    pub success: &'static str,
    /// Confirmation title
    pub success_title: &'static str,
    /// Confirmation dismiss label
    pub close: &'static str,
    /// Submit button label
    pub submit_idle: &'static str,
    /// Submit button label while waiting
    pub submitting: &'static str,
}

/// What makes one site form different from another.
pub trait FormDefinition: Send + Sync {
    /// Validated, trimmed field values
    type Fields;
    /// Row sent to the backend
    type Payload: Serialize + Send + Sync + fmt::Debug;

    /// Name used in logs.
    const NAME: &'static str;
    /// Text fields in display order.
    const FIELDS: &'static [FieldSpec];
    /// Form-level message keys.
    const MESSAGES: FormMessages;
    /// Options of the multi-select, if the form has one.
    const CHOICES: &'static [&'static str] = &[];
    /// Maximum number of selected options.
    const MAX_CHOICES: usize = 0;
    /// Flag the consent checkbox only once every field passes.
    const CONSENT_AFTER_FIELDS: bool = false;

    /// How the payload is stored.
    fn strategy(&self) -> Strategy;

    /// Check every field, reporting all failures at once.
    fn validate(&self, values: &FormValues) -> Validation<Self::Fields, FieldErrors>;

    /// Build the backend row from validated values.
    fn payload(&self, fields: Self::Fields, ctx: &PayloadContext) -> Self::Payload;

    /// Definition of the field called `name`.
    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|spec| spec.name == name)
    }
}

type Callback = Box<dyn FnMut() + Send>;

/// State of one form instance.
pub struct FormController<F: FormDefinition> {
    form: F,
    values: FormValues,
    errors: FieldErrors,
    consent: ConsentState,
    status: SubmissionStatus,
    on_submitted: Option<Callback>,
    on_dismiss: Option<Callback>,
}

impl<F: FormDefinition + fmt::Debug> fmt::Debug for FormController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("form", &self.form)
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("consent", &self.consent)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<F: FormDefinition> FormController<F> {
    /// Blank controller for `form`.
    pub fn new(form: F) -> Self {
        FormController {
            form,
            values: FormValues::blank(F::FIELDS),
            errors: FieldErrors::new(),
            consent: ConsentState::default(),
            status: SubmissionStatus::Idle,
            on_submitted: None,
            on_dismiss: None,
        }
    }

    /// Run `callback` after every accepted submission.
    pub fn on_submitted(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_submitted = Some(Box::new(callback));
        self
    }

    /// Run `callback` when the confirmation is dismissed.
    pub fn on_dismiss(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_dismiss = Some(Box::new(callback));
        self
    }

    /// The form definition.
    pub fn form(&self) -> &F {
        &self.form
    }

    /// Current input.
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Errors from the last submit attempt still on screen.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error shown for `field`, if any.
    pub fn field_error(&self, field: &str) -> Option<FieldError> {
        self.errors.get(field)
    }

    /// Consent checkbox state.
    pub fn consent(&self) -> &ConsentState {
        &self.consent
    }

    /// Submit cycle state.
    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Whether a submission is in flight; inputs are disabled.
    pub fn is_submitting(&self) -> bool {
        self.status.is_submitting()
    }

    fn leave_error(&mut self) {
        if matches!(self.status, SubmissionStatus::Error(_)) {
            self.status = SubmissionStatus::Idle;
        }
    }

    /// Overwrite a field value.
    ///
    /// Clears that field's error without re-validating, and clears the
    /// form-level error since the visitor is correcting the form.
    pub fn update_field(&mut self, field: &str, value: impl Into<String>) {
        if self.is_submitting() {
            return;
        }
        if !self.values.set(field, value) {
            debug!(form = F::NAME, field, "ignoring update of unknown field");
            return;
        }
        self.errors.clear(field);
        self.leave_error();
    }

    /// Select or deselect a multi-select option.
    ///
    /// Unknown options and selections past the form's limit are refused.
    pub fn toggle_choice(&mut self, option: &str, checked: bool) -> bool {
        if self.is_submitting() || !F::CHOICES.contains(&option) {
            return false;
        }
        let changed = self.values.toggle_choice(option, checked, F::MAX_CHOICES);
        if changed {
            self.leave_error();
        }
        changed
    }

    /// Tick or untick the policy checkbox.
    pub fn update_consent(&mut self, accepted: bool) {
        if self.is_submitting() {
            return;
        }
        self.consent.set(accepted);
        if accepted {
            self.leave_error();
        }
    }

    /// First half of a submit: validate and gate on consent.
    ///
    /// Returns the payload to send and moves to `Submitting`, or records
    /// the errors and moves to `Error` without touching the backend.
    /// Does nothing while a submission is in flight.
    pub fn begin_submit(&mut self, i18n: &Translator) -> Option<F::Payload> {
        if self.is_submitting() {
            debug!(form = F::NAME, "submit ignored while submitting");
            return None;
        }

        let validation = self.form.validate(&self.values);
        let consented = if F::CONSENT_AFTER_FIELDS && validation.is_failure() {
            self.consent.accepted()
        } else {
            self.consent.require()
        };
        let messages = F::MESSAGES;

        match validation {
            Validation::Failure(errors) => {
                debug!(form = F::NAME, failing = errors.len(), consented, "validation failed");
                self.errors = errors;
                self.status = SubmissionStatus::Error(i18n.text(messages.form_error));
                None
            }
            Validation::Success(_) if !consented => {
                debug!(form = F::NAME, "consent missing");
                self.errors = FieldErrors::new();
                let banner = messages.consent_banner.unwrap_or(messages.form_error);
                self.status = SubmissionStatus::Error(i18n.text(banner));
                None
            }
            Validation::Success(fields) => {
                self.errors = FieldErrors::new();
                self.status = SubmissionStatus::Submitting;
                let ctx = PayloadContext::accepted(i18n.locale());
                Some(self.form.payload(fields, &ctx))
            }
        }
    }

    /// Second half of a submit: apply the backend's answer.
    ///
    /// Accepted submissions clear the form and the consent and run the
    /// `on_submitted` callback. Failures keep the input.
    pub fn complete_submit(&mut self, result: Result<Outcome, SubmitError>, i18n: &Translator) {
        if !self.is_submitting() {
            warn!(form = F::NAME, "submission result arrived while not submitting");
            return;
        }
        let messages = F::MESSAGES;

        self.status = match result {
            Ok(outcome) => {
                self.values.clear();
                self.errors = FieldErrors::new();
                self.consent.reset();
                if let Some(callback) = self.on_submitted.as_mut() {
                    callback();
                }
                match outcome {
                    Outcome::Stored => SubmissionStatus::Success(i18n.text(messages.success)),
                    Outcome::Redirect(url) => SubmissionStatus::RedirectTo(url),
                }
            }
            Err(SubmitError::AlreadyRequested) => SubmissionStatus::Error(match messages.already_requested {
                Some(key) => i18n.text(key),
                None => failure_banner(&messages, None, i18n),
            }),
            Err(SubmitError::LinkGeneration(_)) => SubmissionStatus::Error(
                i18n.text(messages.link_error.unwrap_or(messages.form_error)),
            ),
            Err(SubmitError::Backend(err)) => {
                SubmissionStatus::Error(failure_banner(&messages, Some(err.inner()), i18n))
            }
        };
    }

    /// Validate, submit through `env` and apply the answer.
    pub async fn attempt_submit<B: Backend>(&mut self, env: &SiteEnv<B>) -> &SubmissionStatus {
        if let Some(payload) = self.begin_submit(&env.i18n) {
            let client = SubmissionClient::new(&env.backend, &env.config);
            let result = client
                .submit(&self.form.strategy(), &payload, env.i18n.locale())
                .await;
            self.complete_submit(result, &env.i18n);
        }
        &self.status
    }

    /// Close the confirmation and return to a blank form.
    pub fn dismiss(&mut self) {
        if matches!(self.status, SubmissionStatus::Success(_)) {
            self.status = SubmissionStatus::Idle;
            if let Some(callback) = self.on_dismiss.as_mut() {
                callback();
            }
        }
    }

    /// Back to a blank, idle form.
    pub fn reset(&mut self) {
        self.values = FormValues::blank(F::FIELDS);
        self.errors = FieldErrors::new();
        self.consent.reset();
        self.status = SubmissionStatus::Idle;
    }

    /// Swap the form definition; a different identity starts from scratch.
    pub fn replace_form(&mut self, form: F)
    where
        F: PartialEq,
    {
        if self.form != form {
            self.form = form;
            self.reset();
        }
    }
}

// "{prefix} {detail}": the service's own message when it sent one,
// otherwise the generic retry hint.
fn failure_banner(messages: &FormMessages, err: Option<&BackendError>, i18n: &Translator) -> String {
    let detail = match err {
        Some(BackendError::Api { message, .. }) if !message.trim().is_empty() => message.clone(),
        _ => i18n.text(messages.try_again),
    };
    format!("{} {}", i18n.text(messages.submit_error_prefix), detail)
}
