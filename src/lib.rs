//! # bites-forms
//!
//! The form pipeline behind the 2bites website: contact requests, free
//! sample requests and the catalog download, plus the unsubscribe link
//! those emails carry.
//!
//! ## Layout
//!
//! The crate keeps a **pure core** and an **imperative shell**:
//! - Core: field validators, accumulated [`Validation`], payload building,
//!   the [`FormController`] state machine and locale routing. None of it
//!   performs I/O.
//! - Shell: a [`Backend`](backend::Backend) implementation (the Supabase
//!   REST client, or [`MockBackend`](testing::MockBackend) in tests) reached
//!   through one [`SiteEnv`].
//!
//! ## Quick Example
//!
//! ```rust
//! use bites_forms::forms::ContactForm;
//! use bites_forms::form::SubmissionStatus;
//! use bites_forms::testing::MockBackend;
//! use bites_forms::{FormController, SiteConfig, SiteEnv};
//! use url::Url;
//!
//! # tokio_test::block_on(async {
//! let config = SiteConfig::new(Url::parse("https://project.supabase.co").unwrap(), "anon");
//! let env = SiteEnv::new(MockBackend::new(), config);
//!
//! let mut form = FormController::new(ContactForm::new("Distribuidores", "distributor"));
//! form.update_field("full_name", "Ana Pérez");
//! form.update_field("email", "ana@bar.es");
//! form.update_field("company", "Bar Ana");
//! form.update_field("city", "Girona");
//! form.update_field("message", "Queremos distribuir vuestros snacks");
//! form.update_consent(true);
//!
//! let status = form.attempt_submit(&env).await;
//! assert!(matches!(status, SubmissionStatus::Success(_)));
//! assert_eq!(env.backend.rows("contact_requests").len(), 1);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod backend;
pub mod config;
pub mod consent;
pub mod context;
pub mod env;
pub mod field;
pub mod form;
pub mod forms;
pub mod i18n;
pub mod payload;
pub mod predicate;
pub mod routing;
pub mod semigroup;
pub mod submission;
pub mod testing;
pub mod unsubscribe;
pub mod validation;
pub mod view;

// Re-exports
pub use config::{ConfigError, SiteConfig};
pub use context::ContextError;
pub use env::SiteEnv;
pub use form::{FormController, FormDefinition, SubmissionStatus};
pub use i18n::{Locale, Translator};
pub use semigroup::Semigroup;
pub use validation::Validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{Backend, BackendError, SupabaseClient};
    pub use crate::config::SiteConfig;
    pub use crate::context::{ContextError, ResultExt};
    pub use crate::env::SiteEnv;
    pub use crate::field::{FieldError, FieldErrors};
    pub use crate::form::{FormController, FormDefinition, SubmissionStatus};
    pub use crate::forms::{ContactForm, FreeSampleForm, LeadMagnetForm};
    pub use crate::i18n::{Locale, Translator};
    pub use crate::routing::{switch_locale, Route};
    pub use crate::semigroup::Semigroup;
    pub use crate::submission::{Outcome, SubmitError};
    pub use crate::unsubscribe::{unsubscribe, UnsubscribeStatus};
    pub use crate::validation::{ValidateAll, Validation};
    pub use crate::view::FormView;
}
