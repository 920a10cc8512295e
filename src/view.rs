//! What a form shows
//!
//! [`FormView`] is the presentation of a controller's state in the active
//! language: the editable form with its inline errors and banner, the busy
//! form, the confirmation that replaces the form after a stored request,
//! or the redirect to a download.

use url::Url;

use crate::config::SiteConfig;
use crate::form::{FormController, FormDefinition, SubmissionStatus};
use crate::Translator;

/// Confirmation panel shown instead of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Brand logo
    pub logo_url: String,
    /// Heading
    pub title: String,
    /// Body text
    pub message: String,
    /// Dismiss button label
    pub close_label: String,
}

/// Rendered state of one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormView {
    /// The form accepts input
    Editable {
        /// Inline error text per failing field, in field order
        field_errors: Vec<(&'static str, String)>,
        /// Form-level error banner
        banner: Option<String>,
        /// Text under the consent checkbox
        consent_error: Option<String>,
        /// Submit button label
        submit_label: String,
    },
    /// Inputs disabled while the request is in flight
    Busy {
        /// Submit button label
        label: String,
    },
    /// The request was stored
    Confirmation(Confirmation),
    /// Send the visitor to this link
    Redirect(Url),
}

impl<F: FormDefinition> FormController<F> {
    /// Present the current state in `i18n`'s language.
    pub fn view(&self, i18n: &Translator, config: &SiteConfig) -> FormView {
        let messages = F::MESSAGES;
        match self.status() {
            SubmissionStatus::Submitting => FormView::Busy {
                label: i18n.text(messages.submitting),
            },
            SubmissionStatus::Success(message) => FormView::Confirmation(Confirmation {
                logo_url: config.logo_url.clone(),
                title: i18n.text(messages.success_title),
                message: message.clone(),
                close_label: i18n.text(messages.close),
            }),
            SubmissionStatus::RedirectTo(url) => FormView::Redirect(url.clone()),
            SubmissionStatus::Idle | SubmissionStatus::Error(_) => FormView::Editable {
                field_errors: F::FIELDS
                    .iter()
                    .filter_map(|spec| {
                        let error = self.field_error(spec.name)?;
                        Some((spec.name, i18n.text(spec.message_key(error))))
                    })
                    .collect(),
                banner: match self.status() {
                    SubmissionStatus::Error(message) => Some(message.clone()),
                    _ => None,
                },
                consent_error: self
                    .consent()
                    .show_error()
                    .then(|| i18n.text(messages.consent_error)),
                submit_label: i18n.text(messages.submit_idle),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{ContactForm, FreeSampleForm};
    use crate::submission::Outcome;
    use crate::Locale;

    fn config() -> SiteConfig {
        SiteConfig::new(Url::parse("https://p.supabase.co").unwrap(), "anon")
    }

    #[test]
    fn test_fresh_form_is_clean() {
        let form = FormController::new(FreeSampleForm);
        let i18n = Translator::new(Locale::Es);
        assert_eq!(
            form.view(&i18n, &config()),
            FormView::Editable {
                field_errors: vec![],
                banner: None,
                consent_error: None,
                submit_label: "Solicitar muestra gratuita".into(),
            }
        );
    }

    #[test]
    fn test_errors_in_field_order_and_language() {
        let mut form = FormController::new(ContactForm::new("Contacto", "general"));
        let ca = Translator::new(Locale::Ca);
        form.update_field("email", "no-at-sign");
        form.begin_submit(&ca);

        let FormView::Editable {
            field_errors,
            banner,
            consent_error,
            ..
        } = form.view(&ca, &config())
        else {
            panic!("expected editable form");
        };
        let names: Vec<_> = field_errors.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["full_name", "email", "company", "city", "message"]);
        assert_eq!(field_errors[0].1, "Aquest camp és obligatori.");
        assert_eq!(banner, Some(ca.text("contactForm.validation.formError")));
        assert_eq!(consent_error, Some(ca.text("contactForm.consent.error")));
    }

    #[test]
    fn test_busy_then_confirmation() {
        let es = Translator::new(Locale::Es);
        let mut form = FormController::new(ContactForm::new("Contacto", "general"));
        for (name, value) in [
            ("full_name", "Ana López"),
            ("email", "ana@example.com"),
            ("company", "Zumos Ana"),
            ("city", "Madrid"),
            ("message", "Me interesan los productos bulk"),
        ] {
            form.update_field(name, value);
        }
        form.update_consent(true);
        form.begin_submit(&es).unwrap();
        assert_eq!(
            form.view(&es, &config()),
            FormView::Busy {
                label: "Enviando...".into()
            }
        );

        form.complete_submit(Ok(Outcome::Stored), &es);
        let FormView::Confirmation(confirmation) = form.view(&es, &config()) else {
            panic!("expected confirmation");
        };
        assert_eq!(confirmation.title, es.text("contactForm.successModal.title"));
        assert_eq!(confirmation.message, es.text("contactForm.successModal.message"));
        assert_eq!(confirmation.logo_url, config().logo_url);
    }
}
