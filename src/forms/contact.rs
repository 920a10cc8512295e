//! General contact form, opened from several places with its own title and
//! request type (distributor enquiry, HORECA enquiry, ...).

use crate::field::{check, FieldErrors, FieldKind, FieldSpec};
use crate::form::{FormDefinition, FormMessages, FormValues};
use crate::payload::{ContactFields, ContactRequest, PayloadContext};
use crate::submission::Strategy;
use crate::validation::ValidateAll;
use crate::Validation;

const REQUIRED: &str = "contactForm.validation.required";

const fn field(name: &'static str, kind: FieldKind, required: bool, invalid_key: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required,
        reject_markup: false,
        required_key: REQUIRED,
        invalid_key,
    }
}

const FULL_NAME: FieldSpec = field("full_name", FieldKind::Name, true, "contactForm.validation.invalidName");
const EMAIL: FieldSpec = field("email", FieldKind::Email, true, "contactForm.validation.invalidEmail");
const COMPANY: FieldSpec = field("company", FieldKind::Text, true, "contactForm.validation.invalidCompany");
const CITY: FieldSpec = field("city", FieldKind::Text, true, "contactForm.validation.invalidCity");
const PHONE: FieldSpec = field("phone", FieldKind::Phone, false, "contactForm.validation.invalidPhone");
const MESSAGE: FieldSpec = field("message", FieldKind::Message, true, "contactForm.validation.messageTooShort");

/// Contact form with the context it was opened from.
///
/// Changing either field is a new form identity; see
/// [`FormController::replace_form`](crate::form::FormController::replace_form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    /// Heading shown above the form
    pub title: String,
    /// Stored with the request to route it internally
    pub request_type: String,
}

impl ContactForm {
    /// Form opened with `title` for requests of `request_type`.
    pub fn new(title: impl Into<String>, request_type: impl Into<String>) -> Self {
        ContactForm {
            title: title.into(),
            request_type: request_type.into(),
        }
    }
}

impl FormDefinition for ContactForm {
    type Fields = ContactFields;
    type Payload = ContactRequest;

    const NAME: &'static str = "contact";
    const FIELDS: &'static [FieldSpec] = &[FULL_NAME, EMAIL, COMPANY, CITY, PHONE, MESSAGE];
    const MESSAGES: FormMessages = FormMessages {
        form_error: "contactForm.validation.formError",
        consent_banner: None,
        consent_error: "contactForm.consent.error",
        submit_error_prefix: "contactForm.submission.submitErrorPrefix",
        try_again: "contactForm.submission.tryAgain",
        already_requested: None,
        link_error: None,
        success: "contactForm.successModal.message",
        success_title: "contactForm.successModal.title",
        close: "contactForm.successModal.close",
        submit_idle: "contactForm.button.idle",
        submitting: "contactForm.button.submitting",
    };

    fn strategy(&self) -> Strategy {
        Strategy::Insert {
            table: "contact_requests",
        }
    }

    fn validate(&self, values: &FormValues) -> Validation<ContactFields, FieldErrors> {
        (
            check(&FULL_NAME, values.get(FULL_NAME.name)),
            check(&EMAIL, values.get(EMAIL.name)),
            check(&COMPANY, values.get(COMPANY.name)),
            check(&CITY, values.get(CITY.name)),
            check(&PHONE, values.get(PHONE.name)),
            check(&MESSAGE, values.get(MESSAGE.name)),
        )
            .validate_all()
            .map(|(full_name, email, company, city, phone, message)| ContactFields {
                full_name,
                email,
                company,
                city,
                phone,
                message,
            })
    }

    fn payload(&self, fields: ContactFields, ctx: &PayloadContext) -> ContactRequest {
        ContactRequest::new(fields, &self.request_type, ctx)
    }
}
