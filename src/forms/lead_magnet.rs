//! Catalog download form.
//!
//! Stores the lead, then sends the visitor straight to a short-lived signed
//! link for the catalog in their language. There is no confirmation screen:
//! the redirect is the success outcome.

use crate::field::{check, FieldErrors, FieldKind, FieldSpec};
use crate::form::{FormDefinition, FormMessages, FormValues};
use crate::payload::{LeadFields, LeadRecord, PayloadContext};
use crate::submission::Strategy;
use crate::Validation;

const fn field(name: &'static str, kind: FieldKind, invalid_key: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
        reject_markup: true,
        required_key: "leadMagnetForm.errors.required",
        invalid_key,
    }
}

const FULL_NAME: FieldSpec = field("name", FieldKind::PersonName, "leadMagnetForm.errors.invalidName");
const EMAIL: FieldSpec = field("email", FieldKind::Email, "leadMagnetForm.errors.invalidEmail");
const BUSINESS: FieldSpec = field("business", FieldKind::Business, "leadMagnetForm.errors.invalidBusiness");
const CITY: FieldSpec = field("city", FieldKind::Place, "leadMagnetForm.errors.invalidCity");

/// Lead magnet (catalog download) form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadMagnetForm;

impl FormDefinition for LeadMagnetForm {
    type Fields = LeadFields;
    type Payload = LeadRecord;

    const NAME: &'static str = "lead_magnet";
    const FIELDS: &'static [FieldSpec] = &[FULL_NAME, EMAIL, BUSINESS, CITY];
    const MESSAGES: FormMessages = FormMessages {
        form_error: "leadMagnetForm.errors.reviewFields",
        consent_banner: Some("leadMagnetForm.errors.mustAcceptPolicy"),
        consent_error: "leadMagnetForm.consent.error",
        submit_error_prefix: "leadMagnetForm.errors.saveErrorPrefix",
        try_again: "leadMagnetForm.errors.tryAgain",
        already_requested: Some("leadMagnetForm.errors.alreadyRequested"),
        link_error: Some("leadMagnetForm.errors.linkGenerationError"),
        success: "leadMagnetForm.success.message",
        success_title: "leadMagnetForm.success.title",
        close: "policyModal.closeButton",
        submit_idle: "leadMagnetForm.button.idle",
        submitting: "leadMagnetForm.button.submitting",
    };
    const CONSENT_AFTER_FIELDS: bool = true;

    fn strategy(&self) -> Strategy {
        Strategy::InsertThenSign { table: "leads" }
    }

    fn validate(&self, values: &FormValues) -> Validation<LeadFields, FieldErrors> {
        Validation::all((
            check(&FULL_NAME, values.get(FULL_NAME.name)),
            check(&EMAIL, values.get(EMAIL.name)),
            check(&BUSINESS, values.get(BUSINESS.name)),
            check(&CITY, values.get(CITY.name)),
        ))
        .map(|(name, email, business, city)| LeadFields {
            name,
            email,
            business,
            city,
        })
    }

    fn payload(&self, fields: LeadFields, ctx: &PayloadContext) -> LeadRecord {
        LeadRecord::new(fields, ctx)
    }
}
