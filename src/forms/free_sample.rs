//! Free sample request form for hospitality businesses.
//!
//! One sample per email and establishment: the natural key is checked
//! before inserting and enforced by the `unique_email_establishment`
//! constraint on `sample_requests`.

use crate::field::{check, FieldError, FieldErrors, FieldKind, FieldSpec};
use crate::form::{FormDefinition, FormMessages, FormValues};
use crate::payload::{PayloadContext, SampleFields, SampleRequest};
use crate::submission::Strategy;
use crate::validation::ValidateAll;
use crate::Validation;

/// Establishment type ids; labels live under
/// `freeSampleForm.data.establishmentTypes.<id>`.
pub const ESTABLISHMENT_TYPES: &[&str] = &[
    "restaurant",
    "cafe",
    "hotel",
    "catering",
    "gym",
    "school",
    "other",
];

/// Product ids offered in the sample; labels live under
/// `freeSampleForm.data.productOptions.<id>`.
pub const PRODUCT_OPTIONS: &[&str] = &[
    "smoothie_tropical",
    "smoothie_red_berries",
    "smoothie_green",
    "snack_apple",
    "snack_strawberry",
    "snack_mango",
    "bulk_fruit_powder",
];

const REQUIRED: &str = "freeSampleForm.validation.required";

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

const FULL_NAME: FieldSpec = field("full_name", FieldKind::Name, true, "freeSampleForm.validation.invalidName");
const EMAIL: FieldSpec = field("email", FieldKind::Email, true, "freeSampleForm.validation.invalidEmail");
const PHONE: FieldSpec = field("phone", FieldKind::Phone, false, "freeSampleForm.validation.invalidPhone");
const ESTABLISHMENT_NAME: FieldSpec =
    field("establishment_name", FieldKind::Text, true, "freeSampleForm.validation.invalidName");
const ESTABLISHMENT_TYPE: FieldSpec = FieldSpec {
    required_key: "freeSampleForm.validation.selectType",
    ..field("establishment_type", FieldKind::Choice, true, "freeSampleForm.validation.selectType")
};
const SHIPPING_ADDRESS: FieldSpec =
    field("shipping_address", FieldKind::Text, true, "freeSampleForm.validation.invalidAddress");
/// Key of product selection errors, named after the stored column.
const PRODUCTS: &str = "interested_products";

const LOCATION: FieldSpec = field("location", FieldKind::Text, true, "freeSampleForm.validation.invalidLocation");

/// Free sample request form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeSampleForm;

fn known_product(id: &str) -> Validation<String, FieldErrors> {
    let known = PRODUCT_OPTIONS
        .iter()
        .find(|option| **option == id)
        .map(|option| option.to_string());
    Validation::from_result(
        known.ok_or_else(|| FieldErrors::single(PRODUCTS, FieldError::InvalidFormat)),
    )
}

fn known_type(id: String) -> Validation<String, FieldErrors> {
    if ESTABLISHMENT_TYPES.contains(&id.as_str()) {
        Validation::success(id)
    } else {
        Validation::failure(FieldErrors::single(
            ESTABLISHMENT_TYPE.name,
            FieldError::InvalidFormat,
        ))
    }
}

impl FormDefinition for FreeSampleForm {
    type Fields = SampleFields;
    type Payload = SampleRequest;

    const NAME: &'static str = "free_sample";
    const FIELDS: &'static [FieldSpec] = &[
        FULL_NAME,
        EMAIL,
        PHONE,
        ESTABLISHMENT_NAME,
        ESTABLISHMENT_TYPE,
        SHIPPING_ADDRESS,
        LOCATION,
    ];
    const MESSAGES: FormMessages = FormMessages {
        form_error: "freeSampleForm.validation.formError",
        consent_banner: None,
        consent_error: "freeSampleForm.consent.error",
        submit_error_prefix: "freeSampleForm.submission.submitErrorPrefix",
        try_again: "freeSampleForm.submission.tryAgain",
        already_requested: Some("freeSampleForm.submission.alreadyRequested"),
        link_error: None,
        success: "freeSampleForm.successModal.message",
        success_title: "freeSampleForm.successModal.title",
        close: "freeSampleForm.successModal.close",
        submit_idle: "freeSampleForm.button.idle",
        submitting: "freeSampleForm.button.submitting",
    };
    const CHOICES: &'static [&'static str] = PRODUCT_OPTIONS;
    const MAX_CHOICES: usize = 3;

    fn strategy(&self) -> Strategy {
        Strategy::Deduplicated {
            table: "sample_requests",
            key: &["email", "establishment_name"],
            constraint: "unique_email_establishment",
        }
    }

    fn validate(&self, values: &FormValues) -> Validation<SampleFields, FieldErrors> {
        (
            check(&FULL_NAME, values.get(FULL_NAME.name)),
            check(&EMAIL, values.get(EMAIL.name)),
            check(&PHONE, values.get(PHONE.name)),
            check(&ESTABLISHMENT_NAME, values.get(ESTABLISHMENT_NAME.name)),
            check(&ESTABLISHMENT_TYPE, values.get(ESTABLISHMENT_TYPE.name)).and_then(known_type),
            check(&SHIPPING_ADDRESS, values.get(SHIPPING_ADDRESS.name)),
            check(&LOCATION, values.get(LOCATION.name)),
            Validation::all_vec(
                values
                    .choices()
                    .iter()
                    .map(String::as_str)
                    .map(known_product)
                    .collect(),
            ),
        )
            .validate_all()
            .map(
                |(
                    full_name,
                    email,
                    phone,
                    establishment_name,
                    establishment_type,
                    shipping_address,
                    location,
                    products,
                )| {
                    SampleFields {
                        full_name,
                        email,
                        phone,
                        establishment_name,
                        establishment_type,
                        shipping_address,
                        location,
                        products,
                    }
                },
            )
    }

    fn payload(&self, fields: SampleFields, ctx: &PayloadContext) -> SampleRequest {
        SampleRequest::new(fields, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_validation_errors, Locale, Translator};

    fn valid() -> FormValues {
        let mut values = FormValues::blank(FreeSampleForm::FIELDS);
        for (name, value) in [
            ("full_name", "Marta Soler"),
            ("email", "Marta@CafeSoler.cat"),
            ("establishment_name", "Cafè Soler"),
            ("establishment_type", "cafe"),
            ("shipping_address", "Carrer de la Pau 3"),
            ("location", "Manresa"),
        ] {
            values.set(name, value);
        }
        values
    }

    #[test]
    fn test_unknown_establishment_type() {
        let mut values = valid();
        values.set("establishment_type", "spaceship");
        let result = FreeSampleForm.validate(&values);
        assert_validation_errors!(result.clone(), ["establishment_type"]);
        let Validation::Failure(errors) = result else {
            unreachable!()
        };
        assert_eq!(errors.get("establishment_type"), Some(FieldError::InvalidFormat));
    }

    #[test]
    fn test_missing_type_asks_to_select() {
        let mut values = valid();
        values.set("establishment_type", "");
        let Validation::Failure(errors) = FreeSampleForm.validate(&values) else {
            unreachable!()
        };
        let key = FreeSampleForm::field("establishment_type")
            .map(|spec| spec.message_key(errors.get("establishment_type").unwrap()));
        assert_eq!(key, Some("freeSampleForm.validation.selectType"));
    }

    #[test]
    fn test_unknown_product_is_reported() {
        let mut values = valid();
        values.toggle_choice("snack_apple", true, FreeSampleForm::MAX_CHOICES);
        values.toggle_choice("caviar", true, FreeSampleForm::MAX_CHOICES);
        values.set("location", "");
        let Validation::Failure(errors) = FreeSampleForm.validate(&values) else {
            unreachable!()
        };
        assert_eq!(errors.get("interested_products"), Some(FieldError::InvalidFormat));
        assert_eq!(errors.get("location"), Some(FieldError::MissingRequired));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_payload_keeps_ids_and_products() {
        let mut values = valid();
        values.toggle_choice("snack_mango", true, FreeSampleForm::MAX_CHOICES);
        let Validation::Success(fields) = FreeSampleForm.validate(&values) else {
            unreachable!()
        };
        let row = FreeSampleForm.payload(fields, &PayloadContext::accepted(Locale::Es));
        assert_eq!(row.establishment_type, "cafe");
        assert_eq!(row.establishment_name, "cafè soler");
        assert_eq!(row.email, "marta@cafesoler.cat");
        assert_eq!(row.interested_products, Some(vec!["snack_mango".to_string()]));
    }

    #[test]
    fn test_every_option_has_a_label() {
        for locale in Locale::ALL {
            let t = Translator::new(locale);
            for id in ESTABLISHMENT_TYPES {
                let key = format!("freeSampleForm.data.establishmentTypes.{id}");
                assert_ne!(t.text(&key), key);
            }
            for id in PRODUCT_OPTIONS {
                let key = format!("freeSampleForm.data.productOptions.{id}");
                assert_ne!(t.text(&key), key);
            }
        }
    }
}
