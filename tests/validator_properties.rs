//! Property-based tests for the field validators

use bites_forms::field::{FieldError, FieldKind, FieldSpec};
use bites_forms::form::{FormDefinition, FormValues};
use bites_forms::forms::ContactForm;
use bites_forms::Validation;
use proptest::prelude::*;

const KINDS: [FieldKind; 9] = [
    FieldKind::Name,
    FieldKind::Text,
    FieldKind::Email,
    FieldKind::Phone,
    FieldKind::Message,
    FieldKind::Choice,
    FieldKind::PersonName,
    FieldKind::Place,
    FieldKind::Business,
];

const VALID_CONTACT: [(&str, &str); 6] = [
    ("full_name", "Ana Pérez"),
    ("email", "ana@bar.es"),
    ("company", "Bar Ana"),
    ("city", "Girona"),
    ("phone", "+34 600 000 000"),
    ("message", "Queremos más información"),
];

fn guarded(kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name: "field",
        kind,
        required: true,
        reject_markup: true,
        required_key: "required",
        invalid_key: "invalid",
    }
}

proptest! {
    #[test]
    fn prop_blank_required_is_missing(blank in "[ \t\n]{0,6}", kind in prop::sample::select(KINDS.to_vec())) {
        prop_assert_eq!(kind.validate(&blank, true), Some(FieldError::MissingRequired));
        prop_assert_eq!(kind.validate(&blank, false), None);
    }

    #[test]
    fn prop_email_without_at_is_rejected(local in "[a-z0-9._]{1,20}") {
        prop_assert_eq!(FieldKind::Email.validate(&local, true), Some(FieldError::InvalidFormat));
    }

    #[test]
    fn prop_email_without_domain_dot_is_rejected(local in "[a-z0-9]{1,10}", host in "[a-z]{0,10}") {
        let email = format!("{local}@{host}");
        prop_assert_eq!(FieldKind::Email.validate(&email, true), Some(FieldError::InvalidFormat));
    }

    #[test]
    fn prop_well_formed_email_passes(
        local in "[a-z0-9._+]{1,12}",
        host in "[a-z0-9-]{1,12}",
        tld in "[a-z]{2,4}",
    ) {
        let email = format!(" {local}@{host}.{tld} ");
        prop_assert_eq!(FieldKind::Email.validate(&email, true), None);
    }

    #[test]
    fn prop_single_word_message_is_too_short(word in "[a-zA-Z]{1,40}") {
        prop_assert_eq!(FieldKind::Message.validate(&word, true), Some(FieldError::MessageTooShort));
    }

    #[test]
    fn prop_long_enough_message_passes(words in prop::collection::vec("[a-zñç]{3,8}", 3..8)) {
        let message = words.join(" ");
        prop_assert_eq!(FieldKind::Message.validate(&message, true), None);
    }

    #[test]
    fn prop_markup_is_rejected_when_guarded(
        prefix in "[a-zA-Z ]{1,10}",
        marker in prop::sample::select(vec!["<", ">", ";", "--"]),
        suffix in "[a-zA-Z ]{0,10}",
        kind in prop::sample::select(KINDS.to_vec()),
    ) {
        let value = format!("{prefix}{marker}{suffix}");
        prop_assert!(guarded(kind).validate(&value).is_some());
    }

    #[test]
    fn prop_contact_errors_name_every_blank_required_field(filled in prop::collection::vec(any::<bool>(), 6)) {
        let mut values = FormValues::blank(ContactForm::FIELDS);
        for ((name, value), keep) in VALID_CONTACT.iter().zip(&filled) {
            if *keep {
                values.set(name, *value);
            }
        }

        let form = ContactForm::new("Contacto", "general");
        let mut expected: Vec<&str> = VALID_CONTACT
            .iter()
            .zip(&filled)
            .filter(|((name, _), keep)| !**keep && *name != "phone")
            .map(|((name, _), _)| *name)
            .collect();
        expected.sort_unstable();

        match form.validate(&values) {
            Validation::Success(_) => prop_assert!(expected.is_empty()),
            Validation::Failure(errors) => {
                let failing: Vec<&str> = errors.iter().map(|(name, _)| name).collect();
                prop_assert_eq!(failing, expected);
                prop_assert!(errors.iter().all(|(_, e)| e == FieldError::MissingRequired));
            }
        }
    }
}
