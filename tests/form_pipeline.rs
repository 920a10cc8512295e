//! End-to-end behavior of the three site forms against the in-memory
//! backend: validation, consent gating, duplicate handling and resets.

use bites_forms::backend::BackendError;
use bites_forms::field::FieldError;
use bites_forms::form::SubmissionStatus;
use bites_forms::forms::{ContactForm, FreeSampleForm, LeadMagnetForm};
use bites_forms::testing::{Call, MockBackend};
use bites_forms::view::FormView;
use bites_forms::{assert_status, FormController, FormDefinition, Locale, SiteConfig, SiteEnv};
use serde_json::json;
use url::Url;

fn env(backend: MockBackend) -> SiteEnv<MockBackend> {
    let config = SiteConfig::new(Url::parse("https://project.supabase.co").unwrap(), "anon");
    SiteEnv::new(backend, config)
}

fn contact() -> FormController<ContactForm> {
    FormController::new(ContactForm::new("Distribuidores", "distributor"))
}

fn fill_contact(form: &mut FormController<ContactForm>) {
    form.update_field("full_name", "Ana Pérez");
    form.update_field("email", "ana@bar.es");
    form.update_field("company", "Bar Ana");
    form.update_field("city", "Girona");
    form.update_field("message", "Queremos distribuir vuestros snacks");
}

fn fill_sample(form: &mut FormController<FreeSampleForm>, email: &str, establishment: &str) {
    form.update_field("full_name", "Jordi Puig");
    form.update_field("email", email);
    form.update_field("establishment_name", establishment);
    form.update_field("establishment_type", "cafe");
    form.update_field("shipping_address", "Carrer Major 1");
    form.update_field("location", "Lleida");
    form.update_consent(true);
}

#[tokio::test]
async fn required_fields_block_submission() {
    let env = env(MockBackend::new());
    let mut form = contact();
    form.update_consent(true);

    let status = form.attempt_submit(&env).await.clone();
    assert_status!(&status, SubmissionStatus::Error(_));

    let required: Vec<&str> = ContactForm::FIELDS
        .iter()
        .filter(|spec| spec.required)
        .map(|spec| spec.name)
        .collect();
    for name in &required {
        assert_eq!(form.field_error(name), Some(FieldError::MissingRequired), "{name}");
    }
    assert_eq!(form.field_error("phone"), None);
    assert!(env.backend.calls().is_empty());
}

#[tokio::test]
async fn short_message_is_rejected() {
    let env = env(MockBackend::new());
    let mut form = contact();
    fill_contact(&mut form);
    form.update_field("message", "Holaaaaaa");
    form.update_consent(true);

    form.attempt_submit(&env).await;
    assert_eq!(form.field_error("message"), Some(FieldError::MessageTooShort));

    form.update_field("message", "Hola, más información");
    form.attempt_submit(&env).await;
    assert_status!(form.status(), SubmissionStatus::Success(_));
}

#[tokio::test]
async fn consent_gates_then_allows_submission() {
    let env = env(MockBackend::new());
    let mut form = contact();
    fill_contact(&mut form);

    form.attempt_submit(&env).await;
    assert!(form.consent().show_error());
    assert!(form.errors().is_empty());
    match form.view(&env.i18n, &env.config) {
        FormView::Editable { consent_error, .. } => {
            assert_eq!(consent_error.as_deref(), Some("Debes aceptar la política de privacidad."));
        }
        other => panic!("expected editable form, got {other:?}"),
    }
    assert!(env.backend.rows("contact_requests").is_empty());

    form.update_consent(true);
    let status = form.attempt_submit(&env).await;
    assert_status!(status, SubmissionStatus::Success(_));

    let rows = env.backend.rows("contact_requests");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["request_type"], json!("distributor"));
    assert_eq!(rows[0]["accepted_privacy_policy"], json!(true));
}

#[tokio::test]
async fn editing_a_field_clears_only_its_error() {
    let env = env(MockBackend::new());
    let mut form = contact();
    form.update_field("email", "not-an-email");
    form.attempt_submit(&env).await;

    assert_eq!(form.field_error("email"), Some(FieldError::InvalidFormat));
    assert_eq!(form.field_error("city"), Some(FieldError::MissingRequired));

    form.update_field("email", "still wrong");
    assert_eq!(form.field_error("email"), None);
    assert_eq!(form.field_error("city"), Some(FieldError::MissingRequired));
    assert_status!(form.status(), SubmissionStatus::Idle);
}

#[tokio::test]
async fn success_resets_the_form() {
    let env = env(MockBackend::new());
    let mut form = contact();
    fill_contact(&mut form);
    form.update_consent(true);

    form.attempt_submit(&env).await;
    assert_status!(form.status(), SubmissionStatus::Success(_));
    assert!(ContactForm::FIELDS.iter().all(|spec| form.values().get(spec.name).is_empty()));
    assert!(!form.consent().accepted());

    form.dismiss();
    assert_status!(form.status(), SubmissionStatus::Idle);
    assert!(form.values().get("full_name").is_empty());
}

#[tokio::test]
async fn duplicate_sample_request_is_refused() {
    let backend = MockBackend::new().with_unique(
        "sample_requests",
        &["email", "establishment_name"],
        "unique_email_establishment",
    );
    let env = env(backend);

    let mut first = FormController::new(FreeSampleForm);
    fill_sample(&mut first, "jordi@cafe.cat", "Cafè Central");
    first.attempt_submit(&env).await;
    assert_status!(first.status(), SubmissionStatus::Success(_));

    // same natural key once normalized
    let mut second = FormController::new(FreeSampleForm);
    fill_sample(&mut second, " Jordi@Cafe.cat ", "CAFÈ CENTRAL");
    second.attempt_submit(&env).await;
    assert_eq!(
        second.status(),
        &SubmissionStatus::Error("Ya has solicitado una muestra para este establecimiento.".into())
    );

    assert_eq!(env.backend.rows("sample_requests").len(), 1);
    assert!(env
        .backend
        .calls()
        .iter()
        .any(|call| matches!(call, Call::FindOne { table, .. } if table == "sample_requests")));
}

#[tokio::test]
async fn concurrent_duplicates_store_one_row() {
    let backend = MockBackend::new().with_unique(
        "sample_requests",
        &["email", "establishment_name"],
        "unique_email_establishment",
    );
    let env = env(backend);

    let mut a = FormController::new(FreeSampleForm);
    let mut b = FormController::new(FreeSampleForm);
    fill_sample(&mut a, "jordi@cafe.cat", "Cafè Central");
    fill_sample(&mut b, "jordi@cafe.cat", "Cafè Central");

    let statuses: [&SubmissionStatus; 2] =
        futures::join!(a.attempt_submit(&env), b.attempt_submit(&env)).into();
    let stored = statuses
        .iter()
        .filter(|s| matches!(s, SubmissionStatus::Success(_)))
        .count();
    let refused = statuses
        .iter()
        .filter(|s| {
            **s == &SubmissionStatus::Error("Ya has solicitado una muestra para este establecimiento.".into())
        })
        .count();
    assert_eq!((stored, refused), (1, 1));
    assert_eq!(env.backend.rows("sample_requests").len(), 1);
}

#[tokio::test]
async fn sample_products_are_capped_and_stored() {
    let env = env(MockBackend::new());
    let mut form = FormController::new(FreeSampleForm);
    fill_sample(&mut form, "jordi@cafe.cat", "Cafè Central");

    assert!(form.toggle_choice("smoothie_green", true));
    assert!(form.toggle_choice("snack_apple", true));
    assert!(form.toggle_choice("snack_mango", true));
    assert!(!form.toggle_choice("bulk_fruit_powder", true));
    assert!(form.toggle_choice("snack_apple", false));
    assert!(!form.toggle_choice("caviar", true));

    form.attempt_submit(&env).await;
    let rows = env.backend.rows("sample_requests");
    assert_eq!(rows[0]["interested_products"], json!(["smoothie_green", "snack_mango"]));
    assert_eq!(rows[0]["establishment_type"], json!("cafe"));
}

#[tokio::test]
async fn lead_magnet_redirects_to_catalog_in_visitor_language() {
    let env = env(MockBackend::new()).with_locale(Locale::Ca);
    let mut form = FormController::new(LeadMagnetForm);
    form.update_field("name", "Marta Vila");
    form.update_field("email", "marta@forn.cat");
    form.update_field("business", "Forn Vila");
    form.update_field("city", "Vic");
    form.update_consent(true);

    let status = form.attempt_submit(&env).await.clone();
    let SubmissionStatus::RedirectTo(url) = status else {
        panic!("expected redirect, got {status:?}");
    };
    assert!(url.path().ends_with("Catalogo_Profesional_2bites_ca.pdf"));

    let rows = env.backend.rows("leads");
    assert_eq!(rows[0]["language"], json!("ca"));
    assert_eq!(rows[0]["unsubscribe_token"].as_str().map(str::len), Some(24));
}

#[tokio::test]
async fn backend_failure_keeps_values_for_retry() {
    let env = env(MockBackend::new());
    env.backend.fail_next_insert(BackendError::Transport("connection reset".into()));
    let mut form = contact();
    fill_contact(&mut form);
    form.update_consent(true);

    form.attempt_submit(&env).await;
    assert_eq!(
        form.status(),
        &SubmissionStatus::Error("No se pudo enviar tu solicitud. Inténtalo de nuevo más tarde.".into())
    );
    assert_eq!(form.values().get("city"), "Girona");

    form.attempt_submit(&env).await;
    assert_status!(form.status(), SubmissionStatus::Success(_));
}
