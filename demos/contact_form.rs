//! Walks the contact and sample forms through a submit cycle
//!
//! Run with: cargo run --example contact_form
//!
//! Uses the Supabase project in `SUPABASE_URL` / `SUPABASE_ANON_KEY` when
//! both are set, the in-memory backend otherwise.

use bites_forms::backend::Backend;
use bites_forms::forms::{ContactForm, FreeSampleForm};
use bites_forms::testing::MockBackend;
use bites_forms::view::FormView;
use bites_forms::{FormController, Locale, SiteConfig, SiteEnv};
use url::Url;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    match SiteConfig::from_env() {
        Ok(config) => match SiteEnv::connect(config) {
            Ok(env) => run(&env).await,
            Err(e) => tracing::error!("Could not build client: {}", e),
        },
        Err(e) => {
            tracing::info!("{}; using the in-memory backend", e);
            let config = SiteConfig::new(
                Url::parse("https://project.supabase.co").expect("static URL"),
                "anon",
            );
            let backend = MockBackend::new().with_unique(
                "sample_requests",
                &["email", "establishment_name"],
                "unique_email_establishment",
            );
            run(&SiteEnv::new(backend, config)).await;
        }
    }
}

async fn run<B: Backend + Clone>(env: &SiteEnv<B>) {
    let env_ca = env.with_locale(Locale::Ca);

    println!("=== Contact form ===\n");
    let mut contact = FormController::new(ContactForm::new("Distribuidores", "distributor"))
        .on_submitted(|| tracing::info!("contact request stored"));

    // Everything wrong at once
    contact.update_field("email", "ana-at-bar");
    contact.update_field("message", "Hola");
    contact.attempt_submit(&env_ca).await;
    show(&contact.view(&env_ca.i18n, &env_ca.config));

    // Fix the fields but forget the checkbox
    contact.update_field("full_name", "Ana Pérez");
    contact.update_field("email", "ana@bar.cat");
    contact.update_field("company", "Bar Ana");
    contact.update_field("city", "Girona");
    contact.update_field("message", "Voldríem distribuir els vostres snacks");
    contact.attempt_submit(&env_ca).await;
    show(&contact.view(&env_ca.i18n, &env_ca.config));

    contact.update_consent(true);
    contact.attempt_submit(&env_ca).await;
    show(&contact.view(&env_ca.i18n, &env_ca.config));

    println!("\n=== Free sample form, submitted twice ===\n");
    for attempt in 1..=2 {
        let mut sample = FormController::new(FreeSampleForm);
        sample.update_field("full_name", "Jordi Puig");
        sample.update_field("email", "jordi@cafe.cat");
        sample.update_field("establishment_name", "Cafè Central");
        sample.update_field("establishment_type", "cafe");
        sample.update_field("shipping_address", "Carrer Major 1");
        sample.update_field("location", "Lleida");
        sample.toggle_choice("smoothie_green", true);
        sample.update_consent(true);
        sample.attempt_submit(env).await;
        print!("attempt {attempt}: ");
        show(&sample.view(&env.i18n, &env.config));
    }
}

fn show(view: &FormView) {
    match view {
        FormView::Editable {
            field_errors,
            banner,
            consent_error,
            ..
        } => {
            if let Some(banner) = banner {
                println!("✗ {}", banner);
            }
            for (field, message) in field_errors {
                println!("    {}: {}", field, message);
            }
            if let Some(consent) = consent_error {
                println!("    consent: {}", consent);
            }
        }
        FormView::Busy { label } => println!("… {}", label),
        FormView::Confirmation(confirmation) => {
            println!("✓ {} {}", confirmation.title, confirmation.message)
        }
        FormView::Redirect(url) => println!("→ {}", url),
    }
}
