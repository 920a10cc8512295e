//! Builds an unsubscribe link and follows it twice
//!
//! Run with: cargo run --example unsubscribe_link

use bites_forms::payload::unsubscribe_token;
use bites_forms::routing::{detect_locale, Route};
use bites_forms::testing::MockBackend;
use bites_forms::unsubscribe::{unsubscribe, UnsubscribeRequest, UnsubscribeStatus, RPC_FUNCTION};
use bites_forms::{Locale, Translator};
use serde_json::json;
use url::Url;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let request = UnsubscribeRequest {
        email: "marta@forn.cat".to_string(),
        token: unsubscribe_token(),
    };
    let site = Url::parse("https://2bitesco.com/ca").expect("static URL");
    let link = request.link(&site);
    println!("Link: {}", link);
    println!("Route: {:?}", Route::parse(&link[url::Position::BeforePath..]));

    // The page has no locale segment; fall back to the browser's language
    let locale = detect_locale(link.path(), ["ca-ES", "es"], Locale::Es);
    let i18n = Translator::new(locale);

    let backend = MockBackend::new();
    backend.rpc_returns(RPC_FUNCTION, Ok(json!(["success"])));
    backend.rpc_returns(RPC_FUNCTION, Ok(json!(["invalid_or_already_unsubscribed"])));

    println!("{}", UnsubscribeStatus::loading(&i18n).message());
    for _ in 0..2 {
        let status = unsubscribe(&backend, &i18n, link.query().unwrap_or_default()).await;
        match status {
            UnsubscribeStatus::Success(message) => println!("✓ {}", message),
            other => println!("✗ {}", other.message()),
        }
    }

    let broken = unsubscribe(&backend, &i18n, "email=marta%40forn.cat").await;
    println!("✗ {}", broken.message());
}
