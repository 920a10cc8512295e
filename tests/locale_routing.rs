//! Property-based tests for locale switching and route resolution

use bites_forms::routing::{switch_locale, Page, Route};
use bites_forms::Locale;
use proptest::prelude::*;

fn locale() -> impl Strategy<Value = Locale> {
    prop::sample::select(Locale::ALL.to_vec())
}

fn page() -> impl Strategy<Value = Page> {
    prop_oneof![
        Just(Page::Home),
        Just(Page::InstantSmoothies),
        Just(Page::Snacks),
        Just(Page::Bulk),
        Just(Page::LegalNotice),
        Just(Page::PrivacyPolicy),
        Just(Page::Receipt { slug: None }),
        "[a-z0-9-]{1,20}".prop_map(|slug| Page::Receipt { slug: Some(slug) }),
    ]
}

proptest! {
    #[test]
    fn prop_switch_keeps_rest_of_path(
        from in locale(),
        to in locale(),
        rest in prop::collection::vec("[a-z0-9-]{1,12}", 0..4),
    ) {
        let tail = rest.join("/");
        let path = if tail.is_empty() { format!("/{from}") } else { format!("/{from}/{tail}") };

        let switched = switch_locale(&path, to);
        let expected = if tail.is_empty() { format!("/{to}") } else { format!("/{to}/{tail}") };
        prop_assert_eq!(switched, expected);
    }

    #[test]
    fn prop_switch_moves_page_between_locales(from in locale(), to in locale(), page in page()) {
        let route = Route::Localized { locale: from, page: page.clone() };
        let path = route.path().unwrap();

        prop_assert_eq!(
            Route::parse(&switch_locale(&path, to)),
            Route::Localized { locale: to, page }
        );
    }

    #[test]
    fn prop_switch_is_idempotent(to in locale(), path in "(/[a-z0-9-]{1,8}){0,4}") {
        let once = switch_locale(&path, to);
        prop_assert_eq!(switch_locale(&once, to), once.clone());
        let prefix = format!("/{to}");
        prop_assert!(once.starts_with(&prefix));
    }

    #[test]
    fn prop_query_and_fragment_survive(
        from in locale(),
        to in locale(),
        query in "[a-z]{1,6}=[a-z0-9]{1,6}",
        fragment in "[a-z]{0,6}",
    ) {
        let path = format!("/{from}/aviso-legal?{query}#{fragment}");
        prop_assert_eq!(
            switch_locale(&path, to),
            format!("/{to}/aviso-legal?{query}#{fragment}")
        );
    }

    #[test]
    fn prop_unknown_first_segment_is_not_found(segment in "[a-z]{3,10}", rest in "(/[a-z]{1,6}){0,2}") {
        prop_assume!(segment != "unsubscribe");
        let path = format!("/{segment}{rest}");
        prop_assert_eq!(Route::parse(&path), Route::NotFound);
    }
}
