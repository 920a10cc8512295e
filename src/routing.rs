//! Locale routing
//!
//! Every page lives under a two-letter locale segment (`/ca/aviso-legal`).
//! The bare root redirects to the detected locale and `/unsubscribe` is the
//! only page without a locale, since its links are sent by email.
//!
//! Switching language rewrites the leading locale segment and keeps the
//! rest of the path:
//!
//! ```
//! use bites_forms::routing::switch_locale;
//! use bites_forms::Locale;
//!
//! assert_eq!(
//!     switch_locale("/es/productos/snacks-naturales", Locale::Ca),
//!     "/ca/productos/snacks-naturales"
//! );
//! assert_eq!(switch_locale("/", Locale::Ca), "/ca");
//! ```

use crate::Locale;

/// A localized page of the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    /// Landing page
    Home,
    /// Instant smoothies product page
    InstantSmoothies,
    /// Natural snacks product page
    Snacks,
    /// Bulk / HORECA product page
    Bulk,
    /// Legal notice
    LegalNotice,
    /// Privacy policy
    PrivacyPolicy,
    /// Recipe page; the static one has no slug
    Receipt {
        /// Recipe identifier
        slug: Option<String>,
    },
}

impl Page {
    /// Path below the locale segment, without leading slash.
    pub fn path(&self) -> String {
        match self {
            Page::Home => String::new(),
            Page::InstantSmoothies => "productos/smoothies-instantaneos".into(),
            Page::Snacks => "productos/snacks-naturales".into(),
            Page::Bulk => "productos/bulk-horeca".into(),
            Page::LegalNotice => "aviso-legal".into(),
            Page::PrivacyPolicy => "politica-de-privacidad".into(),
            Page::Receipt { slug: None } => "receipt".into(),
            Page::Receipt { slug: Some(slug) } => format!("receipts/{slug}"),
        }
    }

    fn from_segments(segments: &[&str]) -> Option<Page> {
        let page = match segments {
            [] => Page::Home,
            ["productos", "smoothies-instantaneos"] => Page::InstantSmoothies,
            ["productos", "snacks-naturales"] => Page::Snacks,
            ["productos", "bulk-horeca"] => Page::Bulk,
            ["aviso-legal"] => Page::LegalNotice,
            ["politica-de-privacidad"] => Page::PrivacyPolicy,
            ["receipt"] => Page::Receipt { slug: None },
            ["receipts", slug] => Page::Receipt {
                slug: Some(slug.to_string()),
            },
            _ => return None,
        };
        Some(page)
    }
}

/// Where a request path leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, redirected to the detected locale
    Root,
    /// A page in a given language
    Localized {
        /// Language of the page
        locale: Locale,
        /// The page
        page: Page,
    },
    /// Language-agnostic unsubscribe page
    Unsubscribe,
    /// Anything else, including unsupported locale segments
    NotFound,
}

fn split_path(path: &str) -> (&str, &str) {
    match path.find(['?', '#']) {
        Some(index) => path.split_at(index),
        None => (path, ""),
    }
}

impl Route {
    /// Resolve a request path. Query strings and fragments are ignored.
    ///
    /// ```
    /// use bites_forms::routing::{Page, Route};
    /// use bites_forms::Locale;
    ///
    /// assert_eq!(
    ///     Route::parse("/ca/receipts/smoothie-bowl"),
    ///     Route::Localized { locale: Locale::Ca, page: Page::Receipt { slug: Some("smoothie-bowl".into()) } }
    /// );
    /// assert_eq!(Route::parse("/unsubscribe?email=a@b.co&token=x"), Route::Unsubscribe);
    /// assert_eq!(Route::parse("/fr/aviso-legal"), Route::NotFound);
    /// ```
    pub fn parse(path: &str) -> Route {
        let (path, _) = split_path(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Root,
            ["unsubscribe"] => Route::Unsubscribe,
            [code, rest @ ..] => match Locale::from_code(code) {
                Some(locale) => Page::from_segments(rest)
                    .map(|page| Route::Localized { locale, page })
                    .unwrap_or(Route::NotFound),
                None => Route::NotFound,
            },
        }
    }

    /// Canonical path of the route; `None` for [`Route::NotFound`].
    pub fn path(&self) -> Option<String> {
        match self {
            Route::Root => Some("/".into()),
            Route::Unsubscribe => Some("/unsubscribe".into()),
            Route::Localized { locale, page } => {
                let rest = page.path();
                Some(if rest.is_empty() {
                    format!("/{locale}")
                } else {
                    format!("/{locale}/{rest}")
                })
            }
            Route::NotFound => None,
        }
    }

    /// Language the route is in, if it has one.
    pub fn locale(&self) -> Option<Locale> {
        match self {
            Route::Localized { locale, .. } => Some(*locale),
            _ => None,
        }
    }
}

/// Rewrite `path` into `target`'s language.
///
/// A leading supported locale segment is replaced; otherwise `target` is
/// prefixed. The remainder of the path, query and fragment are kept.
pub fn switch_locale(path: &str, target: Locale) -> String {
    let (path, suffix) = split_path(path);
    let trimmed = path.trim_start_matches('/');
    let rest = match trimmed.split_once('/') {
        Some((first, rest)) if Locale::from_code(first).is_some() => Some(rest),
        None if Locale::from_code(trimmed).is_some() => None,
        _ if trimmed.is_empty() => None,
        _ => Some(trimmed),
    };
    match rest {
        Some(rest) => format!("/{target}/{rest}{suffix}"),
        None => format!("/{target}{suffix}"),
    }
}

/// Target of the root redirect.
pub fn root_redirect(detected: Locale) -> String {
    format!("/{detected}")
}

/// Pick the visitor's language: the path's locale segment first, then
/// each candidate tag in order (cookie, stored preference, browser
/// languages), then `fallback`.
///
/// ```
/// use bites_forms::routing::{accept_language, detect_locale};
/// use bites_forms::Locale;
///
/// let browser = accept_language("fr-FR, ca-ES;q=0.8, es;q=0.5");
/// assert_eq!(detect_locale("/", browser, Locale::Es), Locale::Ca);
/// assert_eq!(detect_locale("/es/aviso-legal", ["ca"], Locale::Es), Locale::Es);
/// ```
pub fn detect_locale<'a>(
    path: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    fallback: Locale,
) -> Locale {
    Route::parse(path)
        .locale()
        .or_else(|| candidates.into_iter().find_map(Locale::parse))
        .unwrap_or(fallback)
}

/// Language tags of an `Accept-Language` header, in header order.
pub fn accept_language(header: &str) -> impl Iterator<Item = &str> {
    header
        .split(',')
        .map(|entry| entry.split(';').next().unwrap_or_default().trim())
        .filter(|tag| !tag.is_empty() && *tag != "*")
}
