//! Locales and the translation catalog
//!
//! The site speaks Spanish and Catalan. Every user-facing string produced by
//! this crate comes from a JSON catalog looked up by a dotted key
//! (`contactForm.validation.required`). The catalog is passed around as an
//! explicit [`Translator`] handle rather than living in a global.
//!
//! Lookup order: active locale, then Spanish, then the key itself, so a
//! missing translation shows up as its key instead of an empty string.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// A supported site language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locale {
    /// Spanish, the fallback language
    #[default]
    Es,
    /// Catalan
    Ca,
}

impl Locale {
    /// Every supported locale, in switcher order.
    pub const ALL: [Locale; 2] = [Locale::Es, Locale::Ca];

    /// Two-letter code used in URLs and stored with submissions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::Ca => "ca",
        }
    }

    /// Parse a language tag, ignoring case and region (`ca-ES` is Catalan).
    ///
    /// ```
    /// use bites_forms::Locale;
    ///
    /// assert_eq!(Locale::parse("CA_es"), Some(Locale::Ca));
    /// assert_eq!(Locale::parse("fr"), None);
    /// ```
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.split(['-', '_']).next().unwrap_or_default() {
            "es" => Some(Locale::Es),
            "ca" => Some(Locale::Ca),
            _ => None,
        }
    }

    /// Exact match on the two-letter code, as used in route segments.
    pub fn from_code(code: &str) -> Option<Self> {
        Locale::ALL.into_iter().find(|locale| locale.as_str() == code)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a language tag that is not Spanish or Catalan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s).ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug)]
struct Catalogs {
    es: Value,
    ca: Value,
}

impl Catalogs {
    fn get(&self, locale: Locale) -> &Value {
        match locale {
            Locale::Es => &self.es,
            Locale::Ca => &self.ca,
        }
    }
}

fn parse_embedded(locale: Locale, source: &str) -> Value {
    serde_json::from_str(source).unwrap_or_else(|err| {
        warn!(%locale, error = %err, "embedded catalog is not valid JSON; keys will show untranslated");
        Value::Null
    })
}

static EMBEDDED: LazyLock<Arc<Catalogs>> = LazyLock::new(|| {
    Arc::new(Catalogs {
        es: parse_embedded(Locale::Es, include_str!("../locales/es.json")),
        ca: parse_embedded(Locale::Ca, include_str!("../locales/ca.json")),
    })
});

/// Handle on the translation catalogs bound to one active locale.
///
/// Cloning is cheap; catalogs are shared.
///
/// ```
/// use bites_forms::{Locale, Translator};
///
/// let ca = Translator::new(Locale::Ca);
/// assert_eq!(ca.text("contactForm.validation.required"), "Aquest camp és obligatori.");
/// assert_eq!(ca.with_locale(Locale::Es).text("contactForm.validation.required"), "Este campo es obligatorio.");
/// assert_eq!(ca.text("no.such.key"), "no.such.key");
/// ```
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    catalogs: Arc<Catalogs>,
}

impl Translator {
    /// Translator over the catalogs shipped with the crate.
    pub fn new(locale: Locale) -> Self {
        Translator {
            locale,
            catalogs: Arc::clone(&EMBEDDED),
        }
    }

    /// Translator over caller-supplied catalogs.
    pub fn from_json(locale: Locale, es: &str, ca: &str) -> Result<Self, serde_json::Error> {
        Ok(Translator {
            locale,
            catalogs: Arc::new(Catalogs {
                es: serde_json::from_str(es)?,
                ca: serde_json::from_str(ca)?,
            }),
        })
    }

    /// Active locale.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Same catalogs, another locale.
    pub fn with_locale(&self, locale: Locale) -> Self {
        Translator {
            locale,
            catalogs: Arc::clone(&self.catalogs),
        }
    }

    fn find(&self, key: &str) -> Option<&Value> {
        let pointer = format!("/{}", key.replace('.', "/"));
        self.catalogs
            .get(self.locale)
            .pointer(&pointer)
            .or_else(|| self.catalogs.get(Locale::Es).pointer(&pointer))
    }

    /// Text for `key`, or the key itself when no catalog has it.
    pub fn text(&self, key: &str) -> String {
        match self.find(key) {
            Some(Value::String(text)) => text.clone(),
            _ => key.to_string(),
        }
    }

    /// Structured catalog data under `key`, such as policy sections.
    ///
    /// Returns `None` when the key is missing or the data has another shape.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.find(key)?;
        match T::deserialize(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(key, locale = %self.locale, error = %err, "catalog entry has an unexpected shape");
                None
            }
        }
    }

    /// Label for an option of a keyed list, for example
    /// `label("freeSampleForm.data.productOptions", "smoothies")`.
    pub fn label(&self, list: &str, id: &str) -> String {
        self.text(&format!("{list}.{id}"))
    }
}

impl Default for Translator {
    fn default() -> Self {
        Translator::new(Locale::default())
    }
}
