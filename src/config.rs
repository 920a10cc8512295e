//! Site configuration
//!
//! Loaded once at startup and shared read-only through [`SiteEnv`](crate::SiteEnv).
//! The two Supabase settings are required; everything else has a default
//! that is logged when used.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::Locale;

const DEFAULT_CATALOG_BUCKET: &str = "catalogos";
const DEFAULT_CATALOG_PREFIX: &str = "Catalogo_Profesional_2bites";
const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 300;
const DEFAULT_LOGO_URL: &str = "https://msiwuhhptrmgvhrclksp.supabase.co/storage/v1/object/public/website-assets/logos/2bitesco_logo.webp";

/// Why the configuration could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),
    /// A variable is set but unparsable
    #[error("invalid {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Parser message
        reason: String,
    },
    /// The Supabase project URL is malformed
    #[error("invalid SUPABASE_URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Settings for the backend connection and the catalog download.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    /// Supabase project URL
    pub supabase_url: Url,
    /// Public anon key, sent as `apikey` and bearer token
    pub anon_key: String,
    /// Storage bucket holding the catalog PDFs
    #[serde(default = "default_catalog_bucket")]
    pub catalog_bucket: String,
    /// File name prefix of the catalog PDFs
    #[serde(default = "default_catalog_prefix")]
    pub catalog_prefix: String,
    /// Lifetime of a signed catalog link
    #[serde(default = "default_signed_url_ttl_secs")]
    pub signed_url_ttl_secs: u64,
    /// HTTP timeout; the client library default applies when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Locale used when none can be detected
    #[serde(default)]
    pub default_locale: Locale,
    /// Logo shown on confirmation screens
    #[serde(default = "default_logo_url")]
    pub logo_url: String,
}

fn default_catalog_bucket() -> String {
    DEFAULT_CATALOG_BUCKET.to_string()
}

fn default_catalog_prefix() -> String {
    DEFAULT_CATALOG_PREFIX.to_string()
}

fn default_signed_url_ttl_secs() -> u64 {
    DEFAULT_SIGNED_URL_TTL_SECS
}

fn default_logo_url() -> String {
    DEFAULT_LOGO_URL.to_string()
}

impl SiteConfig {
    /// Config with defaults for everything but the connection.
    pub fn new(supabase_url: Url, anon_key: impl Into<String>) -> Self {
        SiteConfig {
            supabase_url,
            anon_key: anon_key.into(),
            catalog_bucket: default_catalog_bucket(),
            catalog_prefix: default_catalog_prefix(),
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
            request_timeout_secs: None,
            default_locale: Locale::default(),
            logo_url: default_logo_url(),
        }
    }

    /// Load from process environment variables.
    ///
    /// Required: `SUPABASE_URL`, `SUPABASE_ANON_KEY`. Optional:
    /// `BITES_CATALOG_BUCKET`, `BITES_CATALOG_PREFIX`,
    /// `BITES_SIGNED_URL_TTL`, `BITES_REQUEST_TIMEOUT`,
    /// `BITES_DEFAULT_LOCALE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase_url = required(&var, "SUPABASE_URL")?;
        let anon_key = required(&var, "SUPABASE_ANON_KEY")?;

        let mut config = SiteConfig::new(Url::parse(&supabase_url)?, anon_key);
        config.catalog_bucket = optional(&var, "BITES_CATALOG_BUCKET", config.catalog_bucket)?;
        config.catalog_prefix = optional(&var, "BITES_CATALOG_PREFIX", config.catalog_prefix)?;
        config.signed_url_ttl_secs =
            optional(&var, "BITES_SIGNED_URL_TTL", config.signed_url_ttl_secs)?;
        config.default_locale = optional(&var, "BITES_DEFAULT_LOCALE", config.default_locale)?;
        config.request_timeout_secs = match var("BITES_REQUEST_TIMEOUT") {
            Some(raw) => Some(parse("BITES_REQUEST_TIMEOUT", &raw)?),
            None => None,
        };
        Ok(config)
    }

    /// Signed link lifetime.
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    /// HTTP timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn required<F>(var: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            warn!("Environment variable {key} not found");
            Err(ConfigError::Missing(key))
        }
    }
}

fn optional<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => parse(key, &raw),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tracing_test::traced_test;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    #[traced_test]
    fn test_defaults_are_logged() {
        let config = SiteConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.catalog_bucket, "catalogos");
        assert_eq!(config.catalog_prefix, "Catalogo_Profesional_2bites");
        assert_eq!(config.signed_url_ttl(), Duration::from_secs(300));
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.default_locale, Locale::Es);
        assert!(logs_contain("BITES_SIGNED_URL_TTL not set, using default: 300"));
    }

    #[test]
    fn test_overrides() {
        let config = SiteConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("BITES_SIGNED_URL_TTL", "60"),
            ("BITES_REQUEST_TIMEOUT", "15"),
            ("BITES_DEFAULT_LOCALE", "ca"),
            ("BITES_CATALOG_BUCKET", "docs"),
        ]))
        .unwrap();

        assert_eq!(config.signed_url_ttl_secs, 60);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.default_locale, Locale::Ca);
        assert_eq!(config.catalog_bucket, "docs");
    }

    #[test]
    fn test_missing_and_invalid() {
        assert_eq!(
            SiteConfig::from_vars(vars(&[("SUPABASE_URL", "https://p.supabase.co")])),
            Err(ConfigError::Missing("SUPABASE_ANON_KEY"))
        );
        assert!(matches!(
            SiteConfig::from_vars(vars(&[
                ("SUPABASE_URL", "not a url"),
                ("SUPABASE_ANON_KEY", "anon"),
            ])),
            Err(ConfigError::Url(_))
        ));
        assert!(matches!(
            SiteConfig::from_vars(vars(&[
                ("SUPABASE_URL", "https://p.supabase.co"),
                ("SUPABASE_ANON_KEY", "anon"),
                ("BITES_SIGNED_URL_TTL", "five minutes"),
            ])),
            Err(ConfigError::Invalid {
                key: "BITES_SIGNED_URL_TTL",
                ..
            })
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SiteConfig = serde_json::from_str(
            r#"{"supabase_url": "https://p.supabase.co", "anon_key": "k", "default_locale": "ca"}"#,
        )
        .unwrap();
        assert_eq!(config.default_locale, Locale::Ca);
        assert_eq!(config.signed_url_ttl_secs, 300);
        assert!(config.logo_url.ends_with("2bitesco_logo.webp"));
    }
}
