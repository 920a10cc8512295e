//! Explicit dependencies of the form pipeline
//!
//! Everything a controller needs from the outside world travels in one
//! [`SiteEnv`] passed by reference: the backend, the translation handle
//! for the active locale and the site configuration. Nothing is read from
//! globals.

use std::sync::Arc;

use crate::backend::{BackendError, SupabaseClient};
use crate::config::SiteConfig;
use crate::{Locale, Translator};

/// Backend, translations and configuration for one visitor session.
#[derive(Debug, Clone)]
pub struct SiteEnv<B> {
    /// Hosted data store
    pub backend: B,
    /// Translations in the active locale
    pub i18n: Translator,
    /// Site settings
    pub config: Arc<SiteConfig>,
}

impl<B> SiteEnv<B> {
    /// Bundle the parts, starting in the configured default locale.
    pub fn new(backend: B, config: SiteConfig) -> Self {
        SiteEnv {
            backend,
            i18n: Translator::new(config.default_locale),
            config: Arc::new(config),
        }
    }

    /// Same backend and configuration, another language.
    pub fn with_locale(&self, locale: Locale) -> Self
    where
        B: Clone,
    {
        SiteEnv {
            backend: self.backend.clone(),
            i18n: self.i18n.with_locale(locale),
            config: Arc::clone(&self.config),
        }
    }

    /// Active locale.
    pub fn locale(&self) -> Locale {
        self.i18n.locale()
    }
}

impl SiteEnv<SupabaseClient> {
    /// Environment talking to the Supabase project in `config`.
    pub fn connect(config: SiteConfig) -> Result<Self, BackendError> {
        let backend = SupabaseClient::new(&config)?;
        Ok(SiteEnv::new(backend, config))
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::testing::MockBackend;

    #[test]
    fn test_with_locale_shares_backend_and_config() {
        let mut config = SiteConfig::new(Url::parse("https://p.supabase.co").unwrap(), "anon");
        config.default_locale = Locale::Ca;
        let env = SiteEnv::new(MockBackend::new(), config);
        assert_eq!(env.locale(), Locale::Ca);

        let es = env.with_locale(Locale::Es);
        assert_eq!(es.locale(), Locale::Es);
        assert!(Arc::ptr_eq(&env.config, &es.config));
    }

    #[test]
    fn test_connect_builds_client() {
        let config = SiteConfig::new(Url::parse("https://p.supabase.co").unwrap(), "anon");
        assert!(SiteEnv::connect(config).is_ok());
    }
}
