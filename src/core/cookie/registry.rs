//! Per-name accessor cache.
//!
//! The first request for a name creates and reads the accessor; later
//! requests get the same instance and ignore any options they pass.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;

use super::accessor::SignedCookie;
use crate::config::{
    Config, ConfigProvider, CookieConfig, CookieOptions, DEFAULT_COOKIE_CONFIG, Result,
};
use crate::core::context::CookieContext;
use crate::security::crypto::Keyring;

pub struct CookieRegistry {
    keyring: Keyring,
    provider: Arc<dyn ConfigProvider>,
    instances: HashMap<String, SignedCookie>,
}

impl CookieRegistry {
    #[must_use]
    pub fn new(keyring: Keyring, provider: Arc<dyn ConfigProvider>) -> Self {
        Self {
            keyring,
            provider,
            instances: HashMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: Arc<Config>) -> Self {
        Self::new(Keyring::from_config(&config), config)
    }

    /// Returns the accessor for `name`, creating it on first use.
    ///
    /// Options are taken from `options`, else the provider entry for `name`,
    /// else the provider's `default` entry.
    ///
    /// # Errors
    ///
    /// Propagates configuration and read errors from creating the accessor.
    /// A failed creation is not cached.
    pub fn instance<C: CookieContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        name: &str,
        options: Option<CookieOptions>,
    ) -> Result<&mut SignedCookie> {
        match self.instances.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let options = options
                    .or_else(|| self.provider.get(name))
                    .or_else(|| self.provider.get(DEFAULT_COOKIE_CONFIG))
                    .unwrap_or_default();
                let config = CookieConfig::resolve(name, options, ctx.host())?;
                let cookie = SignedCookie::open(config, self.keyring.clone(), ctx)?;
                debug!(
                    cookie = %cookie.name(),
                    codec = ?cookie.codec(),
                    state = ?cookie.state(),
                    "Cookie accessor created"
                );
                Ok(entry.insert(cookie))
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SignedCookie> {
        self.instances.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookieError;
    use crate::core::context::HttpExchange;
    use crate::security::crypto::{AesGcmCipher, HmacSigner};
    use serde_json::json;

    fn registry(provider: HashMap<String, CookieOptions>) -> CookieRegistry {
        CookieRegistry::new(
            Keyring::new(
                Arc::new(HmacSigner::new("k")),
                Arc::new(AesGcmCipher::new()),
            ),
            Arc::new(provider),
        )
    }

    fn options(lifetime: i64) -> CookieOptions {
        CookieOptions {
            lifetime: Some(lifetime),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_access_wins() {
        let mut registry = registry(HashMap::new());
        let mut ctx = HttpExchange::new("example.org");

        let first = registry.instance(&mut ctx, "theme", Some(options(60))).unwrap();
        assert_eq!(first.config().lifetime, 60);

        let second = registry.instance(&mut ctx, "theme", Some(options(120))).unwrap();
        assert_eq!(second.config().lifetime, 60);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_option_resolution_order() {
        let provider = HashMap::from([
            ("theme".to_string(), options(10)),
            (DEFAULT_COOKIE_CONFIG.to_string(), options(20)),
        ]);
        let mut registry = registry(provider);
        let mut ctx = HttpExchange::new("example.org");

        let named = registry.instance(&mut ctx, "theme", None).unwrap();
        assert_eq!(named.name(), "theme");
        assert_eq!(named.config().lifetime, 10);

        let fallback = registry.instance(&mut ctx, "cart", None).unwrap();
        assert_eq!(fallback.config().lifetime, 20);

        let explicit = registry.instance(&mut ctx, "lang", Some(options(30))).unwrap();
        assert_eq!(explicit.config().lifetime, 30);
    }

    #[test]
    fn test_builtin_defaults_without_provider_entry() {
        let mut registry = registry(HashMap::new());
        let mut ctx = HttpExchange::new("example.org");

        let cookie = registry.instance(&mut ctx, "theme", None).unwrap();
        assert_eq!(cookie.config().lifetime, 0);
        assert_eq!(cookie.config().domain, "example.org");
        assert!(cookie.config().http_only);
    }

    #[test]
    fn test_mutation_is_visible_through_cache() {
        let mut registry = registry(HashMap::new());
        let mut ctx = HttpExchange::new("example.org");

        let cookie = registry.instance(&mut ctx, "theme", None).unwrap();
        assert!(cookie.set(&mut ctx, "dark", None));

        let cached = registry.get("theme").unwrap();
        assert_eq!(cached.value(), Some(&json!("dark")));
        assert!(!cached.loaded());
    }

    #[test]
    fn test_from_config() {
        let mut registry = CookieRegistry::from_config(crate::test_utils::create_test_config());
        let mut ctx = HttpExchange::new("example.org");

        let cookie = registry
            .instance(
                &mut ctx,
                "secret",
                Some(CookieOptions {
                    encrypted: Some(crate::config::Encryption::Enabled(true)),
                    ..Default::default()
                }),
            )
            .unwrap();
        assert_eq!(cookie.codec().provider(), Some("default"));
        assert!(cookie.set(&mut ctx, json!([1, 2]), None));

        let theme = registry.instance(&mut ctx, "theme", None).unwrap();
        assert_eq!(theme.config().path, "/");
        assert_eq!(theme.config().lifetime, 3600);
    }

    #[test]
    fn test_failed_creation_is_not_cached() {
        let mut registry = registry(HashMap::new());
        let mut ctx = HttpExchange::new("example.org");

        let result = registry.instance(&mut ctx, "bad name", None);
        assert!(matches!(result, Err(CookieError::Config(_))));
        assert!(registry.is_empty());
    }
}
