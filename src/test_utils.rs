//! Test utilities and shared configuration.
//!
//! This module provides common helpers for unit and integration tests,
//! reducing duplication across the codebase.

#[cfg(any(test, feature = "testing"))]
use crate::config::{Config, CookieOptions, DEFAULT_COOKIE_CONFIG};
#[cfg(any(test, feature = "testing"))]
use crate::security::crypto::DEFAULT_PROVIDER;
#[cfg(any(test, feature = "testing"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "testing"))]
use std::sync::Arc;

/// Creates a standard configuration for testing purposes.
///
/// This configuration has:
/// - A fixed signing secret
/// - A `default` cipher provider
/// - A `default` cookie entry with path `/` and a one hour lifetime
#[cfg(any(test, feature = "testing"))]
#[must_use]
pub fn create_test_config() -> Arc<Config> {
    Arc::new(Config {
        cookie_secret: "0000000000000000000000000000000000000000000000000000000000000000"
            .to_string(),
        cipher_keys: vec![(DEFAULT_PROVIDER.to_string(), "cipher-secret".to_string())],
        cookies: HashMap::from([(
            DEFAULT_COOKIE_CONFIG.to_string(),
            CookieOptions {
                lifetime: Some(3600),
                path: Some("/".to_string()),
                ..Default::default()
            },
        )]),
        log_format: "pretty".to_string(),
    })
}
