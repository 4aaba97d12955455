//! Configuration settings.
//!
//! Defines the main `Config` struct and environment variable loading logic.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use super::error::{CookieError, Result};
use super::options::{ConfigProvider, CookieOptions, DEFAULT_COOKIE_CONFIG, Encryption};
use crate::security::crypto::DEFAULT_PROVIDER;

const COOKIE_PREFIX: &str = "COOKIE";

fn get_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| CookieError::Config(format!("{key} must be set in environment")))
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_bool_opt(key: &str) -> Result<Option<bool>> {
    get_env_opt(key)
        .map(|v| match v.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(CookieError::Config(format!("{key} must be a boolean"))),
        })
        .transpose()
}

fn get_env_i64_opt(key: &str) -> Result<Option<i64>> {
    get_env_opt(key)
        .map(|v| {
            v.parse()
                .map_err(|_| CookieError::Config(format!("{key} must be a valid integer")))
        })
        .transpose()
}

/// Environment prefix for the options of `name`, e.g. `COOKIE_USER_PREFS`.
fn env_prefix(name: &str) -> String {
    let suffix: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{COOKIE_PREFIX}_{suffix}")
}

fn options_from_env(prefix: &str) -> Result<CookieOptions> {
    Ok(CookieOptions {
        lifetime: get_env_i64_opt(&format!("{prefix}_LIFETIME"))?,
        path: get_env_opt(&format!("{prefix}_PATH")),
        domain: get_env_opt(&format!("{prefix}_DOMAIN")),
        secure: get_env_bool_opt(&format!("{prefix}_SECURE"))?,
        http_only: get_env_bool_opt(&format!("{prefix}_HTTPONLY"))?,
        serialize: get_env_bool_opt(&format!("{prefix}_SERIALIZE"))?,
        encrypted: get_env_opt(&format!("{prefix}_ENCRYPTED"))
            .map(|v| Encryption::from_env_value(&v)),
    })
}

fn parse_cipher_keys(list: &str) -> Result<Vec<(String, String)>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            entry
                .split_once('=')
                .filter(|(id, secret)| !id.trim().is_empty() && !secret.is_empty())
                .map(|(id, secret)| (id.trim().to_string(), secret.to_string()))
                .ok_or_else(|| {
                    CookieError::Config("CIPHER_KEYS entries must be id=secret".to_string())
                })
        })
        .collect()
}

fn load_options_file(path: &str) -> Result<HashMap<String, CookieOptions>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CookieError::Config(format!("failed to read COOKIE_CONFIG_PATH '{path}': {e}")))?;
    serde_json::from_str(&raw)
        .map_err(|e| CookieError::Config(format!("invalid cookie options in '{path}': {e}")))
}

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret key for cookie signing.
    pub cookie_secret: String,
    /// Cipher provider ids and their secrets.
    pub cipher_keys: Vec<(String, String)>,
    /// Options per cookie name, including the `default` entry.
    pub cookies: HashMap<String, CookieOptions>,
    /// Logging format: "json" or "pretty".
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Cookie options are layered: entries from `COOKIE_CONFIG_PATH` first,
    /// then `COOKIE_<OPTION>` for the `default` entry and
    /// `COOKIE_<NAME>_<OPTION>` for every name listed in `COOKIE_NAMES`.
    ///
    /// # Errors
    ///
    /// Returns `CookieError::Config` if `COOKIE_SECRET` is missing, an option
    /// fails to parse, or the options file cannot be read.
    pub fn from_env() -> Result<Arc<Self>> {
        let cookie_secret = get_env("COOKIE_SECRET")?;

        let mut cipher_keys = Vec::new();
        if let Some(key) = get_env_opt("CIPHER_KEY") {
            cipher_keys.push((DEFAULT_PROVIDER.to_string(), key));
        }
        cipher_keys.extend(parse_cipher_keys(&get_env_or("CIPHER_KEYS", ""))?);

        let mut cookies = match get_env_opt("COOKIE_CONFIG_PATH") {
            Some(path) => load_options_file(&path)?,
            None => HashMap::new(),
        };

        let default_env = options_from_env(COOKIE_PREFIX)?;
        if !default_env.is_empty() {
            let base = cookies.remove(DEFAULT_COOKIE_CONFIG).unwrap_or_default();
            cookies.insert(DEFAULT_COOKIE_CONFIG.to_string(), base.merge(default_env));
        }

        for name in get_env_or("COOKIE_NAMES", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let named = options_from_env(&env_prefix(name))?;
            let base = cookies.remove(name).unwrap_or_default();
            cookies.insert(name.to_string(), base.merge(named));
        }

        Ok(Arc::new(Self {
            cookie_secret,
            cipher_keys,
            cookies,
            log_format: get_env_or("LOG_FORMAT", "json"),
        }))
    }
}

impl ConfigProvider for Config {
    fn get(&self, name: &str) -> Option<CookieOptions> {
        self.cookies.get(name).cloned()
    }
}
