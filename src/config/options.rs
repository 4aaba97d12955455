//! Per-cookie options.
//!
//! `CookieOptions` is the raw, partially specified configuration of a cookie
//! name; `CookieConfig` is the resolved, immutable form an accessor runs with.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{CookieError, Result};
use crate::core::cookie::PayloadCodec;

/// Name of the options entry used when a cookie has no entry of its own.
pub const DEFAULT_COOKIE_CONFIG: &str = "default";

/// Encryption setting: a flag or an explicit provider id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Encryption {
    /// `true` selects the default provider.
    Enabled(bool),
    Provider(String),
}

impl Encryption {
    pub(crate) fn from_env_value(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Self::Enabled(true),
            "false" | "0" | "no" | "" => Self::Enabled(false),
            _ => Self::Provider(s.trim().to_string()),
        }
    }
}

/// Options recognised for a cookie name. Absent fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CookieOptions {
    /// Seconds until expiry; 0 keeps the cookie until the browser closes.
    pub lifetime: Option<i64>,
    pub path: Option<String>,
    /// Defaults to the request host.
    pub domain: Option<String>,
    pub secure: Option<bool>,
    #[serde(rename = "httponly")]
    pub http_only: Option<bool>,
    pub serialize: Option<bool>,
    pub encrypted: Option<Encryption>,
}

impl CookieOptions {
    /// Overlays `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            lifetime: other.lifetime.or(self.lifetime),
            path: other.path.or(self.path),
            domain: other.domain.or(self.domain),
            secure: other.secure.or(self.secure),
            http_only: other.http_only.or(self.http_only),
            serialize: other.serialize.or(self.serialize),
            encrypted: other.encrypted.or(self.encrypted),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Source of per-name cookie options.
pub trait ConfigProvider: Send + Sync {
    fn get(&self, name: &str) -> Option<CookieOptions>;
}

impl ConfigProvider for HashMap<String, CookieOptions> {
    fn get(&self, name: &str) -> Option<CookieOptions> {
        HashMap::get(self, name).cloned()
    }
}

/// Resolved cookie configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub lifetime: i64,
    pub path: String,
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
    pub codec: PayloadCodec,
}

impl CookieConfig {
    /// Resolves `options` for `name`, using `host` when no domain is set.
    ///
    /// # Errors
    ///
    /// Returns `CookieError::Config` if `name` is not a valid cookie name.
    pub fn resolve(name: &str, options: CookieOptions, host: &str) -> Result<Self> {
        if !is_valid_cookie_name(name) {
            return Err(CookieError::Config(format!("invalid cookie name: {name:?}")));
        }

        let codec = PayloadCodec::from_options(
            options.serialize.unwrap_or(false),
            options.encrypted.as_ref(),
        );

        Ok(Self {
            name: name.to_string(),
            lifetime: options.lifetime.unwrap_or(0),
            path: options.path.unwrap_or_default(),
            domain: options.domain.unwrap_or_else(|| host.to_string()),
            secure: options.secure.unwrap_or(false),
            http_only: options.http_only.unwrap_or(true),
            codec,
        })
    }
}

/// RFC 6265 token: visible ASCII without separators.
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')'
                        | b'<'
                        | b'>'
                        | b'@'
                        | b','
                        | b';'
                        | b':'
                        | b'\\'
                        | b'"'
                        | b'/'
                        | b'['
                        | b']'
                        | b'?'
                        | b'='
                        | b'{'
                        | b'}'
                )
        })
}
