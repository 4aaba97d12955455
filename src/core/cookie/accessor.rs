//! Signed cookie accessor.
//!
//! A cookie value on the wire is `signature~payload`. The signature has a
//! fixed length, so the separator is expected at exactly that offset; values
//! without it are ignored, values with a wrong signature are purged.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::codec::PayloadCodec;
use crate::config::{CookieConfig, CookieError, PayloadError, Result};
use crate::core::context::{CookieContext, Expiry, SetCookie};
use crate::security::crypto::Keyring;

const SEPARATOR: u8 = b'~';

/// What the accessor last did with its cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieState {
    /// Nothing usable was sent: no cookie, or no signature separator.
    Empty,
    /// A correctly signed value was read.
    Loaded,
    /// The signature did not match and the cookie was deleted.
    Purged,
    /// A value was set.
    Written,
    /// The cookie was deleted explicitly.
    Deleted,
}

/// Accessor for a single named, signed cookie.
#[derive(Debug)]
pub struct SignedCookie {
    config: CookieConfig,
    keyring: Keyring,
    value: Option<Value>,
    loaded: bool,
    state: CookieState,
}

impl SignedCookie {
    /// Creates the accessor and reads the cookie from `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `CookieError::Config` if the configured cipher provider is
    /// unknown, and `CookieError::Read` if a correctly signed payload cannot
    /// be decoded.
    pub fn open<C: CookieContext + ?Sized>(
        config: CookieConfig,
        keyring: Keyring,
        ctx: &mut C,
    ) -> Result<Self> {
        if let Some(provider) = config.codec.provider() {
            if !keyring.cipher().has_provider(provider) {
                return Err(CookieError::Config(format!(
                    "cookie {:?} uses unknown cipher provider {provider:?}",
                    config.name
                )));
            }
        }

        let mut cookie = Self {
            config,
            keyring,
            value: None,
            loaded: false,
            state: CookieState::Empty,
        };
        cookie.read(ctx)?;
        Ok(cookie)
    }

    fn read<C: CookieContext + ?Sized>(&mut self, ctx: &mut C) -> Result<()> {
        let name = self.config.name.as_str();
        let Some(raw) = ctx.raw_cookie(name).map(str::to_owned) else {
            debug!(cookie = %name, "Cookie not present");
            return Ok(());
        };

        let split = self.keyring.signer().signature_len(name);
        if raw.as_bytes().get(split) != Some(&SEPARATOR) {
            debug!(cookie = %name, "Ignoring unsigned cookie");
            return Ok(());
        }

        let (signature, payload) = (&raw[..split], &raw[split + 1..]);
        if !self.keyring.signer().verify(name, payload, signature) {
            warn!(cookie = %name, action = "PURGE", "Cookie signature mismatch");
            self.delete(ctx);
            self.state = CookieState::Purged;
            return Ok(());
        }

        let value = self
            .config
            .codec
            .decode(payload, self.keyring.cipher())
            .map_err(|source| {
                debug!(cookie = %name, error = %source, "Cookie payload decode failed");
                CookieError::Read {
                    name: name.to_string(),
                    source,
                }
            })?;

        debug!(cookie = %name, "Cookie loaded");
        self.value = Some(value);
        self.loaded = true;
        self.state = CookieState::Loaded;
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &PayloadCodec {
        &self.config.codec
    }

    /// Whether the last read passed signature verification.
    #[must_use]
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn state(&self) -> CookieState {
        self.state
    }

    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Returns the current value, or `default` if there is none.
    #[must_use]
    pub fn value_or(&self, default: impl Into<Value>) -> Value {
        self.value.clone().unwrap_or_else(|| default.into())
    }

    /// Deserializes the current value into `T`.
    #[must_use]
    pub fn value_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.value
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Signed wire form of the current value.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be serialized or encrypted.
    pub fn render(&self) -> std::result::Result<String, PayloadError> {
        self.sign(self.value.as_ref().unwrap_or(&Value::Null))
    }

    fn sign(&self, value: &Value) -> std::result::Result<String, PayloadError> {
        let payload = self.config.codec.encode(value, self.keyring.cipher())?;
        let signature = self.keyring.signer().sign(&self.config.name, &payload);
        Ok(format!("{signature}~{payload}"))
    }

    /// Sets the cookie to `value`, for `lifetime` seconds or the configured lifetime.
    ///
    /// Returns whether the context accepted the write.
    pub fn set<C: CookieContext + ?Sized>(
        &mut self,
        ctx: &mut C,
        value: impl Into<Value>,
        lifetime: Option<i64>,
    ) -> bool {
        let value = self.config.codec.normalize(value.into());
        let wire = match self.sign(&value) {
            Ok(wire) => wire,
            Err(e) => {
                warn!(cookie = %self.config.name, error = %e, "Failed to render cookie value");
                return false;
            }
        };

        let written = ctx.set_cookie(&SetCookie {
            name: &self.config.name,
            value: &wire,
            expiry: Expiry::from_lifetime(lifetime.unwrap_or(self.config.lifetime)),
            path: &self.config.path,
            domain: &self.config.domain,
            secure: self.config.secure,
            http_only: self.config.http_only,
        });
        if written {
            self.value = Some(value);
            self.state = CookieState::Written;
        } else {
            warn!(cookie = %self.config.name, "Cookie write refused");
        }
        written
    }

    /// Deletes the cookie on both the request side and the client.
    ///
    /// The configured lifetime is ignored; the cookie is written already expired.
    pub fn delete<C: CookieContext + ?Sized>(&mut self, ctx: &mut C) -> bool {
        ctx.unset_raw_cookie(&self.config.name);
        self.value = None;
        self.loaded = false;
        self.state = CookieState::Deleted;

        ctx.set_cookie(&SetCookie {
            name: &self.config.name,
            value: "",
            expiry: Expiry::Expired,
            path: &self.config.path,
            domain: &self.config.domain,
            secure: self.config.secure,
            http_only: self.config.http_only,
        })
    }
}
