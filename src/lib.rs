//! Library definitions.
//!
//! Exports the signed cookie accessor, its configuration, and crypto primitives.

pub mod config;
pub mod core;
pub mod security;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
pub use config::{
    Config, ConfigProvider, CookieConfig, CookieError, CookieOptions, Encryption, Result,
};
pub use core::context::{CookieContext, Expiry, HttpExchange, SetCookie};
pub use core::cookie::{CookieRegistry, CookieState, PayloadCodec, SignedCookie};
pub use security::crypto::{AesGcmCipher, Cipher, HmacSigner, Keyring, Signer};
