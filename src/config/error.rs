//! Error types and result aliases.
//!
//! Defines the core `CookieError` enumeration and common `Result` type.

use thiserror::Error;

use crate::security::crypto::CipherError;

/// Cookie accessor errors.
#[derive(Debug, Error)]
pub enum CookieError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A signed cookie could not be decoded.
    ///
    /// The message stays generic; the cause is kept as the error source.
    #[error("error reading cookie data")]
    Read {
        name: String,
        #[source]
        source: PayloadError,
    },

    /// Response header adaptation failed.
    #[error("header error: {0}")]
    Header(String),
}

/// Failures while turning a payload into a value or back.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid serialized payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decrypted payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Result type alias for `CookieError`.
pub type Result<T> = std::result::Result<T, CookieError>;
