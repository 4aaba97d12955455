//! Cookie encryption.
//!
//! Implements AES-GCM encryption of cookie payloads under named providers.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Provider id used when a cookie is configured with `encrypted: true`.
pub const DEFAULT_PROVIDER: &str = "default";

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("unknown cipher provider: {0}")]
    UnknownProvider(String),

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,
}

/// Symmetric encryption of opaque byte strings under a named provider.
pub trait Cipher: Send + Sync {
    /// Encrypts `plaintext` with the key registered as `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or encryption fails.
    fn encrypt(&self, provider: &str, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Decrypts bytes produced by [`Cipher::encrypt`] for the same provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or the data fails authentication.
    fn decrypt(&self, provider: &str, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Whether `provider` can be used with this cipher.
    fn has_provider(&self, _provider: &str) -> bool {
        true
    }
}

/// A single AES-256-GCM provider key.
///
/// Every message gets a fresh random token; the actual AES key is derived
/// from the master key and that token.
#[derive(Clone)]
pub struct AeadKey {
    master_key: [u8; 32],
}

impl AeadKey {
    /// Creates a new `AeadKey` from the provided secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        let result = hasher.finalize();
        let mut master_key = [0u8; 32];
        master_key.copy_from_slice(&result);
        Self { master_key }
    }

    /// Encrypts data into `token || nonce || ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Encrypt` if AES-GCM rejects the input.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut token = [0u8; TOKEN_LEN];
        OsRng.fill_bytes(&mut token);

        let derived_key = self.derive_key(&token)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derived_key));
        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CipherError::Encrypt)?;

        let mut combined = Vec::with_capacity(TOKEN_LEN + NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&token);
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(combined)
    }

    /// Decrypts data produced by [`AeadKey::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Decrypt` for truncated or tampered input.
    pub fn decrypt(&self, combined: &[u8]) -> Result<Vec<u8>, CipherError> {
        if combined.len() < TOKEN_LEN + NONCE_LEN + TAG_LEN {
            return Err(CipherError::Decrypt);
        }

        let token = &combined[..TOKEN_LEN];
        let nonce = Nonce::from_slice(&combined[TOKEN_LEN..TOKEN_LEN + NONCE_LEN]);
        let ciphertext = &combined[TOKEN_LEN + NONCE_LEN..];

        let derived_key = self.derive_key(token)?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derived_key));
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::Decrypt)
    }

    fn derive_key(&self, token: &[u8]) -> Result<[u8; 32], CipherError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.master_key)
            .map_err(|_| CipherError::Encrypt)?;
        mac.update(token);
        let result = mac.finalize();
        let mut key = [0u8; 32];
        key.copy_from_slice(&result.into_bytes());
        Ok(key)
    }
}

/// [`Cipher`] backed by a set of named [`AeadKey`]s.
#[derive(Clone, Default)]
pub struct AesGcmCipher {
    providers: HashMap<String, AeadKey>,
}

impl AesGcmCipher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the key for `provider`.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>, secret: &str) -> Self {
        self.providers.insert(provider.into(), AeadKey::new(secret));
        self
    }

    fn key(&self, provider: &str) -> Result<&AeadKey, CipherError> {
        self.providers
            .get(provider)
            .ok_or_else(|| CipherError::UnknownProvider(provider.to_string()))
    }
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, provider: &str, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.key(provider)?.encrypt(plaintext)
    }

    fn decrypt(&self, provider: &str, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.key(provider)?.decrypt(ciphertext)
    }

    fn has_provider(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_decryption_roundtrip() {
        let key = AeadKey::new("super_secret_key_123");
        let plaintext = b"Hello, World!";

        let encrypted = key.encrypt(plaintext).unwrap();
        let decrypted = key.decrypt(&encrypted).expect("Decryption failed");

        assert_eq!(plaintext.to_vec(), decrypted);
    }

    #[test]
    fn test_unique_ciphertexts() {
        let key = AeadKey::new("secret");

        let enc1 = key.encrypt(b"Data").unwrap();
        let enc2 = key.encrypt(b"Data").unwrap();

        assert_ne!(enc1, enc2);
    }

    #[test]
    fn test_invalid_data() {
        let key = AeadKey::new("secret");

        assert!(matches!(key.decrypt(b"short"), Err(CipherError::Decrypt)));

        let mut bytes = key.encrypt(b"data").unwrap();
        if let Some(last) = bytes.last_mut() {
            *last ^= 0xFF;
        }
        assert!(matches!(key.decrypt(&bytes), Err(CipherError::Decrypt)));
    }

    #[test]
    fn test_providers_are_isolated() {
        let cipher = AesGcmCipher::new()
            .with_provider(DEFAULT_PROVIDER, "one")
            .with_provider("legacy", "two");

        let sealed = cipher.encrypt("legacy", b"payload").unwrap();
        assert_eq!(cipher.decrypt("legacy", &sealed).unwrap(), b"payload");
        assert!(cipher.decrypt(DEFAULT_PROVIDER, &sealed).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        let cipher = AesGcmCipher::new().with_provider(DEFAULT_PROVIDER, "one");

        assert!(cipher.has_provider(DEFAULT_PROVIDER));
        assert!(!cipher.has_provider("missing"));
        assert!(matches!(
            cipher.encrypt("missing", b"x"),
            Err(CipherError::UnknownProvider(id)) if id == "missing"
        ));
    }
}
