//! Cryptographic utilities.
//!
//! Provides cookie signing and payload encryption, bundled as a [`Keyring`].

pub mod cipher;
pub mod signer;

pub use cipher::{AeadKey, AesGcmCipher, Cipher, CipherError, DEFAULT_PROVIDER};
pub use signer::{HmacSigner, SIGNATURE_LEN, Signer};

use std::fmt;
use std::sync::Arc;

use crate::config::Config;

/// Signer and cipher shared by every cookie of an application.
#[derive(Clone)]
pub struct Keyring {
    signer: Arc<dyn Signer>,
    cipher: Arc<dyn Cipher>,
}

impl fmt::Debug for Keyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyring").finish_non_exhaustive()
    }
}

impl Keyring {
    #[must_use]
    pub fn new(signer: Arc<dyn Signer>, cipher: Arc<dyn Cipher>) -> Self {
        Self { signer, cipher }
    }

    /// Builds the HMAC signer and AES-GCM providers from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let cipher = config
            .cipher_keys
            .iter()
            .fold(AesGcmCipher::new(), |cipher, (id, secret)| {
                cipher.with_provider(id.clone(), secret)
            });
        Self::new(
            Arc::new(HmacSigner::new(&config.cookie_secret)),
            Arc::new(cipher),
        )
    }

    #[must_use]
    pub fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }

    #[must_use]
    pub fn cipher(&self) -> &dyn Cipher {
        self.cipher.as_ref()
    }
}
