//! Cookie signing.
//!
//! Signatures bind a payload to the cookie name it was issued for. The
//! accessor locates the `~` separator by signature length, so every
//! [`Signer`] must produce output of a fixed length that never contains `~`.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Length of an [`HmacSigner`] signature: 32 bytes in unpadded base64.
pub const SIGNATURE_LEN: usize = 43;

/// Deterministic, keyed, fixed-length signatures over `(name, payload)`.
pub trait Signer: Send + Sync {
    fn sign(&self, name: &str, payload: &str) -> String;

    /// Checks `signature` against the expected signature for `(name, payload)`.
    fn verify(&self, name: &str, payload: &str, signature: &str) -> bool {
        self.sign(name, payload) == signature
    }

    /// Offset of the `~` separator in a signed cookie value.
    fn signature_len(&self, name: &str) -> usize {
        self.sign(name, "").len()
    }
}

/// HMAC-SHA256 signer keyed by a hashed secret.
#[derive(Clone)]
pub struct HmacSigner {
    key: [u8; 32],
}

impl HmacSigner {
    /// Creates a new `HmacSigner` using the provided secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&hasher.finalize());
        Self { key }
    }

    fn mac(&self, name: &str, payload: &str) -> Option<HmacSha256> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key).ok()?;
        // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
        mac.update(&(name.len() as u64).to_be_bytes());
        mac.update(name.as_bytes());
        mac.update(payload.as_bytes());
        Some(mac)
    }
}

impl Signer for HmacSigner {
    fn sign(&self, name: &str, payload: &str) -> String {
        self.mac(name, payload).map_or_else(String::new, |mac| {
            URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
        })
    }

    fn verify(&self, name: &str, payload: &str, signature: &str) -> bool {
        let Ok(expected) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };
        self.mac(name, payload)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok())
    }

    fn signature_len(&self, _name: &str) -> usize {
        SIGNATURE_LEN
    }
}
