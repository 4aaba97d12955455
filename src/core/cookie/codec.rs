//! Payload encoding strategies.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;

use crate::config::{Encryption, PayloadError};
use crate::security::crypto::{Cipher, DEFAULT_PROVIDER};

/// How a cookie value becomes the payload that gets signed.
///
/// Encryption always serializes first, so there is no separate
/// "serialized and encrypted" variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadCodec {
    /// The value is sent as a string.
    Plain,
    /// The value is sent as JSON text.
    Serialized,
    /// JSON text encrypted under `provider`, then URL-safe base64.
    Encrypted { provider: String },
}

impl PayloadCodec {
    #[must_use]
    pub fn from_options(serialize: bool, encrypted: Option<&Encryption>) -> Self {
        let provider = match encrypted {
            Some(Encryption::Enabled(true)) => Some(DEFAULT_PROVIDER.to_string()),
            Some(Encryption::Provider(id)) if !id.is_empty() => Some(id.clone()),
            _ => None,
        };

        match provider {
            Some(provider) => Self::Encrypted { provider },
            None if serialize => Self::Serialized,
            None => Self::Plain,
        }
    }

    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Encrypted { provider } => Some(provider.as_str()),
            Self::Plain | Self::Serialized => None,
        }
    }

    /// The value a later read of `value` will produce.
    ///
    /// Plain cookies carry text only, so anything else becomes its string form.
    #[must_use]
    pub fn normalize(&self, value: Value) -> Value {
        match self {
            Self::Plain => Value::String(plain_text(&value)),
            Self::Serialized | Self::Encrypted { .. } => value,
        }
    }

    /// Renders `value` into a payload.
    ///
    /// # Errors
    ///
    /// Fails if serialization or encryption fails.
    pub fn encode(&self, value: &Value, cipher: &dyn Cipher) -> Result<String, PayloadError> {
        match self {
            Self::Plain => Ok(plain_text(value)),
            Self::Serialized => Ok(serde_json::to_string(value)?),
            Self::Encrypted { provider } => {
                let json = serde_json::to_vec(value)?;
                let sealed = cipher.encrypt(provider, &json)?;
                Ok(URL_SAFE_NO_PAD.encode(sealed))
            }
        }
    }

    /// Recovers the value from a verified payload.
    ///
    /// # Errors
    ///
    /// Fails if the payload cannot be decoded, decrypted or deserialized.
    pub fn decode(&self, payload: &str, cipher: &dyn Cipher) -> Result<Value, PayloadError> {
        match self {
            Self::Plain => Ok(Value::String(payload.to_string())),
            Self::Serialized => Ok(serde_json::from_str(payload)?),
            Self::Encrypted { provider } => {
                let sealed = URL_SAFE_NO_PAD.decode(payload)?;
                let json = String::from_utf8(cipher.decrypt(provider, &sealed)?)?;
                Ok(serde_json::from_str(&json)?)
            }
        }
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::crypto::AesGcmCipher;
    use serde_json::json;

    fn cipher() -> AesGcmCipher {
        AesGcmCipher::new().with_provider(DEFAULT_PROVIDER, "test-key")
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(PayloadCodec::from_options(false, None), PayloadCodec::Plain);
        assert_eq!(PayloadCodec::from_options(true, None), PayloadCodec::Serialized);
        assert_eq!(
            PayloadCodec::from_options(true, Some(&Encryption::Enabled(false))),
            PayloadCodec::Serialized
        );
        assert_eq!(
            PayloadCodec::from_options(false, Some(&Encryption::Enabled(true))),
            PayloadCodec::Encrypted {
                provider: DEFAULT_PROVIDER.to_string()
            }
        );
        assert_eq!(
            PayloadCodec::from_options(false, Some(&Encryption::Provider("legacy".into())))
                .provider(),
            Some("legacy")
        );
        assert_eq!(
            PayloadCodec::from_options(false, Some(&Encryption::Provider(String::new()))),
            PayloadCodec::Plain
        );
    }

    #[test]
    fn test_plain_coerces_to_string() {
        let cipher = cipher();
        let codec = PayloadCodec::Plain;

        assert_eq!(codec.encode(&json!("dark"), &cipher).unwrap(), "dark");
        assert_eq!(codec.encode(&json!(42), &cipher).unwrap(), "42");
        assert_eq!(codec.encode(&Value::Null, &cipher).unwrap(), "");
        assert_eq!(codec.decode("42", &cipher).unwrap(), json!("42"));

        assert_eq!(codec.normalize(json!(42)), json!("42"));
        assert_eq!(codec.normalize(Value::Null), json!(""));
        assert_eq!(
            PayloadCodec::Serialized.normalize(json!([1, 2])),
            json!([1, 2])
        );
    }

    #[test]
    fn test_serialized_keeps_structure() {
        let cipher = cipher();
        let codec = PayloadCodec::Serialized;
        let value = json!({"items": [1, 2], "total": 9.5});

        let payload = codec.encode(&value, &cipher).unwrap();
        assert_eq!(codec.decode(&payload, &cipher).unwrap(), value);
        assert!(matches!(
            codec.decode("{not json", &cipher),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn test_encrypted_hides_plaintext() {
        let cipher = cipher();
        let codec = PayloadCodec::Encrypted {
            provider: DEFAULT_PROVIDER.to_string(),
        };
        let value = json!({"user": "alice"});

        let payload = codec.encode(&value, &cipher).unwrap();
        assert!(!payload.contains("alice"));
        assert!(!payload.contains('~'));
        assert_eq!(codec.decode(&payload, &cipher).unwrap(), value);

        assert!(matches!(
            codec.decode("***", &cipher),
            Err(PayloadError::Base64(_))
        ));
        assert!(matches!(
            codec.decode(&URL_SAFE_NO_PAD.encode([0u8; 80]), &cipher),
            Err(PayloadError::Cipher(_))
        ));
    }
}
