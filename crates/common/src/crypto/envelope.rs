//! Single-recipient hybrid envelopes
//!
//! `seal` draws a fresh AES-256-GCM [`Secret`] per call, encrypts the
//! plaintext under it with a random 96-bit IV and wraps the secret under the
//! recipient's RSA public key.
//!
//! # Security note
//!
//! The key wrap uses RSA PKCS#1 v1.5 encryption padding (`RSA/ECB/PKCS1Padding`
//! on the Android client). This padding is malleable and has a long history of
//! padding-oracle attacks; RSA-OAEP is the scheme a new deployment should use.
//! It is kept here only because the envelope shape is shared with existing
//! clients, and switching the wrap breaks every stored cryptogram unless the
//! clients migrate together. Servers never unwrap keys, so they cannot be used
//! as a decryption oracle, but clients must report every unwrap failure the
//! same way ([`EnvelopeError::DecryptionFailure`]) and must not expose timing
//! or detail about which step failed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rsa::Pkcs1v15Encrypt;
use serde::{Deserialize, Serialize};

use super::keys::{PrivateKey, PublicKey};
use super::secret::Secret;
use crate::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("failed to seal envelope: {0}")]
    Seal(String),
    #[error("message could not be decrypted")]
    DecryptionFailure,
}

impl EnvelopeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvelopeError::Seal(_) => ErrorKind::Undeliverable,
            EnvelopeError::DecryptionFailure => ErrorKind::DecryptionFailure,
        }
    }
}

/// One message sealed for one recipient
///
/// The JSON shape (`ivBase64`, `encryptedAesKeyBase64`,
/// `encryptedDataBytesBase64`) is shared with the Android client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "ivBase64", with = "b64")]
    pub iv: Vec<u8>,
    #[serde(rename = "encryptedAesKeyBase64", with = "b64")]
    pub wrapped_key: Vec<u8>,
    #[serde(rename = "encryptedDataBytesBase64", with = "b64")]
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Seal `plaintext` so only the holder of `recipient`'s private key can open it
    pub fn seal(plaintext: &[u8], recipient: &PublicKey) -> Result<Self, EnvelopeError> {
        let secret = Secret::generate();
        let (iv, ciphertext) = secret
            .seal(plaintext)
            .map_err(|e| EnvelopeError::Seal(e.to_string()))?;
        let wrapped_key = recipient
            .inner()
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, secret.bytes())
            .map_err(|e| EnvelopeError::Seal(e.to_string()))?;

        Ok(Self {
            iv: iv.to_vec(),
            wrapped_key,
            ciphertext,
        })
    }

    /// Open the envelope with the recipient's private key
    ///
    /// Every failure (wrong key, corrupt tag, malformed fields) collapses to
    /// [`EnvelopeError::DecryptionFailure`].
    pub fn open(&self, private: &PrivateKey) -> Result<Vec<u8>, EnvelopeError> {
        let key_bytes = private
            .inner()
            .decrypt(Pkcs1v15Encrypt, &self.wrapped_key)
            .map_err(|_| EnvelopeError::DecryptionFailure)?;
        let secret = Secret::from_slice(&key_bytes).map_err(|_| EnvelopeError::DecryptionFailure)?;
        secret
            .open(&self.iv, &self.ciphertext)
            .map_err(|_| EnvelopeError::DecryptionFailure)
    }

    /// Open and decode as UTF-8 text
    pub fn open_text(&self, private: &PrivateKey) -> Result<String, EnvelopeError> {
        let bytes = self.open(private)?;
        String::from_utf8(bytes).map_err(|_| EnvelopeError::DecryptionFailure)
    }

    /// Parse the JSON string form some clients store envelopes as
    pub fn from_json(payload: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(payload).map_err(|_| EnvelopeError::DecryptionFailure)
    }

    pub fn to_json(&self) -> String {
        // Serializing plain strings cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

mod b64 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::tests::test_pairs;
    use crate::crypto::secret::{NONCE_SIZE, TAG_SIZE};

    #[test]
    fn test_seal_open() {
        let (pair, _) = test_pairs();
        let envelope = Envelope::seal(b"hello bob", &pair.public).unwrap();
        assert_eq!(envelope.iv.len(), NONCE_SIZE);
        assert_eq!(envelope.ciphertext.len(), b"hello bob".len() + TAG_SIZE);
        assert_eq!(envelope.wrapped_key.len(), 256);
        assert_eq!(envelope.open(&pair.private).unwrap(), b"hello bob");
    }

    #[test]
    fn test_seal_is_fresh() {
        let (pair, _) = test_pairs();
        let a = Envelope::seal(b"same", &pair.public).unwrap();
        let b = Envelope::seal(b"same", &pair.public).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.wrapped_key, b.wrapped_key);
    }

    #[test]
    fn test_wire_field_names() {
        let (pair, _) = test_pairs();
        let envelope = Envelope::seal(b"x", &pair.public).unwrap();
        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("ivBase64").is_some());
        assert!(value.get("encryptedAesKeyBase64").is_some());
        assert!(value.get("encryptedDataBytesBase64").is_some());

        let parsed = Envelope::from_json(&envelope.to_json()).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_malformed_json_is_decryption_failure() {
        let err = Envelope::from_json("{\"ivBase64\": 5}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailure);
    }
}
