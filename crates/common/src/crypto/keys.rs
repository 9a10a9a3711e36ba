use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Modulus size of every identity key pair
pub const KEY_BITS: usize = 2048;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("invalid base64 key material: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Public half of an identity key pair
///
/// Travels as base64 of the SubjectPublicKeyInfo DER encoding, which is
/// what the Android client's `PublicKey.encoded` produces.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Parse a base64 SPKI DER public key
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let der = BASE64.decode(encoded.trim())?;
        Self::from_der(&der)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, KeyError> {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| anyhow::anyhow!("public key decode error: {}", e))?;
        Ok(Self(key))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, KeyError> {
        let doc = self
            .0
            .to_public_key_der()
            .map_err(|e| anyhow::anyhow!("public key encode error: {}", e))?;
        Ok(doc.as_bytes().to_vec())
    }

    pub fn to_base64(&self) -> Result<String, KeyError> {
        Ok(BASE64.encode(self.to_der()?))
    }

    pub(crate) fn inner(&self) -> &RsaPublicKey {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_base64() {
            Ok(b64) => write!(f, "PublicKey({}..)", &b64[..b64.len().min(24)]),
            Err(_) => f.write_str("PublicKey(<unencodable>)"),
        }
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = self.to_base64().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        PublicKey::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Private half of an identity key pair
///
/// Never leaves the device except through the portable export. Encoded as
/// base64 of PKCS#8 DER.
#[derive(Clone)]
pub struct PrivateKey(RsaPrivateKey);

impl PrivateKey {
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let der = BASE64.decode(encoded.trim())?;
        let key = RsaPrivateKey::from_pkcs8_der(&der)
            .map_err(|e| anyhow::anyhow!("private key decode error: {}", e))?;
        Ok(Self(key))
    }

    pub fn to_base64(&self) -> Result<String, KeyError> {
        let doc = self
            .0
            .to_pkcs8_der()
            .map_err(|e| anyhow::anyhow!("private key encode error: {}", e))?;
        Ok(BASE64.encode(doc.as_bytes()))
    }

    /// Derive the matching public key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    pub(crate) fn inner(&self) -> &RsaPrivateKey {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// An identity's asymmetric key pair
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl KeyPair {
    /// Generate a fresh RSA-2048 key pair from the OS RNG
    pub fn generate() -> Result<Self, KeyError> {
        let private = RsaPrivateKey::new(&mut OsRng, KEY_BITS)
            .map_err(|e| anyhow::anyhow!("key generation failed: {}", e))?;
        let public = private.to_public_key();
        Ok(Self {
            public: PublicKey(public),
            private: PrivateKey(private),
        })
    }

    /// Assemble a pair, checking that both halves belong together
    pub fn from_parts(public: PublicKey, private: PrivateKey) -> Result<Self, KeyError> {
        if private.public() != public {
            return Err(anyhow::anyhow!("public key does not match private key").into());
        }
        Ok(Self { public, private })
    }
}
