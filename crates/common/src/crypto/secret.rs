//! Content encryption using AES-256-GCM
//!
//! Every envelope seals its plaintext under a fresh `Secret`. The same type
//! also encrypts vault files at rest under the device master secret.

use std::ops::Deref;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};

/// Size of the AES-GCM nonce (IV) in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of an AES-256 key in bytes
pub const SECRET_SIZE: usize = 32;
/// Size of the GCM authentication tag appended to every ciphertext
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret error: {0}")]
    Default(#[from] anyhow::Error),
}

/// A 256-bit symmetric key
///
/// Ciphertexts carry the 128-bit GCM tag at the end, matching the layout
/// produced by `AES/GCM/NoPadding` on the JVM.
///
/// # Examples
///
/// ```ignore
/// let secret = Secret::generate();
/// let (iv, ciphertext) = secret.seal(b"hello")?;
/// let plaintext = secret.open(&iv, &ciphertext)?;
/// ```
#[derive(PartialEq, Clone, Serialize, Deserialize)]
pub struct Secret([u8; SECRET_SIZE]);

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl Deref for Secret {
    type Target = [u8; SECRET_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

impl Secret {
    /// Generate a new random secret using a cryptographically secure RNG
    pub fn generate() -> Self {
        let mut buff = [0; SECRET_SIZE];
        getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
        Self(buff)
    }

    /// Create a secret from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SECRET_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        if data.len() != SECRET_SIZE {
            return Err(anyhow::anyhow!(
                "invalid secret size, expected {}, got {}",
                SECRET_SIZE,
                data.len()
            )
            .into());
        }
        let mut buff = [0; SECRET_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.bytes()))
    }

    /// Encrypt under a fresh random IV, returning `(iv, ciphertext || tag)`
    pub fn seal(&self, data: &[u8]) -> Result<([u8; NONCE_SIZE], Vec<u8>), SecretError> {
        let mut iv = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut iv)
            .map_err(|e| anyhow::anyhow!("failed to generate nonce: {}", e))?;
        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&iv), data)
            .map_err(|_| anyhow::anyhow!("encrypt error"))?;
        Ok((iv, ciphertext))
    }

    /// Decrypt `ciphertext || tag` under the given IV
    ///
    /// # Errors
    ///
    /// Returns an error if the IV has the wrong length or the tag does not verify.
    pub fn open(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, SecretError> {
        if iv.len() != NONCE_SIZE {
            return Err(anyhow::anyhow!(
                "invalid nonce size, expected {}, got {}",
                NONCE_SIZE,
                iv.len()
            )
            .into());
        }
        if ciphertext.len() < TAG_SIZE {
            return Err(anyhow::anyhow!("ciphertext too short for tag").into());
        }
        self.cipher()
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| anyhow::anyhow!("decrypt error").into())
    }

    /// Encrypt into a single buffer: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let (iv, ciphertext) = self.seal(data)?;
        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt a buffer produced by [`Secret::encrypt`]
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE {
            return Err(anyhow::anyhow!("data too short for nonce").into());
        }
        self.open(&data[..NONCE_SIZE], &data[NONCE_SIZE..])
    }
}
