//! Local custody of identity key pairs
//!
//! A [`KeyVault`] maps an identity name to its key pair. Implementations keep
//! the private half encrypted at rest; the only way key material leaves a
//! vault in the clear is [`export_portable`], which exists for manual
//! backup. Whoever holds an exported file can impersonate the identity.

mod fs;
mod memory;

use serde::{Deserialize, Serialize};

use crate::crypto::{KeyError, KeyPair, PrivateKey, PublicKey};

pub use fs::FsKeyVault;
pub use memory::MemoryKeyVault;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("invalid identity name: {0}")]
    InvalidIdentity(String),
    #[error("no key pair stored for {0}")]
    Missing(String),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("vault file is corrupt or was sealed under another master secret")]
    Corrupt,
    #[error("malformed portable key file: {0}")]
    Portable(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for identity key pairs, addressed by identity name
pub trait KeyVault: Send + Sync {
    fn get(&self, identity: &str) -> Result<Option<KeyPair>, VaultError>;

    fn put(&self, identity: &str, pair: &KeyPair) -> Result<(), VaultError>;

    /// Removing an absent identity is not an error
    fn delete(&self, identity: &str) -> Result<(), VaultError>;

    /// Generate a fresh pair for `identity` and store it, replacing any prior pair
    fn generate(&self, identity: &str) -> Result<KeyPair, VaultError> {
        let pair = KeyPair::generate()?;
        self.put(identity, &pair)?;
        tracing::info!(identity, "generated identity key pair");
        Ok(pair)
    }

    /// Like [`KeyVault::get`] but a missing pair is an error
    fn require(&self, identity: &str) -> Result<KeyPair, VaultError> {
        self.get(identity)?
            .ok_or_else(|| VaultError::Missing(identity.to_string()))
    }
}

/// The backup file format: `{"publicKey": "...", "privateKey": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableKeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl TryFrom<&KeyPair> for PortableKeyPair {
    type Error = KeyError;

    fn try_from(pair: &KeyPair) -> Result<Self, Self::Error> {
        Ok(Self {
            public_key: pair.public.to_base64()?,
            private_key: pair.private.to_base64()?,
        })
    }
}

impl TryFrom<PortableKeyPair> for KeyPair {
    type Error = KeyError;

    fn try_from(portable: PortableKeyPair) -> Result<Self, Self::Error> {
        let public = PublicKey::from_base64(&portable.public_key)?;
        let private = PrivateKey::from_base64(&portable.private_key)?;
        KeyPair::from_parts(public, private)
    }
}

/// Serialize a key pair to the portable backup format
pub fn export_portable(pair: &KeyPair) -> Result<Vec<u8>, VaultError> {
    let portable = PortableKeyPair::try_from(pair)?;
    Ok(serde_json::to_vec_pretty(&portable)?)
}

/// Parse a portable backup, checking that both halves belong together
pub fn import_portable(bytes: &[u8]) -> Result<KeyPair, VaultError> {
    let portable: PortableKeyPair = serde_json::from_slice(bytes)?;
    Ok(KeyPair::try_from(portable)?)
}

/// Identity names double as file names, so keep them to a safe charset
pub(crate) fn check_identity(identity: &str) -> Result<(), VaultError> {
    let valid = !identity.is_empty()
        && identity.len() <= 64
        && identity
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(VaultError::InvalidIdentity(identity.to_string()))
    }
}
