use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{check_identity, KeyVault, VaultError};
use crate::crypto::KeyPair;

/// Process-local vault, mostly useful for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyVault {
    inner: Arc<RwLock<HashMap<String, KeyPair>>>,
}

impl MemoryKeyVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyVault for MemoryKeyVault {
    fn get(&self, identity: &str) -> Result<Option<KeyPair>, VaultError> {
        check_identity(identity)?;
        Ok(self.inner.read().get(identity).cloned())
    }

    fn put(&self, identity: &str, pair: &KeyPair) -> Result<(), VaultError> {
        check_identity(identity)?;
        self.inner.write().insert(identity.to_string(), pair.clone());
        Ok(())
    }

    fn delete(&self, identity: &str) -> Result<(), VaultError> {
        check_identity(identity)?;
        self.inner.write().remove(identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::tests::test_pairs;

    #[test]
    fn test_put_get_delete() {
        let vault = MemoryKeyVault::new();
        let (pair, _) = test_pairs();

        assert!(vault.get("alice").unwrap().is_none());
        vault.put("alice", pair).unwrap();
        assert_eq!(vault.get("alice").unwrap().unwrap().public, pair.public);

        vault.delete("alice").unwrap();
        assert!(vault.get("alice").unwrap().is_none());
        vault.delete("alice").unwrap();
        assert!(matches!(vault.require("alice"), Err(VaultError::Missing(_))));
    }
}
