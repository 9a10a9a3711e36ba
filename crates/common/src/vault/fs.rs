use std::fs;
use std::path::{Path, PathBuf};

use super::{check_identity, export_portable, import_portable, KeyVault, VaultError};
use crate::crypto::{KeyPair, Secret, SECRET_SIZE};

/// Name of the device-scoped master secret inside the vault directory
pub const MASTER_KEY_FILE_NAME: &str = "master.key";
const KEY_FILE_EXTENSION: &str = "key";

/// Directory-backed vault
///
/// Each identity's portable key file is sealed with AES-256-GCM under a
/// master secret generated once per device and stored beside it.
#[derive(Debug, Clone)]
pub struct FsKeyVault {
    dir: PathBuf,
    master: Secret,
}

impl FsKeyVault {
    /// Open the vault at `dir`, creating it and its master secret if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, VaultError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let master_path = dir.join(MASTER_KEY_FILE_NAME);
        let master = if master_path.exists() {
            let bytes = fs::read(&master_path)?;
            if bytes.len() != SECRET_SIZE {
                return Err(VaultError::Corrupt);
            }
            Secret::from_slice(&bytes).map_err(|_| VaultError::Corrupt)?
        } else {
            let master = Secret::generate();
            write_private(&master_path, master.bytes())?;
            tracing::info!(path = %master_path.display(), "created vault master secret");
            master
        };

        Ok(Self { dir, master })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, identity: &str) -> Result<PathBuf, VaultError> {
        check_identity(identity)?;
        Ok(self
            .dir
            .join(format!("{}.{}", identity, KEY_FILE_EXTENSION)))
    }
}

impl KeyVault for FsKeyVault {
    fn get(&self, identity: &str) -> Result<Option<KeyPair>, VaultError> {
        let path = self.path_for(identity)?;
        if !path.exists() {
            return Ok(None);
        }
        let sealed = fs::read(&path)?;
        let portable = self
            .master
            .decrypt(&sealed)
            .map_err(|_| VaultError::Corrupt)?;
        Ok(Some(import_portable(&portable)?))
    }

    fn put(&self, identity: &str, pair: &KeyPair) -> Result<(), VaultError> {
        let path = self.path_for(identity)?;
        let portable = export_portable(pair)?;
        let sealed = self
            .master
            .encrypt(&portable)
            .map_err(|_| VaultError::Corrupt)?;
        write_private(&path, &sealed)?;
        Ok(())
    }

    fn delete(&self, identity: &str) -> Result<(), VaultError> {
        let path = self.path_for(identity)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), VaultError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), VaultError> {
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::tests::test_pairs;

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (pair, _) = test_pairs();

        let vault = FsKeyVault::open(dir.path()).unwrap();
        vault.put("alice", pair).unwrap();
        drop(vault);

        let reopened = FsKeyVault::open(dir.path()).unwrap();
        let loaded = reopened.get("alice").unwrap().unwrap();
        assert_eq!(loaded.public, pair.public);
    }

    #[test]
    fn test_file_is_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let (pair, _) = test_pairs();
        let vault = FsKeyVault::open(dir.path()).unwrap();
        vault.put("alice", pair).unwrap();

        let raw = fs::read(dir.path().join("alice.key")).unwrap();
        let needle = pair.private.to_base64().unwrap();
        assert!(!String::from_utf8_lossy(&raw).contains(&needle[..32]));
    }

    #[test]
    fn test_other_master_cannot_read() {
        let (pair, _) = test_pairs();
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();

        let vault_a = FsKeyVault::open(a.path()).unwrap();
        vault_a.put("alice", pair).unwrap();
        let _vault_b = FsKeyVault::open(b.path()).unwrap();

        fs::copy(a.path().join("alice.key"), b.path().join("alice.key")).unwrap();
        let vault_b = FsKeyVault::open(b.path()).unwrap();
        assert!(matches!(vault_b.get("alice"), Err(VaultError::Corrupt)));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsKeyVault::open(dir.path()).unwrap();
        vault.delete("nobody").unwrap();
        assert!(vault.get("nobody").unwrap().is_none());
    }
}
