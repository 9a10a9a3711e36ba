mod common;

use ::common::crypto::Envelope;
use ::common::vault::{export_portable, import_portable, FsKeyVault, KeyVault, MemoryKeyVault};

#[test]
fn test_generated_pair_survives_device_restart() {
    let dir = tempfile::tempdir().unwrap();

    let vault = FsKeyVault::open(dir.path()).unwrap();
    let pair = vault.generate("alice").unwrap();
    let envelope = Envelope::seal(b"sealed before restart", &pair.public).unwrap();
    drop(vault);

    let vault = FsKeyVault::open(dir.path()).unwrap();
    let restored = vault.require("alice").unwrap();
    assert_eq!(
        envelope.open(&restored.private).unwrap(),
        b"sealed before restart"
    );
}

#[test]
fn test_backup_restores_on_another_device() {
    let [alice, _, _] = common::pairs();
    let phone = tempfile::tempdir().unwrap();
    let tablet = tempfile::tempdir().unwrap();

    let phone_vault = FsKeyVault::open(phone.path()).unwrap();
    phone_vault.put("alice", alice).unwrap();
    let backup = export_portable(&phone_vault.require("alice").unwrap()).unwrap();

    let tablet_vault = FsKeyVault::open(tablet.path()).unwrap();
    tablet_vault.put("alice", &import_portable(&backup).unwrap()).unwrap();

    let envelope = Envelope::seal(b"hello tablet", &alice.public).unwrap();
    let restored = tablet_vault.require("alice").unwrap();
    assert_eq!(envelope.open(&restored.private).unwrap(), b"hello tablet");
}

#[test]
fn test_vault_implementations_agree() {
    let [alice, bob, _] = common::pairs();
    let dir = tempfile::tempdir().unwrap();
    let vaults: Vec<Box<dyn KeyVault>> = vec![
        Box::new(MemoryKeyVault::new()),
        Box::new(FsKeyVault::open(dir.path()).unwrap()),
    ];

    for vault in vaults {
        vault.put("alice", alice).unwrap();
        vault.put("alice", bob).unwrap();
        assert_eq!(vault.require("alice").unwrap().public, bob.public);

        vault.delete("alice").unwrap();
        assert!(vault.get("alice").unwrap().is_none());
        assert!(vault.get("../alice").is_err());
    }
}
