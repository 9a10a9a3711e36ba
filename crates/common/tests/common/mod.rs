//! Shared test utilities for envelope and vault tests
#![allow(dead_code)]

use std::sync::OnceLock;

use common::crypto::KeyPair;

/// Key pairs for three identities, generated once per test binary
pub fn pairs() -> &'static [KeyPair; 3] {
    static PAIRS: OnceLock<[KeyPair; 3]> = OnceLock::new();
    PAIRS.get_or_init(|| {
        [
            KeyPair::generate().unwrap(),
            KeyPair::generate().unwrap(),
            KeyPair::generate().unwrap(),
        ]
    })
}
