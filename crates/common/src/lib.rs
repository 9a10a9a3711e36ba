/**
 * Cryptographic types and operations.
 *  - RSA identity key pairs
 *  - AES-256-GCM content secrets
 *  - Single and multi-recipient hybrid envelopes
 */
pub mod crypto;
/**
 * The closed set of failure kinds shared by the
 *  daemon and its clients.
 */
pub mod error;
/**
 * Wire types exchanged between the daemon, the
 *  live channel and the CLI.
 */
pub mod types;
/**
 * Local custody of identity key pairs, plus the
 *  portable backup format.
 */
pub mod vault;

pub use error::ErrorKind;

pub mod prelude {
    pub use crate::crypto::{
        compose, compose_audience, Envelope, EnvelopeError, KeyPair, PrivateKey, PublicKey,
        Recipient, SealedFor,
    };
    pub use crate::error::ErrorKind;
    pub use crate::types::{ChangeEvent, ChangeKind, ContactList, IdentityId, GRID_SIZE};
    pub use crate::vault::{KeyVault, VaultError};
}
