//! Cryptographic primitives for TileTalk
//!
//! - **Identity keys**: RSA-2048 key pairs (`KeyPair`), generated and kept on
//!   the device. Public keys travel as base64 SPKI DER, private keys as base64
//!   PKCS#8 DER.
//! - **Content encryption**: AES-256-GCM `Secret`s with a 96-bit IV and a
//!   128-bit tag.
//! - **Envelopes**: a fresh `Secret` per seal, wrapped under the recipient's
//!   public key. See [`envelope`] for the note on the wrap padding.
//! - **Composition**: one envelope per audience member, with the rule that the
//!   tile owner must always be a recipient.
//!
//! The server only ever stores envelopes. It never sees a private key or a
//! plaintext.

mod composer;
pub mod envelope;
pub(crate) mod keys;
mod secret;

pub use composer::{
    check_deliverable, compose, compose_audience, ComposeError, Recipient, SealedFor,
};
pub use envelope::{Envelope, EnvelopeError};
pub use keys::{KeyError, KeyPair, PrivateKey, PublicKey, KEY_BITS};
pub use secret::{Secret, SecretError, NONCE_SIZE, SECRET_SIZE, TAG_SIZE};
