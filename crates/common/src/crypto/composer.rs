//! Multi-recipient composition
//!
//! One plaintext becomes one [`Envelope`] per audience member that has a
//! published public key. The tile owner must always be able to read what was
//! written to their grid, so a composition that leaves the owner out (when
//! the owner is not the sender) is rejected as a whole.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::envelope::{Envelope, EnvelopeError};
use super::keys::PublicKey;
use crate::error::ErrorKind;
use crate::types::IdentityId;

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("undeliverable: {0}")]
    Undeliverable(String),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl ComposeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComposeError::Undeliverable(_) => ErrorKind::Undeliverable,
            ComposeError::Envelope(e) => e.kind(),
        }
    }
}

/// An audience member and their key, if they have published one
#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: IdentityId,
    pub public_key: Option<PublicKey>,
}

/// An envelope addressed to one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedFor {
    pub recipient_id: IdentityId,
    pub payload: Envelope,
}

/// The audience for a new message on `owner`'s grid written by `sender`:
/// the sender's authorized contacts, the owner and the sender, deduplicated
pub fn compose_audience(
    sender_contacts: &[IdentityId],
    owner: IdentityId,
    sender: IdentityId,
) -> Vec<IdentityId> {
    let mut audience: BTreeSet<IdentityId> = sender_contacts.iter().copied().collect();
    audience.insert(owner);
    audience.insert(sender);
    audience.into_iter().collect()
}

/// Seal `plaintext` once for every recipient that has a public key
///
/// Recipients without a key are skipped. Duplicate ids are sealed once.
pub fn compose(
    plaintext: &[u8],
    audience: &[Recipient],
    owner: IdentityId,
    sender: IdentityId,
) -> Result<Vec<SealedFor>, ComposeError> {
    let mut seen = BTreeSet::new();
    let mut sealed = Vec::with_capacity(audience.len());

    for recipient in audience {
        if !seen.insert(recipient.id) {
            continue;
        }
        let Some(public_key) = recipient.public_key.as_ref() else {
            tracing::debug!(recipient = recipient.id, "skipping recipient without a public key");
            continue;
        };
        sealed.push(SealedFor {
            recipient_id: recipient.id,
            payload: Envelope::seal(plaintext, public_key)?,
        });
    }

    check_deliverable(sealed.iter().map(|s| s.recipient_id), owner, sender)?;
    Ok(sealed)
}

/// Reject recipient sets that are empty, or that miss the owner when the
/// owner is not the sender
///
/// The daemon runs the same check on incoming message sets.
pub fn check_deliverable(
    recipients: impl IntoIterator<Item = IdentityId>,
    owner: IdentityId,
    sender: IdentityId,
) -> Result<(), ComposeError> {
    let recipients: BTreeSet<IdentityId> = recipients.into_iter().collect();
    if recipients.is_empty() {
        return Err(ComposeError::Undeliverable(
            "no recipient has a public key".into(),
        ));
    }
    if owner != sender && !recipients.contains(&owner) {
        return Err(ComposeError::Undeliverable(format!(
            "tile owner {} cannot read this message",
            owner
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::tests::test_pairs;

    fn keyed(id: IdentityId, key: &PublicKey) -> Recipient {
        Recipient {
            id,
            public_key: Some(key.clone()),
        }
    }

    fn keyless(id: IdentityId) -> Recipient {
        Recipient {
            id,
            public_key: None,
        }
    }

    #[test]
    fn test_audience_dedups_and_includes_owner_and_sender() {
        assert_eq!(compose_audience(&[3, 2, 3], 1, 2), vec![1, 2, 3]);
        assert_eq!(compose_audience(&[], 1, 1), vec![1]);
    }

    #[test]
    fn test_one_envelope_per_keyed_recipient() {
        let (a, b) = test_pairs();
        let sealed = compose(
            b"hi",
            &[keyed(1, &a.public), keyed(2, &b.public), keyless(3)],
            1,
            2,
        )
        .unwrap();
        let ids: Vec<_> = sealed.iter().map(|s| s.recipient_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(sealed[0].payload.open(&a.private).unwrap(), b"hi");
        assert_eq!(sealed[1].payload.open(&b.private).unwrap(), b"hi");
    }

    #[test]
    fn test_owner_without_key_is_undeliverable() {
        let (_, b) = test_pairs();
        let err = compose(b"hi", &[keyless(1), keyed(2, &b.public)], 1, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Undeliverable);
    }

    #[test]
    fn test_empty_result_is_undeliverable() {
        let err = compose(b"hi", &[keyless(1)], 1, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Undeliverable);
    }

    #[test]
    fn test_sender_writing_on_own_grid_needs_only_itself() {
        let (a, _) = test_pairs();
        let sealed = compose(b"note to self", &[keyed(1, &a.public), keyless(2)], 1, 1).unwrap();
        assert_eq!(sealed.len(), 1);
    }

    #[test]
    fn test_check_deliverable() {
        assert!(check_deliverable([1, 2], 1, 2).is_ok());
        assert!(check_deliverable([2], 1, 2).is_err());
        assert!(check_deliverable(Vec::<IdentityId>::new(), 1, 1).is_err());
        assert!(check_deliverable([1], 1, 1).is_ok());
    }
}
