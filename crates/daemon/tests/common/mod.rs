#![allow(dead_code)]

use std::sync::OnceLock;

use ::common::crypto::{compose, compose_audience, KeyPair, Recipient, SealedFor};
use ::common::types::IdentityId;
use tiletalk_daemon::database::models::TileFields;
use tiletalk_daemon::database::Database;
use tiletalk_daemon::ServiceState;

/// Key pairs for alice, bob and carol, generated once per test binary
pub fn pairs() -> &'static [KeyPair; 3] {
    static PAIRS: OnceLock<[KeyPair; 3]> = OnceLock::new();
    PAIRS.get_or_init(|| {
        [
            KeyPair::generate().expect("alice key"),
            KeyPair::generate().expect("bob key"),
            KeyPair::generate().expect("carol key"),
        ]
    })
}

pub struct Cast {
    pub state: ServiceState,
    pub alice: IdentityId,
    pub bob: IdentityId,
    pub carol: IdentityId,
}

impl Cast {
    pub fn pair_of(&self, id: IdentityId) -> &'static KeyPair {
        let [alice, bob, carol] = pairs();
        if id == self.alice {
            alice
        } else if id == self.bob {
            bob
        } else if id == self.carol {
            carol
        } else {
            panic!("no key pair for identity {}", id)
        }
    }

    /// Seal `text` the way the CLI does: the sender's contacts plus owner
    /// and sender, each under their published key
    pub async fn seal(&self, text: &str, owner: IdentityId, sender: IdentityId) -> Vec<SealedFor> {
        let contacts = self
            .state
            .contacts()
            .authorized_contacts(sender)
            .await
            .unwrap();
        let audience = compose_audience(&contacts, owner, sender);
        let recipients: Vec<Recipient> = audience
            .iter()
            .map(|&id| Recipient {
                id,
                public_key: Some(self.pair_of(id).public.clone()),
            })
            .collect();
        compose(text.as_bytes(), &recipients, owner, sender).unwrap()
    }
}

/// In-memory state with the default contact cap
pub async fn setup() -> ServiceState {
    ServiceState::in_memory().await.expect("in-memory state")
}

/// In-memory state with a custom contact cap
pub async fn setup_with_cap(max_contacts: i64) -> ServiceState {
    let db = Database::in_memory().await.expect("in-memory database");
    ServiceState::from_database(db, max_contacts, 8)
}

/// Register alice, bob and carol with published keys. Nobody is connected.
pub async fn cast() -> Cast {
    cast_on(setup().await).await
}

pub async fn cast_on(state: ServiceState) -> Cast {
    let [alice_pair, bob_pair, carol_pair] = pairs();
    let mut ids = Vec::new();
    for (name, pair) in [("alice", alice_pair), ("bob", bob_pair), ("carol", carol_pair)] {
        let key = pair.public.to_base64().unwrap();
        let identity = state
            .identities()
            .register(name, Some(&key))
            .await
            .expect("register");
        ids.push(identity.id);
    }
    Cast {
        state,
        alice: ids[0],
        bob: ids[1],
        carol: ids[2],
    }
}

/// Make `a` and `b` mutually authorized contacts
pub async fn befriend(state: &ServiceState, a: IdentityId, b: IdentityId) {
    state.contacts().request(a, b).await.expect("request");
    state.contacts().accept(b, a).await.expect("accept");
}

pub fn fields(symbol: &str) -> TileFields {
    TileFields {
        symbol: Some(symbol.to_string()),
        ..Default::default()
    }
}
