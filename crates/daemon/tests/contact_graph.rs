mod common;

use ::common::ErrorKind;

use crate::common::{befriend, cast, cast_on, setup_with_cap};

#[tokio::test]
async fn test_request_accept_lifecycle() {
    let cast = cast().await;
    let contacts = cast.state.contacts();

    contacts.request(cast.alice, cast.bob).await.unwrap();

    let alice_view = contacts.list_for(cast.alice).await.unwrap();
    assert_eq!(alice_view.pending, vec![cast.bob]);
    assert!(alice_view.contacts.is_empty());
    let bob_view = contacts.list_for(cast.bob).await.unwrap();
    assert_eq!(bob_view.incoming, vec![cast.alice]);

    // Pending edges grant nothing
    assert!(!contacts.can_access(cast.alice, cast.bob).await.unwrap());

    contacts.accept(cast.bob, cast.alice).await.unwrap();

    let alice_view = contacts.list_for(cast.alice).await.unwrap();
    assert_eq!(alice_view.contacts, vec![cast.bob]);
    assert!(alice_view.pending.is_empty());
    assert!(alice_view.incoming.is_empty());
    assert!(contacts.can_access(cast.alice, cast.bob).await.unwrap());
    assert!(contacts.can_access(cast.bob, cast.alice).await.unwrap());
}

#[tokio::test]
async fn test_existing_edge_conflicts_in_either_direction() {
    let cast = cast().await;
    let contacts = cast.state.contacts();

    contacts.request(cast.alice, cast.bob).await.unwrap();

    let again = contacts.request(cast.alice, cast.bob).await.unwrap_err();
    assert_eq!(again.kind(), ErrorKind::Conflict);
    let reverse = contacts.request(cast.bob, cast.alice).await.unwrap_err();
    assert_eq!(reverse.kind(), ErrorKind::Conflict);

    contacts.accept(cast.bob, cast.alice).await.unwrap();
    let after_accept = contacts.request(cast.bob, cast.alice).await.unwrap_err();
    assert_eq!(after_accept.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_self_and_unknown_targets() {
    let cast = cast().await;
    let contacts = cast.state.contacts();

    let own = contacts.request(cast.alice, cast.alice).await.unwrap_err();
    assert_eq!(own.kind(), ErrorKind::Conflict);

    let unknown = contacts.request(cast.alice, 9_999).await.unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_accept_without_matching_request_is_not_found() {
    let cast = cast().await;
    let contacts = cast.state.contacts();

    // Nothing pending at all
    let err = contacts.accept(cast.bob, cast.alice).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "contact request not found");
    assert!(contacts.list_for(cast.alice).await.unwrap().pending.is_empty());

    // The requester cannot accept their own request
    contacts.request(cast.alice, cast.bob).await.unwrap();
    let err = contacts.accept(cast.alice, cast.bob).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!contacts.can_access(cast.alice, cast.bob).await.unwrap());
}

#[tokio::test]
async fn test_remove_is_idempotent_from_any_state() {
    let cast = cast().await;
    let contacts = cast.state.contacts();

    // Pending, removed by the target
    contacts.request(cast.alice, cast.bob).await.unwrap();
    contacts.remove(cast.bob, cast.alice).await.unwrap();
    contacts.remove(cast.bob, cast.alice).await.unwrap();
    assert_eq!(
        contacts.list_for(cast.alice).await.unwrap(),
        ::common::types::ContactList {
            user_id: cast.alice,
            ..Default::default()
        }
    );

    // Authorized, removed by the requester
    befriend(&cast.state, cast.alice, cast.bob).await;
    contacts.remove(cast.alice, cast.bob).await.unwrap();
    contacts.remove(cast.alice, cast.bob).await.unwrap();
    assert!(!contacts.can_access(cast.alice, cast.bob).await.unwrap());

    // The pair is free to start over
    contacts.request(cast.bob, cast.alice).await.unwrap();
}

#[tokio::test]
async fn test_cap_limits_requests_and_accepts() {
    let cast = cast_on(setup_with_cap(1).await).await;
    let contacts = cast.state.contacts();

    befriend(&cast.state, cast.alice, cast.bob).await;

    // Alice is full, so she cannot ask for more
    let err = contacts.request(cast.alice, cast.carol).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

    // Nor can she accept Carol's request
    contacts.request(cast.carol, cast.alice).await.unwrap();
    let err = contacts.accept(cast.alice, cast.carol).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(
        contacts.list_for(cast.alice).await.unwrap().incoming,
        vec![cast.carol]
    );

    // Freeing a slot lets the accept through
    contacts.remove(cast.alice, cast.bob).await.unwrap();
    contacts.accept(cast.alice, cast.carol).await.unwrap();
    assert_eq!(
        contacts.list_for(cast.alice).await.unwrap().contacts,
        vec![cast.carol]
    );
}

#[tokio::test]
async fn test_audience_is_contacts_plus_owner() {
    let cast = cast().await;
    let contacts = cast.state.contacts();

    befriend(&cast.state, cast.alice, cast.bob).await;
    contacts.request(cast.carol, cast.alice).await.unwrap();

    let mut audience = contacts.audience(cast.alice).await.unwrap();
    audience.sort();
    let mut expected = vec![cast.alice, cast.bob];
    expected.sort();
    assert_eq!(audience, expected);

    // Owners always reach their own grid
    assert!(contacts.can_access(cast.carol, cast.carol).await.unwrap());
    assert!(!contacts.can_access(cast.alice, cast.carol).await.unwrap());
}
