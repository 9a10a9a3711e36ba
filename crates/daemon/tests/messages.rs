mod common;

use ::common::crypto::SealedFor;
use ::common::ErrorKind;

use crate::common::{befriend, cast, fields, Cast};

async fn board(cast: &Cast) {
    befriend(&cast.state, cast.alice, cast.bob).await;
    cast.state
        .tiles()
        .create_tile(cast.alice, 0, 0, fields("📬"), cast.alice)
        .await
        .unwrap();
}

async fn cryptogram_count(cast: &Cast) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cryptograms")
        .fetch_one(&**cast.state.database())
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_first_read_marks_seen() {
    let cast = cast().await;
    board(&cast).await;
    let tiles = cast.state.tiles();

    let sealed = cast.seal("hi alice", cast.alice, cast.bob).await;
    tiles
        .create_message(cast.alice, 0, 0, &sealed, cast.bob)
        .await
        .unwrap();

    let first = tiles
        .read_messages(cast.alice, 0, 0, cast.alice)
        .await
        .unwrap();
    assert_eq!(first.messages.len(), 1);
    assert!(!first.messages[0].seen);
    assert_eq!(first.newly_seen, 1);
    assert_eq!(first.messages[0].responder_id, cast.bob);

    let second = tiles
        .read_messages(cast.alice, 0, 0, cast.alice)
        .await
        .unwrap();
    assert!(second.messages[0].seen);
    assert_eq!(second.newly_seen, 0);

    // Bob's own copy is tracked separately
    let bobs = tiles
        .read_messages(cast.alice, 0, 0, cast.bob)
        .await
        .unwrap();
    assert!(!bobs.messages[0].seen);
    assert_eq!(bobs.newly_seen, 1);
}

#[tokio::test]
async fn test_one_message_per_responder_per_tile() {
    let cast = cast().await;
    board(&cast).await;
    let tiles = cast.state.tiles();

    let sealed = cast.seal("first", cast.alice, cast.bob).await;
    tiles
        .create_message(cast.alice, 0, 0, &sealed, cast.bob)
        .await
        .unwrap();

    let again = cast.seal("second", cast.alice, cast.bob).await;
    let err = tiles
        .create_message(cast.alice, 0, 0, &again, cast.bob)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Deleting frees the slot
    tiles
        .delete_message(cast.alice, 0, 0, cast.bob)
        .await
        .unwrap();
    tiles
        .create_message(cast.alice, 0, 0, &again, cast.bob)
        .await
        .unwrap();

    let read = tiles
        .read_messages(cast.alice, 0, 0, cast.alice)
        .await
        .unwrap();
    assert_eq!(read.messages.len(), 1);
    let plaintext = read.messages[0]
        .payload
        .open(&cast.pair_of(cast.alice).private)
        .unwrap();
    assert_eq!(plaintext, b"second");
}

#[tokio::test]
async fn test_message_must_reach_the_owner() {
    let cast = cast().await;
    board(&cast).await;
    let tiles = cast.state.tiles();

    let sealed = cast.seal("secret", cast.alice, cast.bob).await;
    let without_owner: Vec<SealedFor> = sealed
        .into_iter()
        .filter(|s| s.recipient_id != cast.alice)
        .collect();
    let err = tiles
        .create_message(cast.alice, 0, 0, &without_owner, cast.bob)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Undeliverable);

    let err = tiles
        .create_message(cast.alice, 0, 0, &[], cast.bob)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Undeliverable);

    assert_eq!(cryptogram_count(&cast).await, 0);
}

#[tokio::test]
async fn test_failed_cryptogram_rolls_back_the_message() {
    let cast = cast().await;
    board(&cast).await;
    let tiles = cast.state.tiles();

    let mut sealed = cast.seal("partial", cast.alice, cast.bob).await;
    let mut ghost = sealed[0].clone();
    ghost.recipient_id = 9_999;
    sealed.push(ghost);

    let err = tiles
        .create_message(cast.alice, 0, 0, &sealed, cast.bob)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientStoreError);
    assert!(!err.to_string().to_lowercase().contains("foreign key"));
    assert_eq!(cryptogram_count(&cast).await, 0);

    let read = tiles
        .read_messages(cast.alice, 0, 0, cast.alice)
        .await
        .unwrap();
    assert!(read.messages.is_empty());

    // Nothing lingers to block a retry
    let sealed = cast.seal("whole", cast.alice, cast.bob).await;
    tiles
        .create_message(cast.alice, 0, 0, &sealed, cast.bob)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_messages_need_a_tile() {
    let cast = cast().await;
    board(&cast).await;
    let tiles = cast.state.tiles();

    let sealed = cast.seal("nowhere", cast.alice, cast.bob).await;
    let err = tiles
        .create_message(cast.alice, 3, 3, &sealed, cast.bob)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = tiles
        .read_messages(cast.alice, 3, 3, cast.alice)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = tiles
        .delete_message(cast.alice, 0, 0, cast.bob)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_strangers_cannot_post_or_read() {
    let cast = cast().await;
    board(&cast).await;
    let tiles = cast.state.tiles();

    let err = tiles
        .create_message(cast.alice, 0, 0, &[], cast.carol)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);

    let err = tiles
        .read_messages(cast.alice, 0, 0, cast.carol)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
}

#[tokio::test]
async fn test_listing_is_oldest_first_and_per_recipient() {
    let cast = cast().await;
    board(&cast).await;
    befriend(&cast.state, cast.alice, cast.carol).await;
    let tiles = cast.state.tiles();

    let from_alice = cast.seal("one", cast.alice, cast.alice).await;
    tiles
        .create_message(cast.alice, 0, 0, &from_alice, cast.alice)
        .await
        .unwrap();
    let from_bob = cast.seal("two", cast.alice, cast.bob).await;
    tiles
        .create_message(cast.alice, 0, 0, &from_bob, cast.bob)
        .await
        .unwrap();

    let read = tiles
        .read_messages(cast.alice, 0, 0, cast.alice)
        .await
        .unwrap();
    let responders: Vec<_> = read.messages.iter().map(|m| m.responder_id).collect();
    assert_eq!(responders, vec![cast.alice, cast.bob]);

    // Carol was in Alice's audience but not Bob's, so she only sees one
    let carols = tiles
        .read_messages(cast.alice, 0, 0, cast.carol)
        .await
        .unwrap();
    assert_eq!(carols.messages.len(), 1);
    assert_eq!(carols.messages[0].responder_id, cast.alice);
    let plaintext = carols.messages[0]
        .payload
        .open(&cast.pair_of(cast.carol).private)
        .unwrap();
    assert_eq!(plaintext, b"one");
}
