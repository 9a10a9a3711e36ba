mod common;

use ::common::types::{ChangeEvent, ChangeKind};
use tiletalk_daemon::database::models::TilePatch;

use crate::common::{befriend, cast, fields};

#[tokio::test]
async fn test_grid_audience_hears_about_changes() {
    let cast = cast().await;
    befriend(&cast.state, cast.alice, cast.bob).await;
    let hub = cast.state.hub();

    let mut alice = hub.register(cast.alice);
    let mut bob = hub.register(cast.bob);
    let mut carol = hub.register(cast.carol);

    let tile = cast
        .state
        .tiles()
        .create_tile(cast.alice, 3, 2, fields("🔔"), cast.bob)
        .await
        .unwrap();

    let expected = ChangeEvent {
        kind: ChangeKind::TileChanged,
        owner_id: cast.alice,
        x: 3,
        y: 2,
        actor_id: cast.bob,
    };
    assert_eq!(alice.events.recv().await, Some(expected));
    assert_eq!(bob.events.recv().await, Some(expected));
    assert!(carol.events.try_recv().is_err());

    let sealed = cast.seal("ding", cast.alice, cast.bob).await;
    cast.state
        .tiles()
        .create_message(cast.alice, 3, 2, &sealed, cast.bob)
        .await
        .unwrap();
    let event = alice.events.recv().await.unwrap();
    assert_eq!(event.kind, ChangeKind::MessageChanged);
    assert_eq!((event.x, event.y), (tile.x_coord, tile.y_coord));
    assert!(carol.events.try_recv().is_err());
}

#[tokio::test]
async fn test_reads_are_silent() {
    let cast = cast().await;
    let tile = cast
        .state
        .tiles()
        .create_tile(cast.alice, 0, 0, fields("a"), cast.alice)
        .await
        .unwrap();

    let mut alice = cast.state.hub().register(cast.alice);
    cast.state
        .tiles()
        .read_tile(cast.alice, 0, 0, cast.alice)
        .await
        .unwrap();
    cast.state
        .tiles()
        .read_messages(cast.alice, 0, 0, cast.alice)
        .await
        .unwrap();
    // An empty patch changes nothing, so nobody is told
    cast.state
        .tiles()
        .update_tile(tile.id, TilePatch::default(), cast.alice)
        .await
        .unwrap();
    assert!(alice.events.try_recv().is_err());
}

#[tokio::test]
async fn test_mutations_succeed_with_nobody_listening() {
    let cast = cast().await;
    befriend(&cast.state, cast.alice, cast.bob).await;
    assert_eq!(cast.state.hub().connected_count(), 0);

    let tiles = cast.state.tiles();
    let tile = tiles
        .create_tile(cast.alice, 1, 1, fields("a"), cast.alice)
        .await
        .unwrap();
    let sealed = cast.seal("into the void", cast.alice, cast.bob).await;
    tiles
        .create_message(cast.alice, 1, 1, &sealed, cast.bob)
        .await
        .unwrap();
    tiles
        .delete_message(cast.alice, 1, 1, cast.bob)
        .await
        .unwrap();
    tiles.delete_tile(tile.id, cast.alice).await.unwrap();
}

#[tokio::test]
async fn test_removed_contact_stops_hearing() {
    let cast = cast().await;
    befriend(&cast.state, cast.alice, cast.bob).await;
    let mut bob = cast.state.hub().register(cast.bob);

    cast.state
        .contacts()
        .remove(cast.alice, cast.bob)
        .await
        .unwrap();
    cast.state
        .tiles()
        .create_tile(cast.alice, 0, 0, fields("a"), cast.alice)
        .await
        .unwrap();
    assert!(bob.events.try_recv().is_err());
}

#[tokio::test]
async fn test_reconnect_replaces_and_stale_close_is_ignored() {
    let cast = cast().await;
    let hub = cast.state.hub();

    let mut old = hub.register(cast.alice);
    let mut new = hub.register(cast.alice);
    assert_eq!(old.events.recv().await, None);

    // The old socket's cleanup runs after the new one registered
    assert!(!hub.deregister(cast.alice, old.connection_id));

    cast.state
        .tiles()
        .create_tile(cast.alice, 2, 2, fields("a"), cast.alice)
        .await
        .unwrap();
    assert_eq!(
        new.events.recv().await.map(|e| e.kind),
        Some(ChangeKind::TileChanged)
    );

    assert!(hub.deregister(cast.alice, new.connection_id));
    assert!(!hub.is_connected(cast.alice));
}
