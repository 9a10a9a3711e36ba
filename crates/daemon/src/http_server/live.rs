//! The live channel: one WebSocket per identity carrying change hints
//!
//! Frames are JSON [`ChangeEvent`]s. Anything the client sends besides a
//! close is ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{Sink, SinkExt, StreamExt};

use common::types::{ChangeEvent, IdentityId};

use crate::http_server::auth::Caller;
use crate::notify::{NotificationHub, Subscription};
use crate::ServiceState;

pub async fn handler(
    caller: Caller,
    State(state): State<ServiceState>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = state.hub().clone();
    ws.on_upgrade(move |socket| serve(socket, caller.id(), hub))
}

async fn serve(socket: WebSocket, identity: IdentityId, hub: NotificationHub) {
    let Subscription {
        connection_id,
        mut events,
    } = hub.register(identity);
    let (mut outgoing, mut incoming) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                // None means a newer connection replaced this one
                let Some(event) = event else { break };
                if forward(&mut outgoing, &event).await.is_err() {
                    break;
                }
            }
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    let _ = outgoing.close().await;
    hub.deregister(identity, connection_id);
}

async fn forward<S>(outgoing: &mut S, event: &ChangeEvent) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    match serde_json::to_string(event) {
        Ok(text) => outgoing.send(Message::Text(text)).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode live hint");
            Ok(())
        }
    }
}
