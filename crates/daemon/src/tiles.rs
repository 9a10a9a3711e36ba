//! Coordinate-addressed tiles, messages and cryptograms
//!
//! Every operation checks grid access through [`ContactGraph`] before
//! touching the store, and every successful mutation publishes a hint to the
//! grid's audience through [`NotificationHub`]. A hint that cannot be
//! computed or delivered never affects the mutation's outcome.

use common::crypto::{check_deliverable, SealedFor};
use common::types::{in_bounds, ChangeEvent, ChangeKind, IdentityId};

use crate::contacts::ContactGraph;
use crate::database::models::{
    Message, MessageWriteError, ReadMessages, Tile, TileFields, TilePatch,
};
use crate::database::{is_unique_violation, Database};
use crate::error::ServiceError;
use crate::notify::NotificationHub;

#[derive(Debug, Clone)]
pub struct TileStore {
    db: Database,
    contacts: ContactGraph,
    hub: NotificationHub,
}

fn check_bounds(x: i64, y: i64) -> Result<(), ServiceError> {
    if in_bounds(x, y) {
        Ok(())
    } else {
        Err(ServiceError::OutOfBounds(format!(
            "({}, {}) is outside the grid",
            x, y
        )))
    }
}

fn tile_missing(owner: IdentityId, x: i64, y: i64) -> ServiceError {
    ServiceError::NotFound(format!("no tile at ({}, {}) on grid {}", x, y, owner))
}

impl TileStore {
    pub fn new(db: Database, contacts: ContactGraph, hub: NotificationHub) -> Self {
        Self { db, contacts, hub }
    }

    pub fn contacts(&self) -> &ContactGraph {
        &self.contacts
    }

    /// Populate an empty cell on `owner`'s grid; the caller becomes its starter
    pub async fn create_tile(
        &self,
        owner: IdentityId,
        x: i64,
        y: i64,
        fields: TileFields,
        caller: IdentityId,
    ) -> Result<Tile, ServiceError> {
        self.contacts.ensure_access(owner, caller).await?;
        check_bounds(x, y)?;

        let tile = match Tile::create(owner, x, y, caller, fields, &self.db).await {
            Ok(tile) => tile,
            Err(e) if is_unique_violation(&e) => {
                return Err(ServiceError::Conflict(format!(
                    "tile ({}, {}) on grid {} is already populated",
                    x, y, owner
                )))
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(tile = tile.id, owner, x, y, starter = caller, "tile created");
        self.announce(ChangeKind::TileChanged, owner, x, y, caller).await;
        Ok(tile)
    }

    pub async fn read_tile(
        &self,
        owner: IdentityId,
        x: i64,
        y: i64,
        caller: IdentityId,
    ) -> Result<Tile, ServiceError> {
        self.contacts.ensure_access(owner, caller).await?;
        check_bounds(x, y)?;
        Tile::get_at(owner, x, y, &self.db)
            .await?
            .ok_or_else(|| tile_missing(owner, x, y))
    }

    /// Change presentation fields. Only the owner or the starter may.
    pub async fn update_tile(
        &self,
        id: i64,
        patch: TilePatch,
        caller: IdentityId,
    ) -> Result<Tile, ServiceError> {
        let tile = self.load_for_caller(id, caller).await?;

        if tile.owner_id != caller && tile.starter_id != caller {
            return Err(ServiceError::AuthorizationDenied(
                "only the tile owner or starter may change it".into(),
            ));
        }
        if patch.is_empty() {
            return Ok(tile);
        }

        let updated = Tile::update(id, patch, &self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("tile {} not found", id)))?;

        tracing::info!(tile = id, by = caller, "tile updated");
        self.announce(
            ChangeKind::TileChanged,
            updated.owner_id,
            updated.x_coord,
            updated.y_coord,
            caller,
        )
        .await;
        Ok(updated)
    }

    /// Delete a tile with its messages and cryptograms. Owner or starter only.
    pub async fn delete_tile(&self, id: i64, caller: IdentityId) -> Result<(), ServiceError> {
        let tile = self.load_for_caller(id, caller).await?;

        if tile.owner_id != caller && tile.starter_id != caller {
            return Err(ServiceError::AuthorizationDenied(
                "only the tile owner or starter may delete it".into(),
            ));
        }
        if !Tile::delete(id, &self.db).await? {
            return Err(ServiceError::NotFound(format!("tile {} not found", id)));
        }

        tracing::info!(tile = id, by = caller, "tile deleted");
        self.announce(
            ChangeKind::TileChanged,
            tile.owner_id,
            tile.x_coord,
            tile.y_coord,
            caller,
        )
        .await;
        Ok(())
    }

    /// Store the caller's message on a tile, one cryptogram per recipient,
    /// all or nothing
    pub async fn create_message(
        &self,
        owner: IdentityId,
        x: i64,
        y: i64,
        cryptograms: &[SealedFor],
        caller: IdentityId,
    ) -> Result<Message, ServiceError> {
        self.contacts.ensure_access(owner, caller).await?;
        check_bounds(x, y)?;

        let tile = Tile::get_at(owner, x, y, &self.db)
            .await?
            .ok_or_else(|| tile_missing(owner, x, y))?;

        if Message::find(tile.id, caller, &self.db).await?.is_some() {
            return Err(ServiceError::Conflict(
                "you already have a message on this tile; delete it first".into(),
            ));
        }
        check_deliverable(cryptograms.iter().map(|c| c.recipient_id), owner, caller)?;

        let message =
            match Message::create_with_cryptograms(tile.id, caller, cryptograms, &self.db).await {
                Ok(message) => message,
                Err(MessageWriteError::AlreadyPosted) => {
                    return Err(ServiceError::Conflict(
                        "you already have a message on this tile; delete it first".into(),
                    ))
                }
                Err(MessageWriteError::Store(e)) => {
                    tracing::error!(tile = tile.id, responder = caller, error = %e, "message rolled back");
                    return Err(ServiceError::TransientStoreError(
                        "message was not stored".into(),
                    ));
                }
            };

        tracing::info!(
            message = message.id,
            tile = tile.id,
            responder = caller,
            recipients = cryptograms.len(),
            "message created"
        );
        self.announce(ChangeKind::MessageChanged, owner, x, y, caller)
            .await;
        Ok(message)
    }

    /// Delete the caller's own message on a tile. Absent messages are NotFound.
    pub async fn delete_message(
        &self,
        owner: IdentityId,
        x: i64,
        y: i64,
        caller: IdentityId,
    ) -> Result<(), ServiceError> {
        self.contacts.ensure_access(owner, caller).await?;
        check_bounds(x, y)?;

        let tile = Tile::get_at(owner, x, y, &self.db)
            .await?
            .ok_or_else(|| tile_missing(owner, x, y))?;

        if !Message::delete_by_responder(tile.id, caller, &self.db).await? {
            return Err(ServiceError::NotFound(
                "you have no message on this tile".into(),
            ));
        }

        tracing::info!(tile = tile.id, responder = caller, "message deleted");
        self.announce(ChangeKind::MessageChanged, owner, x, y, caller)
            .await;
        Ok(())
    }

    /// The caller's view of a tile's messages; marks them seen
    ///
    /// An empty tile yields an empty listing. A missing tile is NotFound.
    pub async fn read_messages(
        &self,
        owner: IdentityId,
        x: i64,
        y: i64,
        caller: IdentityId,
    ) -> Result<ReadMessages, ServiceError> {
        self.contacts.ensure_access(owner, caller).await?;
        check_bounds(x, y)?;

        let tile = Tile::get_at(owner, x, y, &self.db)
            .await?
            .ok_or_else(|| tile_missing(owner, x, y))?;

        let read = Message::read_for_recipient(tile.id, caller, &self.db).await?;
        tracing::debug!(
            tile = tile.id,
            recipient = caller,
            messages = read.messages.len(),
            newly_seen = read.newly_seen,
            "messages read"
        );
        Ok(read)
    }

    /// Load a tile by id and check the caller can access its grid
    ///
    /// An unknown id is denied like an inaccessible one, so ids cannot be
    /// enumerated.
    async fn load_for_caller(&self, id: i64, caller: IdentityId) -> Result<Tile, ServiceError> {
        let Some(tile) = Tile::get(id, &self.db).await? else {
            tracing::debug!(tile = id, caller, "no such tile");
            return Err(ServiceError::denied());
        };
        self.contacts.ensure_access(tile.owner_id, caller).await?;
        Ok(tile)
    }

    /// Tell the grid's audience about a change. Failures are logged and dropped.
    async fn announce(
        &self,
        kind: ChangeKind,
        owner: IdentityId,
        x: i64,
        y: i64,
        actor: IdentityId,
    ) {
        let audience = match self.contacts.audience(owner).await {
            Ok(audience) => audience,
            Err(e) => {
                tracing::debug!(owner, error = %e, "skipping live hint, audience lookup failed");
                return;
            }
        };
        let event = ChangeEvent {
            kind,
            owner_id: owner,
            x,
            y,
            actor_id: actor,
        };
        self.hub.publish(&audience, event);
    }
}
