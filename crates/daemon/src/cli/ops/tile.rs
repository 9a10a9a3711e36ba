use clap::{Args, Subcommand};

use common::types::IdentityId;
use tiletalk_daemon::database::models::{Tile as TileRecord, TileFields, TilePatch};
use tiletalk_daemon::http_server::api::client::ApiError;
use tiletalk_daemon::http_server::api::v0::tile::{
    CreateTileRequest, DeleteTileRequest, ReadTileRequest, UpdateTileRequest,
};

use crate::cli::op::{Op, OpContext};

#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("no local identity registered; pass --owner")]
    NoOwner,
}

pub(crate) fn render_tile(tile: &TileRecord) -> String {
    let mut lines = vec![format!(
        "Tile {} at ({}, {}) on grid {}, started by {}",
        tile.id, tile.x_coord, tile.y_coord, tile.owner_id, tile.starter_id
    )];
    if let Some(title) = &tile.title {
        lines.push(format!("  title:      {}", title));
    }
    if let Some(symbol) = &tile.symbol {
        lines.push(format!("  symbol:     {}", symbol));
    }
    if let Some(callout) = &tile.callout {
        lines.push(format!("  callout:    {}", callout));
    }
    if let Some(background) = &tile.tile_bg {
        lines.push(format!("  background: {}", background));
    }
    lines.push(format!(
        "  animation:  {}{}",
        tile.animation_type,
        if *tile.flip { " (flipped)" } else { "" }
    ));
    lines.join("\n")
}

/// Presentation flags shared by create and update
#[derive(Args, Debug, Clone, Default)]
pub struct TileLook {
    #[arg(long)]
    pub symbol: Option<String>,
    /// Clipped to 30 characters
    #[arg(long)]
    pub title: Option<String>,
    /// Clipped to 30 characters
    #[arg(long)]
    pub callout: Option<String>,
    #[arg(long)]
    pub background: Option<String>,
    #[arg(long)]
    pub animation: Option<i64>,
    #[arg(long)]
    pub flip: Option<bool>,
}

/// Populate an empty cell
#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Grid owner (defaults to yourself)
    #[arg(long)]
    pub owner: Option<IdentityId>,
    #[arg(short = 'x', long = "x")]
    pub x: i64,
    #[arg(short = 'y', long = "y")]
    pub y: i64,
    #[command(flatten)]
    pub look: TileLook,
}

/// Change a tile you own or started
#[derive(Args, Debug, Clone)]
pub struct Update {
    /// Tile id
    #[arg(long)]
    pub id: i64,
    #[command(flatten)]
    pub look: TileLook,
}

#[async_trait::async_trait]
impl Op for Create {
    type Error = TileError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let owner = self
            .owner
            .or(ctx.client.identity())
            .ok_or(TileError::NoOwner)?;
        let look = self.look.clone();
        let response = ctx
            .client
            .call(CreateTileRequest {
                owner_id: owner,
                x_coord: self.x,
                y_coord: self.y,
                fields: TileFields {
                    symbol: look.symbol,
                    animation_type: look.animation.unwrap_or_default(),
                    flip: look.flip.unwrap_or_default(),
                    tile_bg: look.background,
                    callout: look.callout,
                    title: look.title,
                },
            })
            .await?;
        Ok(format!(
            "Created tile {} at ({}, {}) on grid {}",
            response.id, self.x, self.y, owner
        ))
    }
}

#[async_trait::async_trait]
impl Op for ReadTileRequest {
    type Error = TileError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let tile = ctx.client.call(self.clone()).await?;
        Ok(render_tile(&tile))
    }
}

#[async_trait::async_trait]
impl Op for Update {
    type Error = TileError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let look = self.look.clone();
        let tile = ctx
            .client
            .call(UpdateTileRequest {
                id: self.id,
                patch: TilePatch {
                    symbol: look.symbol,
                    animation_type: look.animation,
                    flip: look.flip,
                    tile_bg: look.background,
                    callout: look.callout,
                    title: look.title,
                },
            })
            .await?;
        Ok(render_tile(&tile))
    }
}

#[async_trait::async_trait]
impl Op for DeleteTileRequest {
    type Error = TileError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(format!(
            "Deleted tile {} with its messages",
            response.id
        ))
    }
}

crate::command_enum! {
    (Create, Create),
    (Show, ReadTileRequest),
    (Update, Update),
    (Delete, DeleteTileRequest),
}

pub type TileCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Tile {
    #[command(subcommand)]
    pub command: TileCommand,
}

#[async_trait::async_trait]
impl Op for Tile {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
