use clap::Args;

use common::types::{IdentityId, GRID_SIZE};
use tiletalk_daemon::http_server::api::client::GridCell;

use crate::cli::op::{Op, OpContext};

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("no local identity registered; pass --owner")]
    NoOwner,
}

/// Show every cell of a grid
#[derive(Args, Debug, Clone)]
pub struct Grid {
    /// Grid owner (defaults to yourself)
    #[arg(long)]
    pub owner: Option<IdentityId>,
}

fn render_cell(cell: &GridCell) -> String {
    let Some(tile) = &cell.tile else {
        return format!("({}, {}) empty", cell.x, cell.y);
    };
    let label = tile
        .title
        .as_deref()
        .or(tile.symbol.as_deref())
        .unwrap_or("untitled");
    let unread = cell.messages.iter().filter(|m| !m.seen).count();
    format!(
        "({}, {}) tile {} \"{}\" by {}: {} messages, {} new",
        cell.x,
        cell.y,
        tile.id,
        label,
        tile.starter_id,
        cell.messages.len(),
        unread
    )
}

#[async_trait::async_trait]
impl Op for Grid {
    type Error = GridError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let owner = self
            .owner
            .or(ctx.client.identity())
            .ok_or(GridError::NoOwner)?;

        let cells = ctx.client.fetch_grid(owner).await;
        let mut lines = vec![format!("Grid {} ({}x{}):", owner, GRID_SIZE, GRID_SIZE)];
        lines.extend(cells.iter().map(|cell| format!("  {}", render_cell(cell))));
        Ok(lines.join("\n"))
    }
}
