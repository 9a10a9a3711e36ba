use futures::future::join_all;

use common::types::{grid_cells, IdentityId};

use super::{ApiClient, ApiError};
use crate::database::models::{ReceivedMessage, Tile};
use crate::http_server::api::v0::message::ReadMessagesRequest;
use crate::http_server::api::v0::tile::ReadTileRequest;

/// One cell of a fetched grid. Empty cells have no tile.
#[derive(Debug, Clone, Default)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
    pub tile: Option<Tile>,
    pub messages: Vec<ReceivedMessage>,
}

impl ApiClient {
    /// Fetch every cell of `owner`'s grid concurrently, in row-major order
    ///
    /// A cell whose lookups fail comes back empty. The other cells are
    /// unaffected.
    pub async fn fetch_grid(&self, owner: IdentityId) -> Vec<GridCell> {
        let lookups = grid_cells().map(|(x, y)| async move {
            match self.fetch_cell(owner, x, y).await {
                Ok(cell) => cell,
                Err(e) => {
                    tracing::debug!(owner, x, y, error = %e, "grid cell left empty");
                    GridCell {
                        x,
                        y,
                        ..Default::default()
                    }
                }
            }
        });
        join_all(lookups).await
    }

    async fn fetch_cell(&self, owner: IdentityId, x: i64, y: i64) -> Result<GridCell, ApiError> {
        let tile = self
            .call(ReadTileRequest {
                owner_id: owner,
                x_coord: x,
                y_coord: y,
            })
            .await?;
        let messages = self
            .call(ReadMessagesRequest {
                owner_id: owner,
                x_coord: x,
                y_coord: y,
            })
            .await?;

        Ok(GridCell {
            x,
            y,
            tile: Some(tile),
            messages,
        })
    }
}
