use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::database::types::DBool;
use crate::database::Database;

/// Longest title or callout a tile keeps, in characters
pub const MAX_LABEL_CHARS: usize = 30;

/// One populated cell on an identity's grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tile {
    pub id: i64,
    pub owner_id: i64,
    pub x_coord: i64,
    pub y_coord: i64,
    /// Whoever first populated the cell. Never changes.
    pub starter_id: i64,
    pub symbol: Option<String>,
    pub animation_type: i64,
    pub flip: DBool,
    pub tile_bg: Option<String>,
    pub callout: Option<String>,
    pub title: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Presentation fields set when a tile is created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileFields {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub animation_type: i64,
    #[serde(default)]
    pub flip: bool,
    #[serde(default)]
    pub tile_bg: Option<String>,
    #[serde(default)]
    pub callout: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Presentation fields to change. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TilePatch {
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.animation_type.is_none()
            && self.flip.is_none()
            && self.tile_bg.is_none()
            && self.callout.is_none()
            && self.title.is_none()
    }
}

/// Clip a title or callout to [`MAX_LABEL_CHARS`] characters
pub fn clip_label(label: Option<String>) -> Option<String> {
    label.map(|l| match l.char_indices().nth(MAX_LABEL_CHARS) {
        Some((cut, _)) => l[..cut].to_string(),
        None => l,
    })
}

const TILE_COLUMNS: &str = r#"
    id, owner_id, x_coord, y_coord, starter_id, symbol, animation_type,
    flip, tile_bg, callout, title, created_at
"#;

impl Tile {
    pub async fn create(
        owner_id: i64,
        x: i64,
        y: i64,
        starter_id: i64,
        fields: TileFields,
        db: &Database,
    ) -> Result<Tile, sqlx::Error> {
        sqlx::query_as::<_, Tile>(&format!(
            r#"
            INSERT INTO tiles (
                owner_id, x_coord, y_coord, starter_id, symbol,
                animation_type, flip, tile_bg, callout, title
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {}
            "#,
            TILE_COLUMNS
        ))
        .bind(owner_id)
        .bind(x)
        .bind(y)
        .bind(starter_id)
        .bind(fields.symbol)
        .bind(fields.animation_type)
        .bind(DBool::from(fields.flip))
        .bind(fields.tile_bg)
        .bind(clip_label(fields.callout))
        .bind(clip_label(fields.title))
        .fetch_one(&**db)
        .await
    }

    pub async fn get(id: i64, db: &Database) -> Result<Option<Tile>, sqlx::Error> {
        sqlx::query_as::<_, Tile>(&format!("SELECT {} FROM tiles WHERE id = ?1", TILE_COLUMNS))
            .bind(id)
            .fetch_optional(&**db)
            .await
    }

    pub async fn get_at(
        owner_id: i64,
        x: i64,
        y: i64,
        db: &Database,
    ) -> Result<Option<Tile>, sqlx::Error> {
        sqlx::query_as::<_, Tile>(&format!(
            r#"
            SELECT {}
            FROM tiles
            WHERE owner_id = ?1 AND x_coord = ?2 AND y_coord = ?3
            "#,
            TILE_COLUMNS
        ))
        .bind(owner_id)
        .bind(x)
        .bind(y)
        .fetch_optional(&**db)
        .await
    }

    /// Apply `patch`, returning the tile as stored afterwards
    pub async fn update(
        id: i64,
        patch: TilePatch,
        db: &Database,
    ) -> Result<Option<Tile>, sqlx::Error> {
        sqlx::query_as::<_, Tile>(&format!(
            r#"
            UPDATE tiles SET
                symbol = COALESCE(?2, symbol),
                animation_type = COALESCE(?3, animation_type),
                flip = COALESCE(?4, flip),
                tile_bg = COALESCE(?5, tile_bg),
                callout = COALESCE(?6, callout),
                title = COALESCE(?7, title)
            WHERE id = ?1
            RETURNING {}
            "#,
            TILE_COLUMNS
        ))
        .bind(id)
        .bind(patch.symbol)
        .bind(patch.animation_type)
        .bind(patch.flip.map(DBool::from))
        .bind(patch.tile_bg)
        .bind(clip_label(patch.callout))
        .bind(clip_label(patch.title))
        .fetch_optional(&**db)
        .await
    }

    /// Delete the tile. Its messages and cryptograms cascade.
    pub async fn delete(id: i64, db: &Database) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tiles WHERE id = ?1")
            .bind(id)
            .execute(&**db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
