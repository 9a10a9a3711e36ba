use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use common::crypto::{Envelope, SealedFor};

use crate::database::types::DBool;
use crate::database::{is_unique_violation, Database};

/// One responder's message on a tile. The content lives in its cryptograms.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub tile_id: i64,
    pub responder_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A message as one recipient sees it: their own envelope plus delivery state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub message_id: i64,
    pub responder_id: i64,
    pub payload: Envelope,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Whether the recipient had already fetched this before this read
    pub seen: bool,
}

/// Result of a recipient's read of a tile
#[derive(Debug, Clone)]
pub struct ReadMessages {
    pub messages: Vec<ReceivedMessage>,
    /// How many cryptograms this read flipped to seen
    pub newly_seen: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum MessageWriteError {
    #[error("responder already has a message on this tile")]
    AlreadyPosted,
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(FromRow)]
struct CryptogramRow {
    message_id: i64,
    responder_id: i64,
    created_at: OffsetDateTime,
    iv: Vec<u8>,
    wrapped_key: Vec<u8>,
    ciphertext: Vec<u8>,
    seen: DBool,
}

impl From<CryptogramRow> for ReceivedMessage {
    fn from(row: CryptogramRow) -> Self {
        Self {
            message_id: row.message_id,
            responder_id: row.responder_id,
            payload: Envelope {
                iv: row.iv,
                wrapped_key: row.wrapped_key,
                ciphertext: row.ciphertext,
            },
            created_at: row.created_at,
            seen: *row.seen,
        }
    }
}

impl Message {
    /// Insert the message row and every cryptogram as one transaction
    ///
    /// If any cryptogram insert fails nothing is written.
    pub async fn create_with_cryptograms(
        tile_id: i64,
        responder_id: i64,
        cryptograms: &[SealedFor],
        db: &Database,
    ) -> Result<Message, MessageWriteError> {
        let mut tx = db.begin().await?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (tile_id, responder_id, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, tile_id, responder_id, created_at
            "#,
        )
        .bind(tile_id)
        .bind(responder_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                MessageWriteError::AlreadyPosted
            } else {
                MessageWriteError::Store(e)
            }
        })?;

        for sealed in cryptograms {
            sqlx::query(
                r#"
                INSERT INTO cryptograms (message_id, recipient_id, iv, wrapped_key, ciphertext)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(message.id)
            .bind(sealed.recipient_id)
            .bind(&sealed.payload.iv)
            .bind(&sealed.payload.wrapped_key)
            .bind(&sealed.payload.ciphertext)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(message)
    }

    pub async fn find(
        tile_id: i64,
        responder_id: i64,
        db: &Database,
    ) -> Result<Option<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, tile_id, responder_id, created_at
            FROM messages
            WHERE tile_id = ?1 AND responder_id = ?2
            "#,
        )
        .bind(tile_id)
        .bind(responder_id)
        .fetch_optional(&**db)
        .await
    }

    /// Delete `responder_id`'s message on the tile. Its cryptograms cascade.
    pub async fn delete_by_responder(
        tile_id: i64,
        responder_id: i64,
        db: &Database,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE tile_id = ?1 AND responder_id = ?2")
            .bind(tile_id)
            .bind(responder_id)
            .execute(&**db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every message on the tile joined to `recipient_id`'s cryptogram in
    /// insertion order, then mark those cryptograms seen
    ///
    /// Rows report `seen` as it was before this read. Cryptograms that are
    /// already seen are not written again.
    pub async fn read_for_recipient(
        tile_id: i64,
        recipient_id: i64,
        db: &Database,
    ) -> Result<ReadMessages, sqlx::Error> {
        let mut tx = db.begin().await?;

        let rows = sqlx::query_as::<_, CryptogramRow>(
            r#"
            SELECT m.id AS message_id, m.responder_id, m.created_at,
                   c.iv, c.wrapped_key, c.ciphertext, c.seen
            FROM messages AS m
            JOIN cryptograms AS c ON c.message_id = m.id
            WHERE m.tile_id = ?1 AND c.recipient_id = ?2
            ORDER BY m.id ASC
            "#,
        )
        .bind(tile_id)
        .bind(recipient_id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE cryptograms SET seen = 1
            WHERE recipient_id = ?1 AND seen = 0
              AND message_id IN (SELECT id FROM messages WHERE tile_id = ?2)
            "#,
        )
        .bind(recipient_id)
        .bind(tile_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReadMessages {
            messages: rows.into_iter().map(ReceivedMessage::from).collect(),
            newly_seen: result.rows_affected(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::database::models::{Identity, Tile, TileFields};

    async fn insert_at(
        tile_id: i64,
        responder_id: i64,
        recipient_id: i64,
        created_at: OffsetDateTime,
        db: &Database,
    ) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO messages (tile_id, responder_id, created_at) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(tile_id)
        .bind(responder_id)
        .bind(created_at)
        .fetch_one(&**db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            INSERT INTO cryptograms (message_id, recipient_id, iv, wrapped_key, ciphertext)
            VALUES (?1, ?2, x'00', x'00', x'00')
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&**db)
        .await
        .unwrap();

        id
    }

    #[tokio::test]
    async fn test_read_order_survives_fractional_seconds() {
        let db = Database::in_memory().await.unwrap();
        let owner = Identity::create("owner", None, &db).await.unwrap();
        let first = Identity::create("first", None, &db).await.unwrap();
        let second = Identity::create("second", None, &db).await.unwrap();
        let tile = Tile::create(owner.id, 0, 0, owner.id, TileFields::default(), &db)
            .await
            .unwrap();

        // 00:00:00.5 and 00:00:00.5001 sort the wrong way round as text
        let earlier = OffsetDateTime::UNIX_EPOCH + time::Duration::milliseconds(500);
        let later = OffsetDateTime::UNIX_EPOCH + time::Duration::microseconds(500_100);
        let a = insert_at(tile.id, first.id, owner.id, earlier, &db).await;
        let b = insert_at(tile.id, second.id, owner.id, later, &db).await;

        let read = Message::read_for_recipient(tile.id, owner.id, &db)
            .await
            .unwrap();
        let ids: Vec<i64> = read.messages.iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(read.messages[0].created_at < read.messages[1].created_at);
        assert_eq!(read.newly_seen, 2);
    }
}
