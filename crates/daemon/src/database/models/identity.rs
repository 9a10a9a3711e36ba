use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::database::Database;

/// A registered identity and its published public key, if any
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    /// Base64 SPKI DER. Absent until the identity publishes a key.
    pub public_key: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Identity {
    pub async fn create(
        username: &str,
        public_key: Option<&str>,
        db: &Database,
    ) -> Result<Identity, sqlx::Error> {
        sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (username, public_key)
            VALUES (?1, ?2)
            RETURNING id, username, public_key, created_at
            "#,
        )
        .bind(username)
        .bind(public_key)
        .fetch_one(&**db)
        .await
    }

    pub async fn get(id: i64, db: &Database) -> Result<Option<Identity>, sqlx::Error> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, public_key, created_at
            FROM identities
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&**db)
        .await
    }

    pub async fn get_by_username(
        username: &str,
        db: &Database,
    ) -> Result<Option<Identity>, sqlx::Error> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, public_key, created_at
            FROM identities
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&**db)
        .await
    }

    pub async fn exists(id: i64, db: &Database) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM identities WHERE id = ?1")
            .bind(id)
            .fetch_optional(&**db)
            .await?;
        Ok(row.is_some())
    }

    /// Replace the published public key. Returns false if the identity is gone.
    pub async fn set_public_key(
        id: i64,
        public_key: &str,
        db: &Database,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE identities SET public_key = ?1 WHERE id = ?2")
            .bind(public_key)
            .bind(id)
            .execute(&**db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the identity. Edges, tiles, messages and cryptograms cascade.
    pub async fn delete(id: i64, db: &Database) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM identities WHERE id = ?1")
            .bind(id)
            .execute(&**db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
