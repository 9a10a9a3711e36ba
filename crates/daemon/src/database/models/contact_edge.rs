use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::database::types::DBool;
use crate::database::Database;

/// One edge of the contact graph
///
/// At most one edge exists per unordered pair. `authorized = false` is a
/// pending request from `requester_id` to `target_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactEdge {
    pub id: i64,
    pub requester_id: i64,
    pub target_id: i64,
    pub authorized: DBool,
    pub created_at: OffsetDateTime,
}

impl ContactEdge {
    /// The edge between `a` and `b` in either direction
    pub async fn between(a: i64, b: i64, db: &Database) -> Result<Option<ContactEdge>, sqlx::Error> {
        sqlx::query_as::<_, ContactEdge>(
            r#"
            SELECT id, requester_id, target_id, authorized, created_at
            FROM contacts
            WHERE (requester_id = ?1 AND target_id = ?2)
               OR (requester_id = ?2 AND target_id = ?1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&**db)
        .await
    }

    /// Insert a pending edge unless `requester` already holds `cap` authorized
    /// contacts. Returns None when the cap blocked the insert.
    ///
    /// The count and the insert run as one statement so concurrent requests
    /// cannot both slip under the cap.
    pub async fn insert_pending(
        requester: i64,
        target: i64,
        cap: i64,
        db: &Database,
    ) -> Result<Option<ContactEdge>, sqlx::Error> {
        sqlx::query_as::<_, ContactEdge>(
            r#"
            INSERT INTO contacts (requester_id, target_id, authorized)
            SELECT ?1, ?2, 0
            WHERE (
                SELECT COUNT(*) FROM contacts
                WHERE authorized = 1 AND (requester_id = ?1 OR target_id = ?1)
            ) < ?3
            RETURNING id, requester_id, target_id, authorized, created_at
            "#,
        )
        .bind(requester)
        .bind(target)
        .bind(cap)
        .fetch_optional(&**db)
        .await
    }

    /// Flip the pending edge `requester -> target` to authorized, unless
    /// `target` already holds `cap` authorized contacts. Returns whether the
    /// edge flipped.
    pub async fn authorize(
        requester: i64,
        target: i64,
        cap: i64,
        db: &Database,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE contacts SET authorized = 1
            WHERE requester_id = ?1 AND target_id = ?2 AND authorized = 0
              AND (
                SELECT COUNT(*) FROM contacts
                WHERE authorized = 1 AND (requester_id = ?2 OR target_id = ?2)
              ) < ?3
            "#,
        )
        .bind(requester)
        .bind(target)
        .bind(cap)
        .execute(&**db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete whatever edge joins `a` and `b`. Returns the number removed.
    pub async fn delete_between(a: i64, b: i64, db: &Database) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM contacts
            WHERE (requester_id = ?1 AND target_id = ?2)
               OR (requester_id = ?2 AND target_id = ?1)
            "#,
        )
        .bind(a)
        .bind(b)
        .execute(&**db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Every edge touching `id`, oldest first
    pub async fn touching(id: i64, db: &Database) -> Result<Vec<ContactEdge>, sqlx::Error> {
        sqlx::query_as::<_, ContactEdge>(
            r#"
            SELECT id, requester_id, target_id, authorized, created_at
            FROM contacts
            WHERE requester_id = ?1 OR target_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&**db)
        .await
    }

    /// Ids of everyone mutually authorized with `id`
    pub async fn authorized_contacts(id: i64, db: &Database) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT CASE WHEN requester_id = ?1 THEN target_id ELSE requester_id END
            FROM contacts
            WHERE authorized = 1 AND (requester_id = ?1 OR target_id = ?1)
            ORDER BY id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&**db)
        .await
    }

    pub async fn is_authorized_pair(a: i64, b: i64, db: &Database) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM contacts
            WHERE authorized = 1
              AND ((requester_id = ?1 AND target_id = ?2)
                OR (requester_id = ?2 AND target_id = ?1))
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&**db)
        .await?;
        Ok(row.is_some())
    }
}
