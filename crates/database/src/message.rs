//! Message persistence.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::MessageRecord;
use crate::project::{ensure_provisioned, MESSAGES};

/// Insert a message.
pub async fn insert_message(pool: &SqlitePool, record: &MessageRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO messages (id, project_id, direction, channel, sender_id, recipient_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.project_id)
    .bind(&record.direction)
    .bind(&record.channel)
    .bind(&record.sender_id)
    .bind(&record.recipient_id)
    .bind(record.created_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Message",
                    id: record.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// List messages of a provisioned project created at or after `since`,
/// newest first.
///
/// Fails with [`DatabaseError::NotProvisioned`] if the project has no
/// messages collection.
pub async fn list_messages_since(
    pool: &SqlitePool,
    project_id: &str,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<MessageRecord>> {
    ensure_provisioned(pool, project_id, MESSAGES).await?;

    let rows = sqlx::query_as::<_, MessageRecord>(
        r#"
        SELECT id, project_id, direction, channel, sender_id, recipient_id, created_at
        FROM messages
        WHERE project_id = ? AND created_at >= ?
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(project_id)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{provision_collection, provision_project, CONVERSATIONS};
    use crate::Database;
    use chrono::{Duration, TimeZone};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn record(id: &str, project_id: &str, created_at: DateTime<Utc>) -> MessageRecord {
        MessageRecord {
            id: id.to_string(),
            project_id: project_id.to_string(),
            direction: "inbound".to_string(),
            channel: "whatsapp".to_string(),
            sender_id: "visitor".to_string(),
            recipient_id: project_id.to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_window_and_order() {
        let db = test_db().await;
        let pool = db.pool();
        provision_project(pool, "shop").await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 4, 20, 12, 0, 0).unwrap();
        insert_message(pool, &record("old", "shop", now - Duration::days(8)))
            .await
            .unwrap();
        insert_message(pool, &record("edge", "shop", now - Duration::days(7)))
            .await
            .unwrap();
        insert_message(pool, &record("new", "shop", now - Duration::minutes(5)))
            .await
            .unwrap();
        insert_message(pool, &record("other", "cafe", now)).await.unwrap();

        let rows = list_messages_since(pool, "shop", now - Duration::days(7), 500)
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "edge"]);

        let limited = list_messages_since(pool, "shop", now - Duration::days(7), 1)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "new");
    }

    #[tokio::test]
    async fn test_unprovisioned_messages() {
        let db = test_db().await;
        let pool = db.pool();
        provision_collection(pool, "shop", CONVERSATIONS).await.unwrap();

        let err = list_messages_since(pool, "shop", Utc::now(), 10)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotProvisioned { collection: "messages", .. }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_message() {
        let db = test_db().await;
        let pool = db.pool();
        let now = Utc::now();

        insert_message(pool, &record("a", "shop", now)).await.unwrap();
        let err = insert_message(pool, &record("a", "shop", now)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { entity: "Message", .. }));
    }
}
