//! Conversation persistence.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::ConversationRecord;
use crate::project::{ensure_provisioned, CONVERSATIONS};

/// Insert a conversation.
pub async fn insert_conversation(pool: &SqlitePool, record: &ConversationRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO conversations (project_id, id, status, lead_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&record.project_id)
    .bind(&record.id)
    .bind(&record.status)
    .bind(&record.lead_id)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Conversation",
                    id: record.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// List conversations of a provisioned project.
///
/// When `statuses` is given only conversations with one of those statuses are
/// returned. Fails with [`DatabaseError::NotProvisioned`] if the project has
/// no conversations collection.
pub async fn list_conversations(
    pool: &SqlitePool,
    project_id: &str,
    statuses: Option<&[&str]>,
    limit: i64,
) -> Result<Vec<ConversationRecord>> {
    ensure_provisioned(pool, project_id, CONVERSATIONS).await?;

    let mut sql = String::from(
        "SELECT project_id, id, status, lead_id FROM conversations WHERE project_id = ?",
    );
    if let Some(statuses) = statuses {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; statuses.len()].join(", ");
        sql.push_str(&format!(" AND status IN ({})", placeholders));
    }
    sql.push_str(" ORDER BY created_at DESC, id LIMIT ?");

    let mut query = sqlx::query_as::<_, ConversationRecord>(&sql).bind(project_id);
    for status in statuses.unwrap_or_default() {
        query = query.bind(*status);
    }

    let rows = query.bind(limit).fetch_all(pool).await?;
    Ok(rows)
}
