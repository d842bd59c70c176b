//! Per-project collection provisioning.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};

/// Collection name for conversations.
pub const CONVERSATIONS: &str = "conversations";

/// Collection name for messages.
pub const MESSAGES: &str = "messages";

/// Grant a project access to one collection. Idempotent.
pub async fn provision_collection(
    pool: &SqlitePool,
    project_id: &str,
    collection: &'static str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO project_collections (project_id, collection)
        VALUES (?, ?)
        ON CONFLICT(project_id, collection) DO NOTHING
        "#,
    )
    .bind(project_id)
    .bind(collection)
    .execute(pool)
    .await?;

    Ok(())
}

/// Grant a project access to every collection.
pub async fn provision_project(pool: &SqlitePool, project_id: &str) -> Result<()> {
    provision_collection(pool, project_id, CONVERSATIONS).await?;
    provision_collection(pool, project_id, MESSAGES).await?;
    tracing::info!("Provisioned collections for project {}", project_id);
    Ok(())
}

/// Revoke a project's access to one collection.
///
/// Returns whether a grant was removed.
pub async fn revoke_collection(
    pool: &SqlitePool,
    project_id: &str,
    collection: &'static str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM project_collections
        WHERE project_id = ? AND collection = ?
        "#,
    )
    .bind(project_id)
    .bind(collection)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Check whether a project has provisioned a collection.
pub async fn is_provisioned(
    pool: &SqlitePool,
    project_id: &str,
    collection: &'static str,
) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM project_collections
        WHERE project_id = ? AND collection = ?
        "#,
    )
    .bind(project_id)
    .bind(collection)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Fail with [`DatabaseError::NotProvisioned`] unless the collection is provisioned.
pub async fn ensure_provisioned(
    pool: &SqlitePool,
    project_id: &str,
    collection: &'static str,
) -> Result<()> {
    if is_provisioned(pool, project_id, collection).await? {
        Ok(())
    } else {
        Err(DatabaseError::NotProvisioned {
            project_id: project_id.to_string(),
            collection,
        })
    }
}

/// List every project with at least one provisioned collection.
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<String>> {
    let projects = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT project_id
        FROM project_collections
        ORDER BY project_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_pool() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_provision_and_revoke() {
        let db = test_pool().await;
        let pool = db.pool();

        assert!(!is_provisioned(pool, "shop", MESSAGES).await.unwrap());

        provision_project(pool, "shop").await.unwrap();
        // Provisioning twice is a no-op
        provision_project(pool, "shop").await.unwrap();
        assert!(is_provisioned(pool, "shop", MESSAGES).await.unwrap());
        assert!(is_provisioned(pool, "shop", CONVERSATIONS).await.unwrap());

        assert!(revoke_collection(pool, "shop", MESSAGES).await.unwrap());
        assert!(!revoke_collection(pool, "shop", MESSAGES).await.unwrap());

        let err = ensure_provisioned(pool, "shop", MESSAGES).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotProvisioned { collection: "messages", .. }
        ));
        ensure_provisioned(pool, "shop", CONVERSATIONS).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_projects() {
        let db = test_pool().await;
        let pool = db.pool();

        provision_project(pool, "zeta").await.unwrap();
        provision_collection(pool, "alpha", CONVERSATIONS).await.unwrap();

        let projects = list_projects(pool).await.unwrap();
        assert_eq!(projects, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
