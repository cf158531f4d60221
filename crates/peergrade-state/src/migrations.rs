//! SurrealDB schema migrations and initialization
//!
//! Sets up the `evaluations` and `kv` tables with their indexes.

use crate::error::StateError;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all peergrade tables in SurrealDB
///
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing peergrade SurrealDB schema");

    init_evaluations_table(db).await?;
    init_kv_table(db).await?;

    info!("peergrade schema initialization complete");
    Ok(())
}

/// Initialize `evaluations` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE evaluations {
///   evaluation_id:  STRING (unique)
///   project_id:     STRING (indexed)
///   evaluator_id:   STRING (indexed)
///   created_at:     DATETIME (indexed, listing order)
///   record:         OBJECT (full evaluation document)
/// }
/// ```
///
/// Records are hard-deleted; there is no soft-delete column.
async fn init_evaluations_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing evaluations table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS evaluations SCHEMALESS PERMISSIONS FULL;

        DEFINE INDEX IF NOT EXISTS idx_evaluation_id ON TABLE evaluations COLUMNS evaluation_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_project_id ON TABLE evaluations COLUMNS project_id;
        DEFINE INDEX IF NOT EXISTS idx_evaluator_id ON TABLE evaluations COLUMNS evaluator_id;
        DEFINE INDEX IF NOT EXISTS idx_created_at ON TABLE evaluations COLUMNS created_at;
        DEFINE INDEX IF NOT EXISTS idx_project_created_at ON TABLE evaluations COLUMNS project_id, created_at;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?
        .check()
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ evaluations table initialized");
    Ok(())
}

/// Initialize `kv` table
///
/// Schema:
/// ```text
/// TABLE kv {
///   key:    STRING (unique, also the record id)
///   value:  OBJECT
/// }
/// ```
async fn init_kv_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing kv table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS kv SCHEMALESS PERMISSIONS FULL;

        DEFINE INDEX IF NOT EXISTS idx_kv_key ON TABLE kv COLUMNS key UNIQUE;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?
        .check()
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ kv table initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::any::connect;

    async fn mem_db() -> Surreal<Any> {
        let db = connect("mem://").await.unwrap();
        db.use_ns("peergrade").use_db("migrations").await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_schema_statements_parse_and_apply() {
        let db = mem_db().await;
        init_schema(&db).await.expect("schema should apply on a fresh database");
        init_schema(&db).await.expect("schema should re-apply cleanly");
    }

    #[tokio::test]
    async fn test_tables_accept_writes_after_init() {
        let db = mem_db().await;
        init_schema(&db).await.unwrap();

        db.query("CREATE kv:room_key SET key = 'rooms/ABC123', value = {}")
            .await
            .unwrap()
            .check()
            .unwrap();
        let mut res = db.query("SELECT VALUE key FROM kv").await.unwrap();
        let keys: Vec<String> = res.take(0).unwrap();
        assert_eq!(keys, vec!["rooms/ABC123".to_string()]);
    }
}
