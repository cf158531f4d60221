//! SurrealDB-backed EvaluationStore implementation
//!
//! Uses `schema::EvaluationRow` for persistence, converting to/from
//! `storage_traits::EvaluationRecord` at the boundary.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::StorageError;
use crate::schema::EvaluationRow;
use crate::storage_traits::{
    EvaluationFilter, EvaluationId, EvaluationRecord, EvaluationStore, StorageResult,
};
use crate::SurrealHandle;

/// SurrealDB-backed implementation of [`EvaluationStore`].
#[derive(Clone)]
pub struct SurrealEvaluationStore {
    handle: Arc<SurrealHandle>,
}

impl SurrealEvaluationStore {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }

    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> crate::Result<Self> {
        let handle = SurrealHandle::setup_db().await?;
        Ok(Self::new(Arc::new(handle)))
    }

    // -- private helpers -----------------------------------------------------

    async fn fetch_row(&self, eid: &str) -> StorageResult<Option<EvaluationRow>> {
        let eid_owned = eid.to_string();
        let mut res = self
            .handle
            .db()
            .query("SELECT * FROM evaluations WHERE evaluation_id = $eid")
            .bind(("eid", eid_owned))
            .await?;

        let rows: Vec<EvaluationRow> = res.take(0)?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl EvaluationStore for SurrealEvaluationStore {
    #[instrument(skip(self, record), fields(evaluation_id = %record.id))]
    async fn insert(&self, record: EvaluationRecord) -> StorageResult<EvaluationRecord> {
        if self.fetch_row(record.id.as_str()).await?.is_some() {
            return Err(StorageError::DuplicateEvaluation {
                id: record.id.0.clone(),
            });
        }

        debug!("creating evaluation");
        let created: Option<EvaluationRow> = self
            .handle
            .db()
            .create("evaluations")
            .content(EvaluationRow::from_record(record))
            .await?;

        created
            .map(EvaluationRow::into_record)
            .ok_or_else(|| StorageError::Backend("failed to create evaluation record".to_string()))
    }

    #[instrument(skip(self), fields(evaluation_id = %id))]
    async fn get(&self, id: &EvaluationId) -> StorageResult<EvaluationRecord> {
        self.fetch_row(id.as_str())
            .await?
            .map(EvaluationRow::into_record)
            .ok_or_else(|| StorageError::EvaluationNotFound { id: id.0.clone() })
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &EvaluationFilter) -> StorageResult<Vec<EvaluationRecord>> {
        let mut conditions = Vec::new();
        if filter.project_id.is_some() {
            conditions.push("project_id = $project");
        }
        if filter.evaluator_id.is_some() {
            conditions.push("evaluator_id = $evaluator");
        }

        let mut sql = String::from("SELECT * FROM evaluations");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = self.handle.db().query(sql);
        if let Some(project) = filter.project_id.clone() {
            query = query.bind(("project", project));
        }
        if let Some(evaluator) = filter.evaluator_id.clone() {
            query = query.bind(("evaluator", evaluator));
        }

        let mut res = query.await?;
        let rows: Vec<EvaluationRow> = res.take(0)?;
        Ok(rows.into_iter().map(EvaluationRow::into_record).collect())
    }

    #[instrument(skip(self, record), fields(evaluation_id = %record.id))]
    async fn replace(&self, record: EvaluationRecord) -> StorageResult<EvaluationRecord> {
        let eid_owned = record.id.0.clone();

        debug!("replacing evaluation");
        let mut res = self
            .handle
            .db()
            .query("UPDATE evaluations SET record = $record WHERE evaluation_id = $eid")
            .bind(("record", record))
            .bind(("eid", eid_owned.clone()))
            .await?;

        let rows: Vec<EvaluationRow> = res.take(0)?;
        rows.into_iter()
            .next()
            .map(EvaluationRow::into_record)
            .ok_or(StorageError::EvaluationNotFound { id: eid_owned })
    }

    #[instrument(skip(self), fields(evaluation_id = %id))]
    async fn delete(&self, id: &EvaluationId) -> StorageResult<()> {
        let eid_owned = id.0.clone();
        let mut res = self
            .handle
            .db()
            .query("DELETE FROM evaluations WHERE evaluation_id = $eid RETURN BEFORE")
            .bind(("eid", eid_owned))
            .await?;

        let deleted: Vec<EvaluationRow> = res.take(0)?;
        if deleted.is_empty() {
            return Err(StorageError::EvaluationNotFound { id: id.0.clone() });
        }
        Ok(())
    }
}
