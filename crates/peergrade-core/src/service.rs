//! Evaluation service: the record builder wired to an [`EvaluationStore`].
//!
//! Each mutating call is one read-then-write against the store with no
//! locking. The last writer wins and store failures surface immediately.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use peergrade_state::{EvaluationFilter, EvaluationId, EvaluationRecord, EvaluationStore};

use crate::error::{EvalError, Result};
use crate::obs;
use crate::record::{apply_patch, build_record, EvaluationPatch, NewEvaluation};
use crate::summary::{summarize, EvaluationSummary};

fn store_err(operation: &str, err: peergrade_state::StorageError) -> EvalError {
    let err = EvalError::from(err);
    if let EvalError::Store(ref msg) = err {
        obs::emit_store_failure(operation, msg);
    }
    err
}

#[derive(Clone)]
pub struct EvaluationService {
    store: Arc<dyn EvaluationStore>,
}

impl EvaluationService {
    pub fn new(store: Arc<dyn EvaluationStore>) -> Self {
        Self { store }
    }

    /// Validate, score, classify and persist a new evaluation.
    pub async fn create(&self, input: NewEvaluation) -> Result<EvaluationRecord> {
        let record = build_record(input, Utc::now())?;
        let stored = self
            .store
            .insert(record)
            .await
            .map_err(|e| store_err("insert", e))?;
        obs::emit_evaluation_created(
            stored.id.as_str(),
            &stored.project_id,
            stored.grade.as_str(),
            stored.percentage,
        );
        Ok(stored)
    }

    pub async fn get(&self, id: &EvaluationId) -> Result<EvaluationRecord> {
        self.store.get(id).await.map_err(|e| store_err("get", e))
    }

    /// Newest `createdAt` first.
    pub async fn list(&self, filter: &EvaluationFilter) -> Result<Vec<EvaluationRecord>> {
        self.store.list(filter).await.map_err(|e| store_err("list", e))
    }

    /// Apply `patch` to the stored record and write it back.
    pub async fn update(&self, id: &EvaluationId, patch: EvaluationPatch) -> Result<EvaluationRecord> {
        let span = obs::evaluation_span(id.as_str());
        async move {
            let current = self.store.get(id).await.map_err(|e| store_err("get", e))?;
            let rescored = patch.scores.is_some();
            let updated = apply_patch(current, patch, Utc::now())?;
            let stored = self
                .store
                .replace(updated)
                .await
                .map_err(|e| store_err("replace", e))?;
            obs::emit_evaluation_updated(stored.id.as_str(), rescored, stored.grade.as_str());
            Ok(stored)
        }
        .instrument(span)
        .await
    }

    pub async fn delete(&self, id: &EvaluationId) -> Result<()> {
        self.store
            .delete(id)
            .await
            .map_err(|e| store_err("delete", e))?;
        obs::emit_evaluation_deleted(id.as_str());
        Ok(())
    }

    /// Summary across every stored evaluation.
    pub async fn summary(&self) -> Result<EvaluationSummary> {
        let records = self.list(&EvaluationFilter::default()).await?;
        Ok(summarize(&records))
    }
}
