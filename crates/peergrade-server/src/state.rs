use std::sync::Arc;

use peergrade_core::{Classroom, ClassroomConfig, EvaluationService};
use peergrade_state::fakes::{MemoryEvaluationStore, MemoryKeyValueStore};
use peergrade_state::{
    EvaluationStore, KeyValueStore, SurrealEvaluationStore, SurrealHandle, SurrealKeyValueStore,
};
use tracing::info;

use crate::config::Config;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub evaluations: EvaluationService,
    pub classroom: Classroom<dyn KeyValueStore>,
    pub avatar_base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        evaluations: Arc<dyn EvaluationStore>,
        kv: Arc<dyn KeyValueStore>,
        config: &Config,
    ) -> Self {
        Self {
            evaluations: EvaluationService::new(evaluations),
            classroom: Classroom::new(
                kv,
                ClassroomConfig {
                    min_evaluators: config.min_evaluators,
                },
            ),
            avatar_base_url: Arc::from(config.avatar_base_url.as_str()),
        }
    }

    /// Both stores on one SurrealDB connection chosen from `SURREALDB_*`.
    pub async fn connect(config: &Config) -> peergrade_state::Result<Self> {
        info!("Initializing state...");
        let handle = Arc::new(SurrealHandle::setup_from_env().await?);
        Ok(Self::new(
            Arc::new(SurrealEvaluationStore::new(handle.clone())),
            Arc::new(SurrealKeyValueStore::new(handle)),
            config,
        ))
    }

    /// In-process fakes, no database.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            Arc::new(MemoryEvaluationStore::new()),
            Arc::new(MemoryKeyValueStore::new()),
            config,
        )
    }
}
