use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::schema::KvRow;
use crate::storage_traits::{KeyValueStore, StorageResult};
use crate::SurrealHandle;

const KV_TABLE: &str = "kv";

/// SurrealDB-backed implementation of the KeyValueStore trait.
///
/// Each key is also used as the record id, so `put` is a single upsert.
#[derive(Clone)]
pub struct SurrealKeyValueStore {
    handle: Arc<SurrealHandle>,
}

impl SurrealKeyValueStore {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl KeyValueStore for SurrealKeyValueStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        let row: Option<KvRow> = self.handle.db().select((KV_TABLE, key)).await?;
        Ok(row.map(|r| r.value))
    }

    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: serde_json::Value) -> StorageResult<()> {
        let _row: Option<KvRow> = self
            .handle
            .db()
            .upsert((KV_TABLE, key))
            .content(KvRow::new(key, value))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let removed: Option<KvRow> = self.handle.db().delete((KV_TABLE, key)).await?;
        Ok(removed.is_some())
    }

    #[instrument(skip(self))]
    async fn scan_prefix(&self, prefix: &str) -> StorageResult<Vec<(String, serde_json::Value)>> {
        let prefix_owned = prefix.to_string();
        let mut res = self
            .handle
            .db()
            .query("SELECT * FROM kv WHERE string::starts_with(key, $prefix) ORDER BY key")
            .bind(("prefix", prefix_owned))
            .await?;

        let rows: Vec<KvRow> = res.take(0)?;
        Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
    }
}
