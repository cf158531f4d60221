//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryEvaluationStore` and `MemoryKeyValueStore` that satisfy the
//! trait contracts without any external dependencies.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryEvaluationStore
// ---------------------------------------------------------------------------

/// In-memory evaluation store backed by a `Vec` in insertion order.
///
/// `set_unavailable(true)` makes every call fail with `StorageError::Backend`,
/// which lets callers exercise their store-failure paths.
#[derive(Debug, Default)]
pub struct MemoryEvaluationStore {
    records: Mutex<Vec<EvaluationRecord>>,
    unavailable: AtomicBool,
}

impl MemoryEvaluationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EvaluationStore for MemoryEvaluationStore {
    async fn insert(&self, record: EvaluationRecord) -> StorageResult<EvaluationRecord> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateEvaluation {
                id: record.id.0.clone(),
            });
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: &EvaluationId) -> StorageResult<EvaluationRecord> {
        self.check_available()?;
        let records = self.records.lock().unwrap();
        records
            .iter()
            .find(|r| r.id == *id)
            .cloned()
            .ok_or_else(|| StorageError::EvaluationNotFound { id: id.0.clone() })
    }

    async fn list(&self, filter: &EvaluationFilter) -> StorageResult<Vec<EvaluationRecord>> {
        self.check_available()?;
        let records = self.records.lock().unwrap();
        // Reverse first so that equal timestamps keep newest-inserted first
        // under the stable sort.
        let mut matched: Vec<EvaluationRecord> = records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn replace(&self, record: EvaluationRecord) -> StorageResult<EvaluationRecord> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| StorageError::EvaluationNotFound {
                id: record.id.0.clone(),
            })?;
        *slot = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: &EvaluationId) -> StorageResult<()> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != *id);
        if records.len() == before {
            return Err(StorageError::EvaluationNotFound { id: id.0.clone() });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryKeyValueStore
// ---------------------------------------------------------------------------

/// In-memory key-value store backed by a `BTreeMap<key, value>`.
///
/// `set_unavailable(true)` fails every call; `set_read_only(true)` fails only
/// `put` and `delete`, so reads succeed and the following write does not.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, serde_json::Value>>,
    unavailable: AtomicBool,
    read_only: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> StorageResult<()> {
        self.check_available()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("store is read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        self.check_available()?;
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> StorageResult<()> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        Ok(entries.remove(key).is_some())
    }

    async fn scan_prefix(&self, prefix: &str) -> StorageResult<Vec<(String, serde_json::Value)>> {
        self.check_available()?;
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
