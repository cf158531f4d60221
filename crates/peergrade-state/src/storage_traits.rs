//! Storage trait definitions for peergrade
//!
//! These traits define the core storage abstractions:
//! - `EvaluationStore`: Evaluation record persistence (insert/get/list/replace/delete)
//! - `KeyValueStore`: Generic JSON document store keyed by string, used for
//!   classroom state (users, rooms, groups, peer scores)
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Evaluation records
// ---------------------------------------------------------------------------

/// Unique identifier for an evaluation record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

impl EvaluationId {
    /// Generate a new random EvaluationId
    pub fn new() -> Self {
        EvaluationId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EvaluationId {
    fn from(s: &str) -> Self {
        EvaluationId(s.to_string())
    }
}

/// Who produced an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationKind {
    Advisor,
    Committee,
    Peer,
}

impl EvaluationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationKind::Advisor => "advisor",
            EvaluationKind::Committee => "committee",
            EvaluationKind::Peer => "peer",
        }
    }
}

/// Review status of an evaluation.
///
/// The usual progression is pending → completed → revised, but any value may
/// be set at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    #[default]
    Pending,
    Completed,
    Revised,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Completed => "completed",
            EvaluationStatus::Revised => "revised",
        }
    }
}

/// Letter grade stored on an evaluation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored content category scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentScores {
    pub clarity: f64,
    pub completeness: f64,
    pub relevance: f64,
    pub innovation: f64,
    pub subtotal: f64,
    pub max_score: f64,
}

/// Stored technical category scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalScores {
    pub design: f64,
    pub implementation: f64,
    pub testing: f64,
    pub documentation: f64,
    pub subtotal: f64,
    pub max_score: f64,
}

/// Stored presentation category scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationScores {
    pub delivery: f64,
    pub visual_aids: f64,
    pub answering_questions: f64,
    pub time_management: f64,
    pub subtotal: f64,
    pub max_score: f64,
}

/// All three rubric categories as stored on a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub content: ContentScores,
    pub technical: TechnicalScores,
    pub presentation: PresentationScores,
}

/// Full evaluation record.
///
/// `total_score`, `percentage` and `grade` are derived from `scores` and are
/// only ever written together with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub project_id: String,
    pub evaluator_id: String,
    pub evaluation_type: EvaluationKind,
    pub scores: ScoreSheet,
    pub total_score: f64,
    pub max_total_score: f64,
    pub percentage: f64,
    pub grade: Grade,
    pub comments: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub status: EvaluationStatus,
    pub evaluation_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationFilter {
    pub project_id: Option<String>,
    pub evaluator_id: Option<String>,
}

impl EvaluationFilter {
    pub fn by_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            evaluator_id: None,
        }
    }

    pub fn by_evaluator(evaluator_id: impl Into<String>) -> Self {
        Self {
            project_id: None,
            evaluator_id: Some(evaluator_id.into()),
        }
    }

    /// Whether a record passes this filter
    pub fn matches(&self, record: &EvaluationRecord) -> bool {
        self.project_id
            .as_deref()
            .map(|p| record.project_id == p)
            .unwrap_or(true)
            && self
                .evaluator_id
                .as_deref()
                .map(|e| record.evaluator_id == e)
                .unwrap_or(true)
    }
}

/// Evaluation record store.
///
/// Guarantees:
/// - `insert` fails with `DuplicateEvaluation` if the id is already present.
/// - `get`, `replace` and `delete` fail with `EvaluationNotFound` for unknown
///   ids; a second `delete` of the same id fails the same way.
/// - `list` returns records newest `created_at` first.
/// - No concurrency control: concurrent `replace` calls race, last write wins.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Persist a new record and return it as stored.
    async fn insert(&self, record: EvaluationRecord) -> StorageResult<EvaluationRecord>;

    /// Retrieve a record by id.
    async fn get(&self, id: &EvaluationId) -> StorageResult<EvaluationRecord>;

    /// List records matching the filter, newest first.
    async fn list(&self, filter: &EvaluationFilter) -> StorageResult<Vec<EvaluationRecord>>;

    /// Overwrite an existing record (matched by `record.id`).
    async fn replace(&self, record: EvaluationRecord) -> StorageResult<EvaluationRecord>;

    /// Remove a record by id.
    async fn delete(&self, id: &EvaluationId) -> StorageResult<()>;
}

// ---------------------------------------------------------------------------
// KeyValueStore: classroom state persistence port
// ---------------------------------------------------------------------------

/// String-keyed JSON document store.
///
/// Semantics:
/// - `put` inserts or overwrites.
/// - `delete` returns whether a value was removed.
/// - `scan_prefix` returns every entry whose key starts with `prefix`,
///   ordered by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<serde_json::Value>>;

    async fn put(&self, key: &str, value: serde_json::Value) -> StorageResult<()>;

    async fn delete(&self, key: &str) -> StorageResult<bool>;

    async fn scan_prefix(&self, prefix: &str) -> StorageResult<Vec<(String, serde_json::Value)>>;
}
