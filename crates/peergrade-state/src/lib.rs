//! peergrade-state: SurrealDB Backend for peergrade
//!
//! This crate provides the persistence layer for the evaluation service. It
//! handles all I/O with SurrealDB behind two backend-agnostic traits.
//!
//! ## Key Components
//!
//! - `SurrealHandle`: Manages connection setup and schema initialization
//! - `EvaluationStore`: Evaluation record persistence
//! - `KeyValueStore`: Classroom state persistence port
//! - `fakes`: In-memory implementations of both traits

mod error;
pub mod fakes;
mod handle;
pub mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_evaluations;
pub mod surreal_kv;

pub use error::{StateError, StorageError};
pub use handle::{StoreConfig, StoreTarget, SurrealHandle};
pub use schema::{EvaluationRow, KvRow};
pub use storage_traits::{
    ContentScores, EvaluationFilter, EvaluationId, EvaluationKind, EvaluationRecord,
    EvaluationStatus, EvaluationStore, Grade, KeyValueStore, PresentationScores, ScoreSheet,
    StorageResult, TechnicalScores,
};
pub use surreal_evaluations::SurrealEvaluationStore;
pub use surreal_kv::SurrealKeyValueStore;

/// Result type for peergrade-state connection/setup operations
pub type Result<T> = std::result::Result<T, StateError>;
