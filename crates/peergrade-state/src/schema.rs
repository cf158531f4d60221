//! Row definitions for peergrade SurrealDB tables
//!
//! Tables:
//! - evaluations: Evaluation records, with the filter/sort columns lifted out
//!   of the document so they can be indexed
//! - kv: Classroom state documents keyed by string

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_traits::EvaluationRecord;

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Evaluation row - one evaluation record plus its indexed columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRow {
    /// SurrealDB record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    /// Evaluation ID (UUID string)
    pub evaluation_id: String,
    /// Project reference (indexed)
    pub project_id: String,
    /// Evaluator reference (indexed)
    pub evaluator_id: String,
    /// Created timestamp (indexed, listing order)
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    /// The full record document
    pub record: EvaluationRecord,
}

impl EvaluationRow {
    pub fn from_record(record: EvaluationRecord) -> Self {
        EvaluationRow {
            id: None,
            evaluation_id: record.id.0.clone(),
            project_id: record.project_id.clone(),
            evaluator_id: record.evaluator_id.clone(),
            created_at: record.created_at,
            record,
        }
    }

    pub fn into_record(self) -> EvaluationRecord {
        self.record
    }
}

/// Key-value row - one classroom state document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvRow {
    /// SurrealDB record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    /// Logical key (e.g. `rooms/ABC123`)
    pub key: String,
    /// Stored JSON document
    pub value: serde_json::Value,
}

impl KvRow {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        KvRow {
            id: None,
            key: key.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_traits::*;

    fn sample_record() -> EvaluationRecord {
        let now = Utc::now();
        EvaluationRecord {
            id: EvaluationId::from("eval-1"),
            project_id: "proj-7".to_string(),
            evaluator_id: "stu-3".to_string(),
            evaluation_type: EvaluationKind::Peer,
            scores: ScoreSheet {
                content: ContentScores {
                    clarity: 8.0,
                    completeness: 8.0,
                    relevance: 8.0,
                    innovation: 8.0,
                    subtotal: 32.0,
                    max_score: 40.0,
                },
                technical: TechnicalScores {
                    design: 7.0,
                    implementation: 7.0,
                    testing: 7.0,
                    documentation: 7.0,
                    subtotal: 28.0,
                    max_score: 40.0,
                },
                presentation: PresentationScores {
                    delivery: 9.0,
                    visual_aids: 9.0,
                    answering_questions: 9.0,
                    time_management: 9.0,
                    subtotal: 36.0,
                    max_score: 40.0,
                },
            },
            total_score: 96.0,
            max_total_score: 120.0,
            percentage: 80.0,
            grade: Grade::A,
            comments: "Solid work".to_string(),
            strengths: vec!["clear slides".to_string()],
            improvements: Vec::new(),
            status: EvaluationStatus::Pending,
            evaluation_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_evaluation_row_lifts_indexed_columns() {
        let record = sample_record();
        let row = EvaluationRow::from_record(record.clone());
        assert_eq!(row.evaluation_id, "eval-1");
        assert_eq!(row.project_id, "proj-7");
        assert_eq!(row.evaluator_id, "stu-3");
        assert_eq!(row.created_at, record.created_at);
        assert!(row.id.is_none());
        assert_eq!(row.into_record(), record);
    }

    #[test]
    fn test_record_serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["projectId"], "proj-7");
        assert_eq!(json["evaluationType"], "peer");
        assert_eq!(json["grade"], "A");
        assert_eq!(json["maxTotalScore"], 120.0);
        assert_eq!(json["scores"]["presentation"]["visualAids"], 9.0);
        assert_eq!(json["scores"]["content"]["maxScore"], 40.0);
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_kv_row_new() {
        let row = KvRow::new("rooms/ABC123", serde_json::json!({"name": "Demo"}));
        assert_eq!(row.key, "rooms/ABC123");
        assert_eq!(row.value["name"], "Demo");
    }
}
