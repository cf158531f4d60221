//! Evaluation record construction and patching.
//!
//! Both paths run the aggregator and the classifier, so `total_score`,
//! `percentage` and `grade` are never taken from the caller.

use chrono::{DateTime, Utc};
use peergrade_state::{EvaluationId, EvaluationKind, EvaluationRecord, EvaluationStatus};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::grade::classify;
use crate::rubric::{aggregate, percentage, RubricScores, ScoresInput, MAX_TOTAL_SCORE};

/// Create request for an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvaluation {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub evaluator_id: String,
    pub evaluation_type: Option<EvaluationKind>,
    #[serde(default)]
    pub scores: ScoresInput,
    pub comments: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    pub status: Option<EvaluationStatus>,
}

/// Partial update. Absent fields are left as stored.
///
/// `scores`, when present, must carry all twelve sub-criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPatch {
    pub scores: Option<ScoresInput>,
    pub comments: Option<String>,
    pub strengths: Option<Vec<String>>,
    pub improvements: Option<Vec<String>>,
    pub status: Option<EvaluationStatus>,
}

impl EvaluationPatch {
    pub fn is_empty(&self) -> bool {
        self.scores.is_none()
            && self.comments.is_none()
            && self.strengths.is_none()
            && self.improvements.is_none()
            && self.status.is_none()
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EvalError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn apply_scores(record: &mut EvaluationRecord, scores: &RubricScores) {
    let agg = aggregate(scores);
    let pct = percentage(agg.total_score);
    record.scores = agg.sheet;
    record.total_score = agg.total_score;
    record.max_total_score = MAX_TOTAL_SCORE;
    record.percentage = pct;
    record.grade = classify(pct);
}

/// Build a fully populated record from a create request.
pub fn build_record(input: NewEvaluation, now: DateTime<Utc>) -> Result<EvaluationRecord> {
    require_non_empty(&input.project_id, "projectId")?;
    require_non_empty(&input.evaluator_id, "evaluatorId")?;
    let evaluation_type = input
        .evaluation_type
        .ok_or_else(|| EvalError::Validation("evaluationType is required".to_string()))?;
    let comments = input.comments.unwrap_or_default();
    require_non_empty(&comments, "comments")?;
    let scores = input.scores.into_complete()?;

    let agg = aggregate(&scores);
    let pct = percentage(agg.total_score);

    Ok(EvaluationRecord {
        id: EvaluationId::new(),
        project_id: input.project_id,
        evaluator_id: input.evaluator_id,
        evaluation_type,
        scores: agg.sheet,
        total_score: agg.total_score,
        max_total_score: MAX_TOTAL_SCORE,
        percentage: pct,
        grade: classify(pct),
        comments,
        strengths: input.strengths,
        improvements: input.improvements,
        status: input.status.unwrap_or_default(),
        evaluation_date: now,
        created_at: now,
        updated_at: now,
    })
}

/// Apply a patch to a stored record, re-deriving scores when they change.
///
/// Validation happens before any field is touched, so a rejected patch
/// leaves `record` unchanged.
pub fn apply_patch(
    mut record: EvaluationRecord,
    patch: EvaluationPatch,
    now: DateTime<Utc>,
) -> Result<EvaluationRecord> {
    let scores = patch.scores.map(ScoresInput::into_complete).transpose()?;
    if let Some(comments) = patch.comments.as_deref() {
        require_non_empty(comments, "comments")?;
    }

    if let Some(scores) = scores {
        apply_scores(&mut record, &scores);
    }
    if let Some(comments) = patch.comments {
        record.comments = comments;
    }
    if let Some(strengths) = patch.strengths {
        record.strengths = strengths;
    }
    if let Some(improvements) = patch.improvements {
        record.improvements = improvements;
    }
    if let Some(status) = patch.status {
        record.status = status;
    }
    record.updated_at = now;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peergrade_state::Grade;

    fn new_eval(scores: RubricScores) -> NewEvaluation {
        NewEvaluation {
            project_id: "proj-1".to_string(),
            evaluator_id: "teacher-1".to_string(),
            evaluation_type: Some(EvaluationKind::Advisor),
            scores: scores.into(),
            comments: Some("Well structured".to_string()),
            strengths: vec!["architecture".to_string()],
            improvements: vec![],
            status: None,
        }
    }

    #[test]
    fn test_perfect_scores_yield_a() {
        let record = build_record(new_eval(RubricScores::uniform(10.0)), Utc::now()).unwrap();
        assert_eq!(record.scores.content.subtotal, 40.0);
        assert_eq!(record.scores.technical.subtotal, 40.0);
        assert_eq!(record.scores.presentation.subtotal, 40.0);
        assert_eq!(record.total_score, 120.0);
        assert_eq!(record.max_total_score, 120.0);
        assert_eq!(record.percentage, 100.0);
        assert_eq!(record.grade, Grade::A);
    }

    #[test]
    fn test_all_fives_yield_d() {
        let record = build_record(new_eval(RubricScores::uniform(5.0)), Utc::now()).unwrap();
        assert_eq!(record.scores.content.subtotal, 20.0);
        assert_eq!(record.total_score, 60.0);
        assert_eq!(record.percentage, 50.0);
        assert_eq!(record.grade, Grade::D);
    }

    #[test]
    fn test_defaults_and_timestamps() {
        let now = Utc::now();
        let record = build_record(new_eval(RubricScores::uniform(7.0)), now).unwrap();
        assert_eq!(record.status, EvaluationStatus::Pending);
        assert_eq!(record.evaluation_date, now);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
        assert!(!record.id.as_str().is_empty());
    }

    #[test]
    fn test_missing_comments_rejected() {
        let mut input = new_eval(RubricScores::uniform(7.0));
        input.comments = None;
        assert!(matches!(
            build_record(input, Utc::now()),
            Err(EvalError::Validation(_))
        ));

        let mut input = new_eval(RubricScores::uniform(7.0));
        input.comments = Some("   ".to_string());
        assert!(matches!(
            build_record(input, Utc::now()),
            Err(EvalError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_refs_and_kind_rejected() {
        let mut input = new_eval(RubricScores::uniform(7.0));
        input.project_id.clear();
        assert!(build_record(input, Utc::now()).is_err());

        let mut input = new_eval(RubricScores::uniform(7.0));
        input.evaluator_id.clear();
        assert!(build_record(input, Utc::now()).is_err());

        let mut input = new_eval(RubricScores::uniform(7.0));
        input.evaluation_type = None;
        let err = build_record(input, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("evaluationType"));
    }

    #[test]
    fn test_incomplete_scores_rejected() {
        let mut input = new_eval(RubricScores::uniform(7.0));
        input.scores.content = None;
        let err = build_record(input, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("scores.content.clarity"));
    }

    #[test]
    fn test_score_patch_recomputes_and_keeps_other_fields() {
        let created = build_record(new_eval(RubricScores::uniform(10.0)), Utc::now()).unwrap();
        let patch = EvaluationPatch {
            scores: Some(RubricScores::uniform(5.0).into()),
            ..Default::default()
        };
        let updated = apply_patch(created.clone(), patch, Utc::now()).unwrap();

        assert_eq!(updated.total_score, 60.0);
        assert_eq!(updated.percentage, 50.0);
        assert_eq!(updated.grade, Grade::D);
        assert_eq!(updated.scores.technical.design, 5.0);
        assert_eq!(updated.comments, created.comments);
        assert_eq!(updated.strengths, created.strengths);
        assert_eq!(updated.improvements, created.improvements);
        assert_eq!(updated.status, created.status);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.evaluation_date, created.evaluation_date);
    }

    #[test]
    fn test_text_patch_leaves_scores_alone() {
        let created = build_record(new_eval(RubricScores::uniform(8.0)), Utc::now()).unwrap();
        let patch = EvaluationPatch {
            comments: Some("Updated".to_string()),
            improvements: Some(vec!["more tests".to_string()]),
            status: Some(EvaluationStatus::Completed),
            ..Default::default()
        };
        let updated = apply_patch(created.clone(), patch, Utc::now()).unwrap();

        assert_eq!(updated.comments, "Updated");
        assert_eq!(updated.improvements, vec!["more tests".to_string()]);
        assert_eq!(updated.status, EvaluationStatus::Completed);
        assert_eq!(updated.scores, created.scores);
        assert_eq!(updated.grade, created.grade);
        assert_eq!(updated.strengths, created.strengths);
    }

    #[test]
    fn test_status_can_move_backwards() {
        let mut created = build_record(new_eval(RubricScores::uniform(8.0)), Utc::now()).unwrap();
        created.status = EvaluationStatus::Revised;
        let patch = EvaluationPatch {
            status: Some(EvaluationStatus::Pending),
            ..Default::default()
        };
        let updated = apply_patch(created, patch, Utc::now()).unwrap();
        assert_eq!(updated.status, EvaluationStatus::Pending);
    }

    #[test]
    fn test_partial_score_patch_rejected() {
        let created = build_record(new_eval(RubricScores::uniform(8.0)), Utc::now()).unwrap();
        let mut partial: ScoresInput = RubricScores::uniform(2.0).into();
        partial.presentation = None;
        let patch = EvaluationPatch {
            scores: Some(partial),
            comments: Some("changed".to_string()),
            ..Default::default()
        };
        let err = apply_patch(created, patch, Utc::now()).unwrap_err();
        assert!(matches!(err, EvalError::Validation(_)));
    }

    #[test]
    fn test_new_evaluation_from_wire_json() {
        let input: NewEvaluation = serde_json::from_value(serde_json::json!({
            "projectId": "p-9",
            "evaluatorId": "s-2",
            "evaluationType": "peer",
            "scores": {
                "content": {"clarity": 8, "completeness": 8, "relevance": 8, "innovation": 8},
                "technical": {"design": 8, "implementation": 8, "testing": 8, "documentation": 8},
                "presentation": {
                    "delivery": 8, "visualAids": 8, "answeringQuestions": 8, "timeManagement": 8
                }
            },
            "comments": "Good"
        }))
        .unwrap();
        let record = build_record(input, Utc::now()).unwrap();
        assert_eq!(record.total_score, 96.0);
        assert_eq!(record.grade, Grade::A);
        assert_eq!(record.evaluation_type, EvaluationKind::Peer);
        assert!(record.strengths.is_empty());
    }
}
