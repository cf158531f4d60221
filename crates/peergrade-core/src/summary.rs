//! Aggregate statistics over stored evaluations.

use std::collections::HashSet;

use peergrade_state::{EvaluationKind, EvaluationRecord};
use serde::{Deserialize, Serialize};

use crate::grade::GradeDistribution;

/// Mean category subtotals. All zero when there is nothing to average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageScores {
    pub content: f64,
    pub technical: f64,
    pub presentation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub total_evaluations: u64,
    /// Distinct `projectId` values.
    pub total_projects: u64,
    /// Distinct evaluators that submitted peer evaluations.
    pub total_students: u64,
    pub average_scores: AverageScores,
    pub grade_distribution: GradeDistribution,
}

/// Compute the summary over `records`.
pub fn summarize(records: &[EvaluationRecord]) -> EvaluationSummary {
    let projects: HashSet<&str> = records.iter().map(|r| r.project_id.as_str()).collect();
    let students: HashSet<&str> = records
        .iter()
        .filter(|r| r.evaluation_type == EvaluationKind::Peer)
        .map(|r| r.evaluator_id.as_str())
        .collect();

    let average_scores = if records.is_empty() {
        AverageScores::default()
    } else {
        let n = records.len() as f64;
        let (c, t, p) = records.iter().fold((0.0, 0.0, 0.0), |(c, t, p), r| {
            (
                c + r.scores.content.subtotal,
                t + r.scores.technical.subtotal,
                p + r.scores.presentation.subtotal,
            )
        });
        AverageScores {
            content: c / n,
            technical: t / n,
            presentation: p / n,
        }
    };

    EvaluationSummary {
        total_evaluations: records.len() as u64,
        total_projects: projects.len() as u64,
        total_students: students.len() as u64,
        average_scores,
        grade_distribution: records.iter().map(|r| r.grade).collect(),
    }
}
