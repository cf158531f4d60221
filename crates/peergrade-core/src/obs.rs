//! Structured observability hooks for evaluation and classroom events.
//!
//! Events are emitted at `info!` level with an `event` field naming the
//! lifecycle step. Store failures are emitted at `warn!`.

use tracing::info;

/// Request-scoped span for one evaluation.
///
/// Attach it with `Instrument::instrument` rather than `entered()` so the
/// instrumented future stays `Send`.
pub fn evaluation_span(evaluation_id: &str) -> tracing::Span {
    tracing::info_span!("peergrade.evaluation", evaluation_id = %evaluation_id)
}

/// Emit event: evaluation stored with its derived grade.
///
/// ```ignore
/// emit_evaluation_created("e-1", "proj-7", "B+", 76.6);
/// // logs: event=evaluation.created evaluation_id=e-1 project_id=proj-7 grade=B+ percentage=76.6
/// ```
pub fn emit_evaluation_created(evaluation_id: &str, project_id: &str, grade: &str, percentage: f64) {
    info!(
        event = "evaluation.created",
        evaluation_id = %evaluation_id,
        project_id = %project_id,
        grade = %grade,
        percentage = percentage,
    );
}

pub fn emit_evaluation_updated(evaluation_id: &str, rescored: bool, grade: &str) {
    info!(
        event = "evaluation.updated",
        evaluation_id = %evaluation_id,
        rescored = rescored,
        grade = %grade,
    );
}

pub fn emit_evaluation_deleted(evaluation_id: &str) {
    info!(event = "evaluation.deleted", evaluation_id = %evaluation_id);
}

/// Emit event: a store call failed (warning level).
pub fn emit_store_failure(operation: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "store.failure", operation = %operation, error = %error);
}

pub fn emit_room_created(room_code: &str, owner_id: &str) {
    info!(event = "room.created", room_code = %room_code, owner_id = %owner_id);
}

pub fn emit_group_created(room_code: &str, group_id: &str) {
    info!(event = "group.created", room_code = %room_code, group_id = %group_id);
}

/// Emit event: a peer score was stored. `replaced` is true on resubmission.
pub fn emit_peer_score_submitted(room_code: &str, evaluator: &str, target: &str, replaced: bool) {
    info!(
        event = "peer_score.submitted",
        room_code = %room_code,
        evaluator_group = %evaluator,
        target_group = %target,
        replaced = replaced,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_span_create() {
        let _guard = evaluation_span("test-evaluation-id").entered();
        emit_evaluation_created("test-evaluation-id", "p", "A", 100.0);
    }
}
