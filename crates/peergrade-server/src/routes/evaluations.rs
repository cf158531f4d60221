use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use peergrade_core::{
    EvaluationFilter, EvaluationId, EvaluationPatch, EvaluationRecord, EvaluationSummary,
    NewEvaluation,
};
use serde::Deserialize;

use super::ApiResult;
use crate::envelope::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub project_id: Option<String>,
    pub evaluator_id: Option<String>,
}

impl From<ListQuery> for EvaluationFilter {
    fn from(q: ListQuery) -> Self {
        // Empty query values mean "no filter".
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        EvaluationFilter {
            project_id: keep(q.project_id),
            evaluator_id: keep(q.evaluator_id),
        }
    }
}

pub async fn create_evaluation(
    State(state): State<AppState>,
    payload: Result<Json<NewEvaluation>, JsonRejection>,
) -> ApiResult<EvaluationRecord> {
    let Json(input) = payload?;
    let record = state.evaluations.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(record, "Evaluation created")),
    ))
}

pub async fn list_evaluations(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<EvaluationRecord>> {
    let Query(query) = query?;
    let records = state.evaluations.list(&query.into()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(records))))
}

pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EvaluationRecord> {
    let record = state.evaluations.get(&EvaluationId(id)).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(record))))
}

/// Serves both PUT and PATCH; absent fields are left untouched either way.
pub async fn update_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EvaluationPatch>, JsonRejection>,
) -> ApiResult<EvaluationRecord> {
    let Json(patch) = payload?;
    let record = state.evaluations.update(&EvaluationId(id), patch).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok_with_message(record, "Evaluation updated")),
    ))
}

pub async fn delete_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    state.evaluations.delete(&EvaluationId(id.clone())).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok_with_message(
            serde_json::json!({ "id": id }),
            "Evaluation deleted",
        )),
    ))
}

pub async fn evaluation_summary(State(state): State<AppState>) -> ApiResult<EvaluationSummary> {
    let summary = state.evaluations.summary().await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(summary))))
}
