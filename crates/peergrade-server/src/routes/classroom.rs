//! Session, room, group and peer-score handlers.
//!
//! The acting user is identified by `userId` in the request body.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use peergrade_core::{avatar_url, Group, GroupAnalytics, PeerScore, Role, Room, RoomOverview, User};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::envelope::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub user: User,
    pub avatar_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub rubric: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerScoreRequest {
    pub user_id: String,
    pub evaluator_group: String,
    pub target_group: String,
    pub scores: BTreeMap<String, u8>,
    #[serde(default)]
    pub comment: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<SessionView> {
    let Json(req) = payload?;
    let user = state.classroom.login(&req.name, req.role).await?;
    let view = SessionView {
        avatar_url: avatar_url(&state.avatar_base_url, &user.avatar_seed),
        user,
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

pub async fn create_room(
    State(state): State<AppState>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> ApiResult<Room> {
    let Json(req) = payload?;
    let room = state
        .classroom
        .create_room(&req.user_id, &req.name, &req.rubric)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(room))))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Room> {
    let room = state.classroom.room(&code).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(room))))
}

pub async fn join_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> ApiResult<Room> {
    let Json(req) = payload?;
    let room = state.classroom.join_room(&code, &req.user_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(room))))
}

pub async fn create_group(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> ApiResult<Group> {
    let Json(req) = payload?;
    let group = state
        .classroom
        .create_group(&code, &req.name, &req.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(group))))
}

pub async fn join_group(
    State(state): State<AppState>,
    Path((code, group_id)): Path<(String, String)>,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> ApiResult<Group> {
    let Json(req) = payload?;
    let group = state
        .classroom
        .join_group(&code, &group_id, &req.user_id)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(group))))
}

pub async fn submit_peer_score(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<PeerScoreRequest>, JsonRejection>,
) -> ApiResult<PeerScore> {
    let Json(req) = payload?;
    let score = state
        .classroom
        .submit_peer_score(
            &code,
            &req.user_id,
            &req.evaluator_group,
            &req.target_group,
            req.scores,
            &req.comment,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(score))))
}

pub async fn room_analytics(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<RoomOverview> {
    let overview = state.classroom.room_overview(&code).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(overview))))
}

pub async fn group_analytics(
    State(state): State<AppState>,
    Path((code, group_id)): Path<(String, String)>,
) -> ApiResult<GroupAnalytics> {
    let analytics = state.classroom.group_analytics(&code, &group_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(analytics))))
}
