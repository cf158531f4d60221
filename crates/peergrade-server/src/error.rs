use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use peergrade_core::{ClassroomError, EvalError};
use thiserror::Error;

use crate::envelope::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Evaluation(#[from] EvalError),

    #[error("{0}")]
    Classroom(#[from] ClassroomError),

    #[error("malformed request: {0}")]
    MalformedPayload(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Evaluation(EvalError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Evaluation(EvalError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Evaluation(EvalError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Classroom(ClassroomError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Classroom(ClassroomError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Classroom(ClassroomError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Classroom(ClassroomError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Classroom(ClassroomError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::failure(self.to_string()))).into_response()
    }
}
