pub mod classroom;
pub mod evaluations;

use axum::{http::StatusCode, Json};

use crate::envelope::ApiResponse;
use crate::error::ApiError;

pub(crate) type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;
