//! Error and envelope bodies shared by every endpoint.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::UseCaseError;

/// `{"errors": "<message>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: message.into(),
        }
    }
}

/// `{"data": …}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn ok(data: T) -> Response {
        (StatusCode::OK, Json(Self { data })).into_response()
    }
}

pub fn status_for(error: &UseCaseError) -> StatusCode {
    match error {
        UseCaseError::Validation(_) => StatusCode::BAD_REQUEST,
        UseCaseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
        UseCaseError::Conflict(_) => StatusCode::CONFLICT,
        UseCaseError::Persistence(_) | UseCaseError::Encoding(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn handle_use_case_error(error: UseCaseError) -> Response {
    (status_for(&error), Json(ErrorResponse::new(error.to_string()))).into_response()
}

pub fn handle_body_rejection(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(rejection.body_text())),
    )
        .into_response()
}

pub fn handle_query_rejection(rejection: QueryRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(rejection.body_text())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_case_errors_map_to_status_codes() {
        let cases = [
            (UseCaseError::validation("bad"), StatusCode::BAD_REQUEST),
            (UseCaseError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (UseCaseError::not_found("contact"), StatusCode::NOT_FOUND),
            (UseCaseError::Conflict("taken".into()), StatusCode::CONFLICT),
            (UseCaseError::persistence("db"), StatusCode::INTERNAL_SERVER_ERROR),
            (UseCaseError::Encoding("json".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(handle_use_case_error(error).status(), status);
        }
    }

    #[test]
    fn error_body_uses_errors_key() {
        let body = serde_json::to_value(ErrorResponse::new("contact not found")).unwrap();
        assert_eq!(body, serde_json::json!({"errors": "contact not found"}));
    }
}
