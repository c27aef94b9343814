use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tododb::TodoError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Google sign-in is not configured")]
    GoogleDisabled,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::GoogleDisabled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Todo(err) => match err {
                TodoError::Validation(_) => StatusCode::BAD_REQUEST,
                TodoError::NotFound => StatusCode::NOT_FOUND,
                TodoError::Conflict(_) => StatusCode::CONFLICT,
                TodoError::InvalidCredentials
                | TodoError::Unauthorized
                | TodoError::Token(_)
                | TodoError::Identity(_) => StatusCode::UNAUTHORIZED,
                TodoError::Database(_) | TodoError::Http(_) | TodoError::Hash(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON input: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tododb::sea_orm::DbErr;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(TodoError::validation("x")), StatusCode::BAD_REQUEST),
            (ApiError::from(TodoError::NotFound), StatusCode::NOT_FOUND),
            (ApiError::from(TodoError::Conflict("x".into())), StatusCode::CONFLICT),
            (ApiError::from(TodoError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (ApiError::from(TodoError::Unauthorized), StatusCode::UNAUTHORIZED),
            (ApiError::GoogleDisabled, StatusCode::SERVICE_UNAVAILABLE),
            (
                ApiError::from(TodoError::Database(DbErr::Custom("boom".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = ApiError::from(TodoError::Database(DbErr::Custom("secret table".into())));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
