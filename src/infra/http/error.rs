use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::{AppError, ErrorReport};
use crate::cache::LookupError;
use crate::domain::error::DomainError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const UPSTREAM: &str = "upstream_error";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<LookupError> for ApiError {
    fn from(error: LookupError) -> Self {
        // 4xx answers from the catalog are passed through; anything else is a bad gateway.
        let status = error
            .status_code()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(StatusCode::is_client_error)
            .unwrap_or(StatusCode::BAD_GATEWAY);
        ApiError::new(
            status,
            codes::UPSTREAM,
            "Catalog lookup failed",
            Some(error.to_string()),
        )
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Domain(DomainError::Validation { message })
            | AppError::Validation(message) => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::INVALID_INPUT,
                "Invalid book ids",
                Some(message),
            ),
            AppError::Lookup(err) => err.into(),
            other => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL,
                "Internal server error",
                Some(other.to_string()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let hint = self.hint.clone();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        // Attach a structured report so the logging middleware can emit diagnostics.
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {}", self.code, hint.as_deref().unwrap_or(self.message)),
        )
        .attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::catalog::UpstreamError;

    #[test]
    fn upstream_server_errors_become_bad_gateway() {
        let err = ApiError::from(LookupError::from(UpstreamError::status(500, "boom")));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn upstream_client_errors_pass_through() {
        let err = ApiError::from(LookupError::from(UpstreamError::status(422, "bad ids")));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn transport_errors_become_bad_gateway() {
        let err = ApiError::from(LookupError::from(UpstreamError::transport("timed out")));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_errors_become_bad_request() {
        let err = ApiError::from(AppError::from(DomainError::validation("blank id")));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let response = err.into_response();
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
