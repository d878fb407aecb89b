use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    RidesNotFound,
    Server,
}

impl ErrorCode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::RidesNotFound => "RIDES_NOT_FOUND_ERROR",
            Self::Server => "SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::RidesNotFound => StatusCode::NOT_FOUND,
            Self::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.name(), self.message)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error_code": self.code.name(),
            "message": self.message,
        }));

        (self.code.status(), body).into_response()
    }
}

pub fn validation_error(message: impl Into<String>) -> Error {
    Error {
        code: ErrorCode::Validation,
        message: message.into(),
    }
}

pub fn rides_not_found_error() -> Error {
    Error {
        code: ErrorCode::RidesNotFound,
        message: "Could not find any rides".into(),
    }
}

/// The message never carries internal detail; callers log the cause first.
pub fn server_error() -> Error {
    Error {
        code: ErrorCode::Server,
        message: "Unknown error".into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "database error");
    server_error()
}

pub fn env_var_error(err: env::VarError) -> Error {
    Error {
        code: ErrorCode::Server,
        message: format!("environment variable error: {}", err),
    }
}

pub fn config_error(name: &str, value: &str) -> Error {
    Error {
        code: ErrorCode::Server,
        message: format!("invalid value {:?} for {}", value, name),
    }
}

#[test]
fn error_codes_map_to_statuses() {
    assert_eq!(ErrorCode::Validation.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ErrorCode::RidesNotFound.status(), StatusCode::NOT_FOUND);
    assert_eq!(ErrorCode::Server.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn database_errors_hide_detail() {
    let err: Error = sqlx::Error::RowNotFound.into();

    assert_eq!(err.code, ErrorCode::Server);
    assert_eq!(err.message, "Unknown error");
}

#[test]
fn error_body_shape() {
    let response = validation_error("ID must be an integer").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = tokio_test::block_on(hyper::body::to_bytes(response.into_body())).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        value,
        json!({ "error_code": "VALIDATION_ERROR", "message": "ID must be an integer" })
    );
}
