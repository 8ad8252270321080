//! Errors surfaced by the identity and video services.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Username {0} is already taken")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("You need to log in first")]
    NotAuthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Please fill in all fields")]
    EmptyField,

    #[error("You are not allowed to do that")]
    Forbidden,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DuplicateUsername(_) => StatusCode::CONFLICT,
            ServiceError::InvalidCredentials | ServiceError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::EmptyField => StatusCode::BAD_REQUEST,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::Io(_) | ServiceError::Storage(_) | ServiceError::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
