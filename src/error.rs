//! Error taxonomy for the admission engine.
//!
//! Every engine operation returns a typed error so the HTTP boundary can map
//! it to a transport status code deterministically. Errors are never retried
//! inside the engine; retry policy belongs to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum QueueError {
    /// Member is already present in the queue's wait set.
    #[error("user already registered in queue")]
    AlreadyRegistered,

    /// The conditional insert reported success but the member could not be
    /// found afterwards (wait key dropped between the two store calls).
    #[error("queue registration did not take effect")]
    RegistrationFailed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueueError {
    /// Stable error code exposed in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            QueueError::AlreadyRegistered => "GQ-0001",
            QueueError::RegistrationFailed => "GQ-0002",
            QueueError::Store(_) => "GQ-0003",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            QueueError::AlreadyRegistered => StatusCode::CONFLICT,
            QueueError::RegistrationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            QueueError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Error body shape: `{code, message}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
