//! API Error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use groot_core::{QueryError, SubmitError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),

            ApiError::Submit(e) => match e {
                // The caller's request was valid but the ledger said no.
                SubmitError::ProposalRejected { .. } => {
                    (StatusCode::CONFLICT, "PROPOSAL_REJECTED")
                }
                SubmitError::CommitInvalid { .. } => (StatusCode::CONFLICT, "COMMIT_INVALID"),

                // Upstream infrastructure failed or misbehaved.
                SubmitError::OrderingFailed { .. } => (StatusCode::BAD_GATEWAY, "ORDERING_FAILED"),
                SubmitError::EventHub(_) => (StatusCode::BAD_GATEWAY, "EVENT_HUB_ERROR"),
                SubmitError::Channel(_) => (StatusCode::BAD_GATEWAY, "CHANNEL_ERROR"),

                // Upstream did not answer in time. A COMMIT_TIMEOUT leaves
                // the ledger state indeterminate; clients should query
                // before retrying.
                SubmitError::OrderingTimeout { .. } => {
                    (StatusCode::GATEWAY_TIMEOUT, "ORDERING_TIMEOUT")
                }
                SubmitError::CommitTimeout { .. } => {
                    (StatusCode::GATEWAY_TIMEOUT, "COMMIT_TIMEOUT")
                }
            },

            ApiError::Query(e) => match e {
                QueryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                QueryError::Channel(_) => (StatusCode::BAD_GATEWAY, "CHANNEL_ERROR"),
            },
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;
