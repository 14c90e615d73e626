use anon_issuer::{signature::SignatureError, IssueError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// A request that could not be answered with a token
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is not an issuance request
    #[error("request body is not a valid issuance request")]
    Body(#[source] serde_json::Error),
    /// The request signature was missing or wrong
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// The issuance pipeline failed
    #[error(transparent)]
    Issue(#[from] IssueError),
}

impl ApiError {
    /// The HTTP status reported for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
            ApiError::Signature(_) => StatusCode::UNAUTHORIZED,
            ApiError::Issue(err) => match err {
                IssueError::Validation(_) => StatusCode::BAD_REQUEST,
                IssueError::ScopeUnavailable(_) | IssueError::ScopeMalformed => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                IssueError::AuthorityUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
                IssueError::IssuanceFailed(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(http.status_code = status.as_u16(), error = %self, "issuance failed");
        } else {
            tracing::debug!(http.status_code = status.as_u16(), error = %self, "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
