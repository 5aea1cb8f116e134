//! Maps domain errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domains::walks::{ErrorKind, WalkError};

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, kind: &'static str) -> Self {
        Self {
            error: error.into(),
            kind,
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "validation",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Forbidden => "forbidden",
        ErrorKind::Conflict => "conflict",
        ErrorKind::BusinessRule => "business_rule",
        ErrorKind::Internal => "internal",
    }
}

impl IntoResponse for WalkError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = match &self {
            WalkError::Internal(e) => {
                error!(error = %e, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status_for(kind), Json(ErrorBody::new(message, kind_name(kind)))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_map_to_409() {
        let response = WalkError::RequestNoLongerOpen.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_business_rules_map_to_422() {
        let response = WalkError::NotEligible.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response = WalkError::from(anyhow::anyhow!("password=hunter2")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
