//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors a route can return
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client supplied a date segment that is not `YYYY-MM-DD`
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    /// Store could not be reached or the query failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidDate(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "invalid_date",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidDate(input) => {
                Self::InvalidDate(format!("{:?} is not a YYYY-MM-DD date", input))
            }
            StorageError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidDate(msg) => warn!("Rejected request: {}", msg),
            Self::StoreUnavailable(msg) => error!("Store failure: {}", msg),
        }

        metrics::counter!("api_errors_total", "type" => self.type_name()).increment(1);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": self.type_name(),
            }
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_translate() {
        let bad = ApiError::from(StorageError::InvalidDate("not-a-date".to_string()));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.to_string(), "Invalid date: \"not-a-date\" is not a YYYY-MM-DD date");

        let down = ApiError::from(StorageError::StoreUnavailable("pool timed out".to_string()));
        assert_eq!(down.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::InvalidDate("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["type"], "invalid_date");
    }
}
