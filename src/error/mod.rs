use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ============================================================================
// Extraction errors
// ============================================================================

/// A URL rejected by the syntax check. Raised before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL is required")]
    Empty,

    #[error("Invalid URL: {0}")]
    Malformed(String),
}

/// The outbound fetch did not produce a usable response.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(e)
        }
    }
}

/// Why an extraction fell back to the degraded record. Never propagated past
/// the extractor; carried alongside the metadata for logging and callers
/// that care.
#[derive(Error, Debug)]
pub enum ExtractFailure {
    #[error("fetch failed: {0}")]
    Fetch(FetchError),

    #[error("parse failed: {0}")]
    Parse(String),
}

impl From<FetchError> for ExtractFailure {
    fn from(e: FetchError) -> Self {
        ExtractFailure::Fetch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_returns_400() {
        let response = AppError::Validation("invalid input".into()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_error_returns_404() {
        let response = AppError::NotFound("Link not found".into()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn conflict_error_returns_409() {
        let response = AppError::Conflict("already exists".into()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn database_row_not_found_returns_500() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(
            response.status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn validation_error_body_has_error_key() {
        let response = AppError::Validation("invalid input".into()).into_response();
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "invalid input");
    }

    #[tokio::test]
    async fn conflict_error_body_has_error_key() {
        let response = AppError::Conflict("already exists".into()).into_response();
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "already exists");
    }

    #[tokio::test]
    async fn url_validation_error_maps_to_400_with_message() {
        let err: AppError = ValidationError::Malformed("not-a-url".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "Invalid URL: not-a-url");
    }

    #[test]
    fn sqlx_errors_map_to_database() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn network_error_message_is_not_repeated_in_source_chain() {
        let request_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = FetchError::from(request_err);
        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.to_string().starts_with("network error: "));
        assert!(std::error::Error::source(&err).is_none());

        let failure = ExtractFailure::from(err);
        assert!(failure.to_string().starts_with("fetch failed: network error: "));
        assert!(std::error::Error::source(&failure).is_none());
    }

    #[test]
    fn extract_failure_wraps_fetch_status() {
        let failure: ExtractFailure = FetchError::Status(500).into();
        assert_eq!(
            failure.to_string(),
            "fetch failed: upstream returned HTTP 500"
        );
    }
}
