use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Failure talking to an external provider (OpenWeather or the language model).
///
/// `operation` names the call ("current weather", "geocode", ...) and `subject`
/// the city or topic it was made for.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{operation} for '{subject}' failed: provider unreachable: {detail}")]
    Unreachable {
        operation: &'static str,
        subject: String,
        detail: String,
    },

    #[error("{operation} for '{subject}' failed: provider returned HTTP {status}")]
    Rejected {
        operation: &'static str,
        subject: String,
        status: u16,
    },

    #[error("{operation} for '{subject}' failed: malformed payload: {detail}")]
    MalformedPayload {
        operation: &'static str,
        subject: String,
        detail: String,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ProviderError {
    /// Classify a reqwest failure. Status errors only show up here when the
    /// caller used `error_for_status`; decode errors mean the body had the wrong shape.
    pub fn from_reqwest(operation: &'static str, subject: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ProviderError::Rejected {
                operation,
                subject: subject.to_string(),
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            ProviderError::MalformedPayload {
                operation,
                subject: subject.to_string(),
                detail: err.to_string(),
            }
        } else {
            ProviderError::Unreachable {
                operation,
                subject: subject.to_string(),
                detail: err.to_string(),
            }
        }
    }

    pub fn malformed(operation: &'static str, subject: &str, detail: impl Into<String>) -> Self {
        ProviderError::MalformedPayload {
            operation,
            subject: subject.to_string(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Provider(
                err @ (ProviderError::Unreachable { .. } | ProviderError::Rejected { .. }),
            ) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Provider(err) => {
                tracing::error!("Provider error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<crate::services::dashboard::AggregationError> for AppError {
    fn from(err: crate::services::dashboard::AggregationError) -> Self {
        AppError::Provider(err.into_provider_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_provider_failures_map_to_bad_request() {
        let unreachable = ProviderError::Unreachable {
            operation: "current weather",
            subject: "London".to_string(),
            detail: "connection refused".to_string(),
        };
        let rejected = ProviderError::Rejected {
            operation: "current weather",
            subject: "Atlantis".to_string(),
            status: 404,
        };
        assert_eq!(status_of(unreachable.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(rejected.into()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_payload_maps_to_internal_error() {
        let err = ProviderError::malformed("forecast", "Paris", "missing field `list`");
        assert_eq!(status_of(err.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            status_of(AppError::NotFound("Subject 'x' not found".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_message_names_operation_and_city() {
        let err = ProviderError::Rejected {
            operation: "forecast",
            subject: "Atlantis".to_string(),
            status: 404,
        };
        let msg = err.to_string();
        assert!(msg.contains("forecast"));
        assert!(msg.contains("Atlantis"));
        assert!(msg.contains("404"));
    }
}
