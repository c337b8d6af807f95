use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "healthy" while the process is serving requests
    pub status: String,
    pub message: String,
    /// API version
    pub version: String,
}

/// Liveness probe.
///
/// Does not touch the weather provider or the language model, so it stays
/// green while either is down.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "ClimateBuddy API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Plain-text banner for the root path.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service banner", body = String, content_type = "text/plain"))
)]
pub async fn root() -> &'static str {
    "running"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{app, get};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "healthy");
        assert!(!body.version.is_empty());
    }

    #[tokio::test]
    async fn test_root_is_plain_text() {
        // Unreachable provider; the root path must not depend on it.
        let response = app("http://127.0.0.1:1").oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"running");
    }
}
