pub mod chat;
pub mod dashboard;
pub mod health;
pub mod weather;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::services::dashboard::DashboardOptions;
use crate::services::openweather::OpenWeatherClient;
use crate::services::tutor::TutorEngine;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub weather: OpenWeatherClient,
    pub tutor: Arc<TutorEngine>,
    pub dashboard: DashboardOptions,
}

/// All API routes. Swagger UI and middleware layers are added in `main`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Chat accepts the POST with and without the trailing slash.
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/", post(chat::chat))
        .route("/api/chat/topics", get(chat::list_topics))
        .route("/api/chat/subjects", get(chat::list_subjects))
        .route(
            "/api/chat/subjects/:subject_id/topics",
            get(chat::get_subject_topics),
        )
        .route("/api/chat/explain/:topic", get(chat::explain_topic))
        .route(
            "/api/weather/current/:city",
            get(weather::get_current_weather),
        )
        .route("/api/weather/forecast/:city", get(weather::get_forecast))
        .route(
            "/api/weather/climate-data/:city",
            get(weather::get_climate_data),
        )
        .route(
            "/api/weather/air-quality/:city",
            get(weather::get_air_quality),
        )
        .route("/api/weather/cities/search", get(weather::search_cities))
        .route("/api/dashboard/data", get(dashboard::get_dashboard_data))
        .route("/api/dashboard/cities/search", get(dashboard::search_cities))
        .route(
            "/api/dashboard/chart-data/:chart_type",
            get(dashboard::get_chart_data),
        )
        .with_state(state)
}
