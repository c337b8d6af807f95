// ClimateBuddy API v0.1
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::dashboard::DashboardOptions;
use services::llm::{LanguageModel, OpenAiCompatibleClient};
use services::openweather::OpenWeatherClient;
use services::tutor::{ModelSettings, TutorEngine};

/// ClimateBuddy API OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClimateBuddy API",
        version = "0.1.0",
        description = "Climate science tutor and weather dashboard. \
            Answers learner questions through a language model with canned fallbacks, \
            proxies OpenWeather current conditions, forecasts and air quality, and \
            aggregates them into chart-ready dashboard data.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Chat", description = "Climate tutor and topic catalog"),
        (name = "Weather", description = "Weather, air quality and city lookup"),
        (name = "Dashboard", description = "Aggregated dashboard and chart data"),
    ),
    paths(
        routes::health::root,
        routes::health::health_check,
        routes::chat::chat,
        routes::chat::list_topics,
        routes::chat::list_subjects,
        routes::chat::get_subject_topics,
        routes::chat::explain_topic,
        routes::weather::get_current_weather,
        routes::weather::get_forecast,
        routes::weather::get_climate_data,
        routes::weather::get_air_quality,
        routes::weather::search_cities,
        routes::dashboard::get_dashboard_data,
        routes::dashboard::search_cities,
        routes::dashboard::get_chart_data,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::chat::TopicsResponse,
            routes::chat::SubjectsResponse,
            routes::chat::SubjectTopicsResponse,
            routes::weather::AirQualityResponse,
            routes::weather::CitySearchResponse,
            services::catalog::SubjectInfo,
            services::air_quality::AqiCategory,
            models::ChatTurn,
            models::ChatReply,
            models::Explanation,
            models::WeatherSnapshot,
            models::Coordinates,
            models::ForecastEntry,
            models::Forecast,
            models::AirQualitySnapshot,
            models::CityRef,
            models::TemperatureSeries,
            models::PollutantBreakdown,
            models::ConditionHistogram,
            models::ChartSeries,
            models::ClimateTrends,
            models::ChartData,
            models::SummaryStats,
            models::DashboardBundle,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climate_tutor_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let weather = OpenWeatherClient::new(
        &config.openweather_base_url,
        &config.weather_api_key,
        timeout,
    )
    .expect("Failed to build OpenWeather client");

    let model: Option<Arc<dyn LanguageModel>> =
        match OpenAiCompatibleClient::from_config(&config.llm, timeout)
            .expect("Failed to build language model client")
        {
            Some(client) => {
                tracing::info!(
                    "Tutor using model '{}' at {}",
                    config.llm.model,
                    config.llm.base_url.as_deref().unwrap_or_default()
                );
                let client: Arc<dyn LanguageModel> = Arc::new(client);
                Some(client)
            }
            None => None,
        };

    let app_state = AppState {
        weather,
        tutor: Arc::new(TutorEngine::new(model, ModelSettings::from(&config.llm))),
        dashboard: DashboardOptions {
            distribution_follows_days: config.distribution_follows_days,
        },
    };

    // CORS: open to any origin for the browser frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
