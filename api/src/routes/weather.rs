//! Weather HTTP endpoints.
//!
//! - GET /api/weather/current/:city?country_code=XX
//! - GET /api/weather/forecast/:city?days=N
//! - GET /api/weather/climate-data/:city
//! - GET /api/weather/air-quality/:city
//! - GET /api/weather/cities/search?query=&limit=N

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::clean_city_name;
use crate::models::{AirQualitySnapshot, CityRef, ClimateTrends, Forecast, WeatherSnapshot};
use crate::services::openweather::curated_cities_matching;
use crate::services::{dashboard, synthetic};

/// Shortest accepted city name after cleaning.
const MIN_CITY_NAME_LEN: usize = 2;

/// Default forecast length for the weather endpoints.
const DEFAULT_FORECAST_DAYS: u32 = 5;

/// Default number of city search results.
const DEFAULT_SEARCH_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
pub struct CurrentWeatherQuery {
    /// ISO 3166 country code used to disambiguate the city (e.g. "US")
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ForecastQuery {
    /// Number of days to cover (8 three-hour slots per day)
    #[serde(default = "default_forecast_days")]
    pub days: u32,
}

fn default_forecast_days() -> u32 {
    DEFAULT_FORECAST_DAYS
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CitySearchQuery {
    /// Case-insensitive substring of the city name
    #[serde(default)]
    pub query: String,
    /// Maximum number of results
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct AirQualityResponse {
    pub city: String,
    #[serde(flatten)]
    pub reading: AirQualitySnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CitySearchResponse {
    pub cities: Vec<CityRef>,
}

/// Clean a path city name, rejecting anything too short to look up.
pub(crate) fn validated_city(raw: &str) -> Result<String, AppError> {
    let city = clean_city_name(raw);
    if city.chars().count() < MIN_CITY_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "City name must be at least {} characters",
            MIN_CITY_NAME_LEN
        )));
    }
    Ok(city)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Current conditions for a city.
#[utoipa::path(
    get,
    path = "/api/weather/current/{city}",
    tag = "Weather",
    params(
        ("city" = String, Path, description = "City name"),
        CurrentWeatherQuery,
    ),
    responses(
        (status = 200, description = "Current weather", body = WeatherSnapshot),
        (status = 400, description = "City name too short, unknown city or provider unreachable", body = ErrorResponse),
        (status = 500, description = "Unexpected provider payload", body = ErrorResponse),
    )
)]
pub async fn get_current_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(params): Query<CurrentWeatherQuery>,
) -> Result<Json<WeatherSnapshot>, AppError> {
    let city = validated_city(&city)?;
    let snapshot = state
        .weather
        .get_current(&city, params.country_code.as_deref())
        .await?;
    Ok(Json(snapshot))
}

/// 3-hourly forecast for the next `days` days (the provider covers at most 5).
///
/// No minimum name length here; the provider decides whether the city exists.
#[utoipa::path(
    get,
    path = "/api/weather/forecast/{city}",
    tag = "Weather",
    params(
        ("city" = String, Path, description = "City name"),
        ForecastQuery,
    ),
    responses(
        (status = 200, description = "Forecast slots in provider order", body = Forecast),
        (status = 400, description = "Unknown city or provider unreachable", body = ErrorResponse),
        (status = 500, description = "Unexpected provider payload", body = ErrorResponse),
    )
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<Forecast>, AppError> {
    let city = clean_city_name(&city);
    Ok(Json(state.weather.get_forecast(&city, params.days).await?))
}

/// 30-point climate trend series.
///
/// Synthetic stand-in until a historical climate source is wired in.
#[utoipa::path(
    get,
    path = "/api/weather/climate-data/{city}",
    tag = "Weather",
    params(("city" = String, Path, description = "City name")),
    responses((status = 200, description = "Synthetic trend series", body = ClimateTrends))
)]
pub async fn get_climate_data(Path(city): Path<String>) -> Json<ClimateTrends> {
    Json(synthetic::climate_trends(&clean_city_name(&city)))
}

/// Air quality for a city. Synthetic (flagged `mock`) when the provider cannot answer.
#[utoipa::path(
    get,
    path = "/api/weather/air-quality/{city}",
    tag = "Weather",
    params(("city" = String, Path, description = "City name")),
    responses((status = 200, description = "Air-quality reading", body = AirQualityResponse))
)]
pub async fn get_air_quality(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Json<AirQualityResponse> {
    let city = clean_city_name(&city);
    let reading = dashboard::air_quality_or_synthetic(&state.weather, &city).await;
    Json(AirQualityResponse { city, reading })
}

/// Filter the curated city list. Never calls the provider.
#[utoipa::path(
    get,
    path = "/api/weather/cities/search",
    tag = "Weather",
    params(CitySearchQuery),
    responses((status = 200, description = "Matching cities", body = CitySearchResponse))
)]
pub async fn search_cities(Query(params): Query<CitySearchQuery>) -> Json<CitySearchResponse> {
    Json(CitySearchResponse {
        cities: curated_cities_matching(&clean_city_name(&params.query), params.limit),
    })
}
