//! Dashboard HTTP endpoints.
//!
//! - GET /api/dashboard/data?city=&days=N&data_type=all|charts
//! - GET /api/dashboard/cities/search?query=&limit=N
//! - GET /api/dashboard/chart-data/:chart_type?city=&days=N

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use super::weather::{validated_city, CitySearchQuery, CitySearchResponse};
use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::clean_city_name;
use crate::models::{ChartSeries, DashboardBundle};
use crate::services::dashboard::{self, ChartKind};

/// Default day window for dashboard requests.
const DEFAULT_DASHBOARD_DAYS: u32 = 7;

fn default_days() -> u32 {
    DEFAULT_DASHBOARD_DAYS
}

fn default_data_type() -> String {
    "all".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// City name
    pub city: String,
    /// Days of forecast to include (8 slots per day)
    #[serde(default = "default_days")]
    pub days: u32,
    /// "all" or "charts" include chart series; anything else omits them
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChartQuery {
    /// City name
    pub city: String,
    #[serde(default = "default_days")]
    pub days: u32,
}

/// Full dashboard for a city.
///
/// Fails if current weather or the forecast cannot be fetched. Air quality and
/// chart series fall back to synthetic data flagged `mock`.
#[utoipa::path(
    get,
    path = "/api/dashboard/data",
    tag = "Dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard bundle", body = DashboardBundle),
        (status = 400, description = "Bad city name, unknown city or provider unreachable", body = ErrorResponse),
        (status = 500, description = "Unexpected provider payload", body = ErrorResponse),
    )
)]
pub async fn get_dashboard_data(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardBundle>, AppError> {
    let city = validated_city(&params.city)?;
    let bundle = dashboard::build_bundle(
        &state.weather,
        &city,
        params.days,
        &params.data_type,
        state.dashboard,
    )
    .await?;
    Ok(Json(bundle))
}

/// City search backed by provider geocoding, falling back to the curated list.
#[utoipa::path(
    get,
    path = "/api/dashboard/cities/search",
    tag = "Dashboard",
    params(CitySearchQuery),
    responses((status = 200, description = "Matching cities", body = CitySearchResponse))
)]
pub async fn search_cities(
    State(state): State<AppState>,
    Query(params): Query<CitySearchQuery>,
) -> Json<CitySearchResponse> {
    Json(CitySearchResponse {
        cities: state.weather.search_cities(&params.query, params.limit).await,
    })
}

/// One chart series. Falls back to synthetic data when the provider fails.
#[utoipa::path(
    get,
    path = "/api/dashboard/chart-data/{chart_type}",
    tag = "Dashboard",
    params(
        ("chart_type" = String, Path, description = "temperature, air_quality or weather_distribution"),
        ChartQuery,
    ),
    responses(
        (status = 200, description = "Chart series", body = ChartSeries),
        (status = 400, description = "Unknown chart type", body = ErrorResponse),
    )
)]
pub async fn get_chart_data(
    State(state): State<AppState>,
    Path(chart_type): Path<String>,
    Query(params): Query<ChartQuery>,
) -> Result<Json<ChartSeries>, AppError> {
    let kind: ChartKind = chart_type.parse().map_err(AppError::BadRequest)?;
    let city = clean_city_name(&params.city);
    Ok(Json(
        dashboard::chart_series(&state.weather, kind, &city, params.days, state.dashboard).await,
    ))
}
