//! Domain types that cross the service boundary.
//!
//! Provider JSON never leaves `services::openweather`; everything here is
//! already unit-converted (°C, m/s, hPa, km, mg/m³ for CO).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::services::air_quality::AqiCategory;

fn is_false(v: &bool) -> bool {
    !*v
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Geographic coordinates (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions for a city, freshly fetched from the provider.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeatherSnapshot {
    /// City name as resolved by the provider
    pub city: String,
    /// ISO 3166 country code
    pub country: String,
    /// Title-cased description (e.g. "Light Rain")
    pub description: String,
    /// Condition group (e.g. "Rain", "Clouds")
    pub condition: String,
    /// Provider icon code (e.g. "10d")
    pub icon: String,
    /// Air temperature in °C
    pub temperature: f64,
    /// Feels-like temperature in °C
    pub feels_like: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees (0 = north)
    pub wind_direction: f64,
    /// Sea-level pressure in hPa
    pub pressure: f64,
    /// Visibility in km
    pub visibility: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    pub coordinates: Coordinates,
}

/// One 3-hour provider forecast slot.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastEntry {
    /// Slot time as reported by the provider ("YYYY-MM-DD HH:MM:SS", UTC)
    pub datetime: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub description: String,
    pub condition: String,
    pub icon: String,
    pub wind_speed: f64,
    pub pressure: f64,
}

/// Forecast slots for one city, in provider order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    #[serde(rename = "forecast")]
    pub entries: Vec<ForecastEntry>,
}

/// Air-quality reading. `category` and `health_impact` are derived from `aqi`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AirQualitySnapshot {
    pub aqi: u32,
    pub category: AqiCategory,
    pub health_impact: String,
    /// Pollutant name → concentration (μg/m³, CO in mg/m³)
    pub components: BTreeMap<String, f64>,
    /// Set when the provider was unavailable and the reading is synthetic
    #[serde(skip_serializing_if = "is_false")]
    pub mock: bool,
}

/// A city search hit.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CityRef {
    pub name: String,
    pub country: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
}

// ---------------------------------------------------------------------------
// Chart-ready series
// ---------------------------------------------------------------------------

/// Temperature / humidity time series.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemperatureSeries {
    pub city: String,
    pub dates: Vec<String>,
    pub temperatures: Vec<f64>,
    pub humidity: Vec<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub mock: bool,
}

/// Pollutant concentrations for a pie/bar chart.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PollutantBreakdown {
    pub city: String,
    pub pollutants: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub mock: bool,
}

/// Counts of provider condition groups over a forecast window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConditionHistogram {
    pub city: String,
    pub conditions: Vec<String>,
    pub counts: Vec<u32>,
    #[serde(skip_serializing_if = "is_false")]
    pub mock: bool,
}

/// Any single chart series, as returned by the chart-data endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ChartSeries {
    Temperature(TemperatureSeries),
    AirQuality(PollutantBreakdown),
    WeatherDistribution(ConditionHistogram),
}

/// Synthetic 30-day climate trends.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClimateTrends {
    pub city: String,
    pub temperature_trend: Vec<f64>,
    pub humidity_trend: Vec<f64>,
    pub precipitation_trend: Vec<f64>,
    pub air_quality_trend: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Chart series included in a bundle. Empty (`{}`) unless charts were requested.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ChartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TemperatureSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<PollutantBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_distribution: Option<ConditionHistogram>,
}

/// Display-ready headline numbers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SummaryStats {
    /// Current temperature. Not an average over the forecast window.
    pub avg_temperature: String,
    pub humidity: String,
    pub air_quality: String,
    pub wind_speed: String,
    pub pressure: String,
    pub visibility: String,
}

/// Everything the dashboard needs for one city.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardBundle {
    /// City as requested by the caller
    pub city: String,
    pub current_weather: WeatherSnapshot,
    pub summary_stats: SummaryStats,
    pub chart_data: ChartData,
    pub air_quality: AirQualitySnapshot,
    pub forecast: Vec<ForecastEntry>,
}

// ---------------------------------------------------------------------------
// Tutor
// ---------------------------------------------------------------------------

fn default_age_group() -> String {
    "general".to_string()
}

fn default_knowledge_level() -> String {
    "beginner".to_string()
}

fn default_language() -> String {
    "english".to_string()
}

fn default_subject() -> String {
    "climate_science".to_string()
}

/// One learner question plus personalisation fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub user_message: String,
    #[serde(default = "default_age_group")]
    pub age_group: String,
    #[serde(default = "default_knowledge_level")]
    pub knowledge_level: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[cfg(test)]
impl ChatTurn {
    /// A turn with every personalisation field at its default.
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            age_group: default_age_group(),
            knowledge_level: default_knowledge_level(),
            language: default_language(),
            subject: default_subject(),
            location: None,
        }
    }
}

/// Tutor answer with up to three follow-up topics.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatReply {
    pub reply: String,
    pub suggested_topics: Vec<String>,
}

/// Explanation of a single topic.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Explanation {
    pub topic: String,
    pub explanation: String,
    pub related_topics: Vec<String>,
}
