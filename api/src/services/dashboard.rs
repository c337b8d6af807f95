//! Dashboard aggregation.
//!
//! Current weather and forecast are core content: if either fetch fails the
//! bundle fails. Air quality and chart series are supplementary and degrade to
//! synthetic data (flagged `mock`) instead.
//!
//! Fetch order: current weather first (air quality needs its coordinates),
//! then air quality and the full forecast window concurrently. Chart series are
//! derived from those results rather than fetched again.

use chrono::Utc;
use futures::future;

use crate::errors::ProviderError;
use crate::helpers::with_unit;
use crate::models::{
    AirQualitySnapshot, ChartData, ChartSeries, ConditionHistogram, DashboardBundle, Forecast,
    SummaryStats, TemperatureSeries, WeatherSnapshot,
};
use crate::services::air_quality;
use crate::services::openweather::{slots_for_days, OpenWeatherClient};
use crate::services::synthetic;

/// Window used for the weather-condition histogram unless configured to
/// follow the caller's `days`.
pub const DISTRIBUTION_WINDOW_DAYS: u32 = 30;

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("dashboard needs current weather: {0}")]
    CurrentWeather(ProviderError),

    #[error("dashboard needs a forecast: {0}")]
    Forecast(ProviderError),
}

impl AggregationError {
    pub fn into_provider_error(self) -> ProviderError {
        match self {
            AggregationError::CurrentWeather(e) | AggregationError::Forecast(e) => e,
        }
    }
}

/// Aggregation knobs that come from config.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardOptions {
    /// Use `days` for the histogram window instead of `DISTRIBUTION_WINDOW_DAYS`.
    pub distribution_follows_days: bool,
}

impl DashboardOptions {
    pub fn distribution_window(&self, days: u32) -> u32 {
        if self.distribution_follows_days {
            days
        } else {
            DISTRIBUTION_WINDOW_DAYS
        }
    }
}

/// Which chart series a chart-data request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Temperature,
    AirQuality,
    WeatherDistribution,
}

impl std::str::FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(ChartKind::Temperature),
            "air_quality" => Ok(ChartKind::AirQuality),
            "weather_distribution" => Ok(ChartKind::WeatherDistribution),
            other => Err(format!("Unknown chart type: {}", other)),
        }
    }
}

/// Whether a `data_type` value asks for chart series.
pub fn includes_charts(data_type: &str) -> bool {
    matches!(data_type, "all" | "charts")
}

// ---------------------------------------------------------------------------
// Pure derivations
// ---------------------------------------------------------------------------

/// Temperature and humidity over the first `days * 8` slots.
pub fn temperature_series(city: &str, forecast: &Forecast, days: u32) -> TemperatureSeries {
    let slots = forecast.entries.iter().take(slots_for_days(days));
    let mut series = TemperatureSeries {
        city: city.to_string(),
        dates: Vec::new(),
        temperatures: Vec::new(),
        humidity: Vec::new(),
        mock: false,
    };
    for entry in slots {
        series.dates.push(entry.datetime.clone());
        series.temperatures.push(entry.temperature);
        series.humidity.push(entry.humidity);
    }
    series
}

/// Count condition groups over the first `window_days * 8` slots, in order of
/// first appearance.
pub fn condition_histogram(city: &str, forecast: &Forecast, window_days: u32) -> ConditionHistogram {
    let mut conditions: Vec<String> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();

    for entry in forecast.entries.iter().take(slots_for_days(window_days)) {
        match conditions.iter().position(|c| *c == entry.condition) {
            Some(i) => counts[i] += 1,
            None => {
                conditions.push(entry.condition.clone());
                counts.push(1);
            }
        }
    }

    ConditionHistogram {
        city: city.to_string(),
        conditions,
        counts,
        mock: false,
    }
}

/// Headline numbers. `avg_temperature` is the current temperature.
pub fn summary_stats(current: &WeatherSnapshot, air: &AirQualitySnapshot) -> SummaryStats {
    SummaryStats {
        avg_temperature: with_unit(current.temperature, "°C"),
        humidity: with_unit(current.humidity, "%"),
        air_quality: air.category.to_string(),
        wind_speed: with_unit(current.wind_speed, "m/s"),
        pressure: with_unit(current.pressure, "hPa"),
        visibility: format!("{:.1} km", current.visibility),
    }
}

// ---------------------------------------------------------------------------
// Soft-failing fetches
// ---------------------------------------------------------------------------

fn or_synthetic_air_quality(
    city: &str,
    result: Result<AirQualitySnapshot, ProviderError>,
) -> AirQualitySnapshot {
    result.unwrap_or_else(|e| {
        tracing::warn!("Air quality for '{}' unavailable, using synthetic reading: {}", city, e);
        synthetic::air_quality()
    })
}

/// Air quality for a city, synthetic when the provider cannot answer.
pub async fn air_quality_or_synthetic(gateway: &OpenWeatherClient, city: &str) -> AirQualitySnapshot {
    or_synthetic_air_quality(city, gateway.get_air_quality(city).await)
}

/// A single chart series, fetched on its own. Never fails.
pub async fn chart_series(
    gateway: &OpenWeatherClient,
    kind: ChartKind,
    city: &str,
    days: u32,
    options: DashboardOptions,
) -> ChartSeries {
    match kind {
        ChartKind::Temperature => ChartSeries::Temperature(
            match gateway.get_forecast_window(city).await {
                Ok(forecast) => temperature_series(city, &forecast, days),
                Err(e) => {
                    tracing::warn!("Temperature chart for '{}' using synthetic data: {}", city, e);
                    synthetic::temperature_series(city)
                }
            },
        ),
        ChartKind::AirQuality => {
            let air = air_quality_or_synthetic(gateway, city).await;
            ChartSeries::AirQuality(air_quality::pollutant_breakdown(city, &air))
        }
        ChartKind::WeatherDistribution => ChartSeries::WeatherDistribution(
            match gateway.get_forecast_window(city).await {
                Ok(forecast) => {
                    condition_histogram(city, &forecast, options.distribution_window(days))
                }
                Err(e) => {
                    tracing::warn!("Distribution chart for '{}' using synthetic data: {}", city, e);
                    synthetic::condition_histogram(city)
                }
            },
        ),
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Build the full dashboard bundle for `city`.
pub async fn build_bundle(
    gateway: &OpenWeatherClient,
    city: &str,
    days: u32,
    data_type: &str,
    options: DashboardOptions,
) -> Result<DashboardBundle, AggregationError> {
    let started = Utc::now();

    let current = gateway
        .get_current(city, None)
        .await
        .map_err(AggregationError::CurrentWeather)?;

    let (air_result, forecast_result) = future::join(
        gateway.get_air_quality_at(&current.city, current.coordinates),
        gateway.get_forecast_window(city),
    )
    .await;

    let air = or_synthetic_air_quality(city, air_result);
    let window = forecast_result.map_err(AggregationError::Forecast)?;

    let chart_data = if includes_charts(data_type) {
        ChartData {
            temperature: Some(temperature_series(city, &window, days)),
            air_quality: Some(air_quality::pollutant_breakdown(city, &air)),
            weather_distribution: Some(condition_histogram(
                city,
                &window,
                options.distribution_window(days),
            )),
        }
    } else {
        ChartData::default()
    };

    let summary = summary_stats(&current, &air);
    let forecast = window
        .entries
        .into_iter()
        .take(slots_for_days(days))
        .collect();

    tracing::debug!(
        "Built dashboard bundle for '{}' in {} ms (air quality mock: {})",
        city,
        (Utc::now() - started).num_milliseconds(),
        air.mock
    );

    Ok(DashboardBundle {
        city: city.to_string(),
        current_weather: current,
        summary_stats: summary,
        chart_data,
        air_quality: air,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::openweather::tests::{current_json, forecast_json, pollution_json};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, status: u16, body: Option<serde_json::Value>) {
        let mut template = ResponseTemplate::new(status);
        if let Some(body) = body {
            template = template.set_body_json(body);
        }
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(&server.uri(), "test-key", Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_bundle_with_all_providers_up() {
        let server = MockServer::start().await;
        mount(&server, "/data/2.5/weather", 200, Some(current_json("London", 14.2))).await;
        mount(&server, "/data/2.5/forecast", 200, Some(forecast_json("London", 40))).await;
        mount(&server, "/data/2.5/air_pollution", 200, Some(pollution_json(2, 12000.0))).await;

        let bundle = build_bundle(
            &client_for(&server),
            "London",
            2,
            "all",
            DashboardOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(bundle.city, "London");
        assert_eq!(bundle.forecast.len(), 16);
        assert!(!bundle.air_quality.mock);
        assert_eq!(bundle.summary_stats.avg_temperature, "14.2°C");
        assert_eq!(bundle.summary_stats.visibility, "8.5 km");
        assert_eq!(bundle.summary_stats.air_quality, "Good");

        let charts = bundle.chart_data;
        let temperature = charts.temperature.unwrap();
        assert_eq!(temperature.temperatures.len(), 16);
        assert!(!temperature.mock);

        let pollutants = charts.air_quality.unwrap();
        assert_eq!(pollutants.pollutants[5], "CO");
        assert_eq!(pollutants.values[5], 12.0);

        // Fixed 30-day window covers all 40 provider slots.
        let histogram = charts.weather_distribution.unwrap();
        assert_eq!(histogram.counts.iter().sum::<u32>(), 40);
        assert_eq!(histogram.conditions, vec!["Clouds", "Rain"]);
    }

    #[tokio::test]
    async fn test_bundle_fails_when_current_weather_fails() {
        let server = MockServer::start().await;
        mount(&server, "/data/2.5/weather", 404, None).await;
        mount(&server, "/data/2.5/forecast", 200, Some(forecast_json("Atlantis", 40))).await;
        mount(&server, "/data/2.5/air_pollution", 200, Some(pollution_json(2, 300.0))).await;

        let err = build_bundle(
            &client_for(&server),
            "Atlantis",
            7,
            "all",
            DashboardOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AggregationError::CurrentWeather(_)));
    }

    #[tokio::test]
    async fn test_bundle_fails_when_forecast_fails() {
        let server = MockServer::start().await;
        mount(&server, "/data/2.5/weather", 200, Some(current_json("London", 10.0))).await;
        mount(&server, "/data/2.5/forecast", 502, None).await;
        mount(&server, "/data/2.5/air_pollution", 200, Some(pollution_json(2, 300.0))).await;

        let err = build_bundle(
            &client_for(&server),
            "London",
            7,
            "all",
            DashboardOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AggregationError::Forecast(_)));
    }

    #[tokio::test]
    async fn test_bundle_survives_air_quality_outage() {
        let server = MockServer::start().await;
        mount(&server, "/data/2.5/weather", 200, Some(current_json("London", 10.0))).await;
        mount(&server, "/data/2.5/forecast", 200, Some(forecast_json("London", 40))).await;
        mount(&server, "/data/2.5/air_pollution", 503, None).await;

        let bundle = build_bundle(
            &client_for(&server),
            "London",
            7,
            "all",
            DashboardOptions::default(),
        )
        .await
        .unwrap();

        let air = &bundle.air_quality;
        assert!(air.mock);
        assert!(air.aqi <= 500);
        assert_eq!(air.category, crate::services::air_quality::AqiCategory::from_aqi(air.aqi));
        for key in ["pm2_5", "pm10", "no2", "o3", "so2", "co"] {
            assert!(air.components.contains_key(key), "missing {}", key);
        }
        assert!(bundle.chart_data.air_quality.unwrap().mock);
        assert_eq!(bundle.forecast.len(), 40);
    }

    #[tokio::test]
    async fn test_bundle_without_charts() {
        let server = MockServer::start().await;
        mount(&server, "/data/2.5/weather", 200, Some(current_json("London", 10.0))).await;
        mount(&server, "/data/2.5/forecast", 200, Some(forecast_json("London", 40))).await;
        mount(&server, "/data/2.5/air_pollution", 200, Some(pollution_json(1, 300.0))).await;

        let bundle = build_bundle(
            &client_for(&server),
            "London",
            1,
            "summary",
            DashboardOptions::default(),
        )
        .await
        .unwrap();

        assert!(bundle.chart_data.temperature.is_none());
        assert!(bundle.chart_data.air_quality.is_none());
        assert!(bundle.chart_data.weather_distribution.is_none());
        assert_eq!(bundle.forecast.len(), 8);
    }

    #[tokio::test]
    async fn test_distribution_window_fixed_vs_following_days() {
        let server = MockServer::start().await;
        mount(&server, "/data/2.5/weather", 200, Some(current_json("London", 10.0))).await;
        mount(&server, "/data/2.5/forecast", 200, Some(forecast_json("London", 40))).await;
        mount(&server, "/data/2.5/air_pollution", 200, Some(pollution_json(1, 300.0))).await;
        let client = client_for(&server);

        let fixed = build_bundle(&client, "London", 1, "charts", DashboardOptions::default())
            .await
            .unwrap();
        let fixed_total: u32 = fixed.chart_data.weather_distribution.unwrap().counts.iter().sum();
        assert_eq!(fixed_total, 40);

        let following = build_bundle(
            &client,
            "London",
            1,
            "charts",
            DashboardOptions {
                distribution_follows_days: true,
            },
        )
        .await
        .unwrap();
        let following_total: u32 = following
            .chart_data
            .weather_distribution
            .unwrap()
            .counts
            .iter()
            .sum();
        assert_eq!(following_total, 8);
    }

    #[tokio::test]
    async fn test_chart_series_falls_back_per_series() {
        let server = MockServer::start().await;
        mount(&server, "/data/2.5/forecast", 500, None).await;
        mount(&server, "/data/2.5/weather", 500, None).await;
        let client = client_for(&server);
        let options = DashboardOptions::default();

        match chart_series(&client, ChartKind::Temperature, "Lima", 7, options).await {
            ChartSeries::Temperature(series) => {
                assert!(series.mock);
                assert_eq!(series.dates.len(), 7);
            }
            other => panic!("unexpected series {:?}", other),
        }
        match chart_series(&client, ChartKind::AirQuality, "Lima", 7, options).await {
            ChartSeries::AirQuality(series) => {
                assert!(series.mock);
                assert_eq!(series.values.len(), 6);
            }
            other => panic!("unexpected series {:?}", other),
        }
        match chart_series(&client, ChartKind::WeatherDistribution, "Lima", 7, options).await {
            ChartSeries::WeatherDistribution(series) => assert!(series.mock),
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn test_summary_stats_uses_current_temperature() {
        let current = WeatherSnapshot {
            city: "Oslo".to_string(),
            country: "NO".to_string(),
            description: "Snow".to_string(),
            condition: "Snow".to_string(),
            icon: "13d".to_string(),
            temperature: -3.5,
            feels_like: -8.0,
            humidity: 90.0,
            wind_speed: 5.2,
            wind_direction: 10.0,
            pressure: 1001.0,
            visibility: 2.0,
            uv_index: None,
            coordinates: crate::models::Coordinates { lat: 59.9, lon: 10.7 },
        };
        let air = air_quality::snapshot(120, Default::default(), false);

        let stats = summary_stats(&current, &air);
        assert_eq!(stats.avg_temperature, "-3.5°C");
        assert_eq!(stats.humidity, "90%");
        assert_eq!(stats.air_quality, "Unhealthy for Sensitive Groups");
        assert_eq!(stats.wind_speed, "5.2 m/s");
        assert_eq!(stats.pressure, "1001 hPa");
        assert_eq!(stats.visibility, "2.0 km");
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("temperature".parse::<ChartKind>(), Ok(ChartKind::Temperature));
        assert_eq!(
            "weather_distribution".parse::<ChartKind>(),
            Ok(ChartKind::WeatherDistribution)
        );
        assert!("radar".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_includes_charts() {
        assert!(includes_charts("all"));
        assert!(includes_charts("charts"));
        assert!(!includes_charts("summary"));
    }
}
