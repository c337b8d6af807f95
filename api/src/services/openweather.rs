//! OpenWeather client (current weather, 5-day/3-hour forecast, air pollution,
//! direct geocoding).
//!
//! See: https://openweathermap.org/api
//!
//! Provider JSON is deserialized into private `Ow*` structs and converted to
//! the unit-normalised types in `crate::models` before it leaves this module.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::helpers::{clean_city_name, round_1dp, title_case};
use crate::models::{AirQualitySnapshot, CityRef, Coordinates, Forecast, ForecastEntry, WeatherSnapshot};
use crate::services::air_quality;

/// Forecast slots per day (3-hour intervals).
pub const SLOTS_PER_DAY: usize = 8;

/// Maximum number of geocoding results requested from the provider.
const GEOCODE_MAX_LIMIT: usize = 5;

/// Well-known cities served when the search box is empty or the provider
/// cannot answer.
const CURATED_CITIES: [(&str, &str, &str, f64, f64); 10] = [
    ("London", "GB", "England", 51.5074, -0.1278),
    ("New York", "US", "NY", 40.7128, -74.0060),
    ("Tokyo", "JP", "Tokyo", 35.6762, 139.6503),
    ("Paris", "FR", "Île-de-France", 48.8566, 2.3522),
    ("Sydney", "AU", "NSW", -33.8688, 151.2093),
    ("Mumbai", "IN", "Maharashtra", 19.0760, 72.8777),
    ("São Paulo", "BR", "São Paulo", -23.5505, -46.6333),
    ("Cairo", "EG", "Cairo", 30.0444, 31.2357),
    ("Berlin", "DE", "Berlin", 52.5200, 13.4050),
    ("Beijing", "CN", "Beijing", 39.9042, 116.4074),
];

/// Client for the OpenWeather APIs.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

// --- OpenWeather JSON response types ---

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    main: String,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    sys: OwSys,
    weather: Vec<OwCondition>,
    main: OwMain,
    wind: OwWind,
    /// Metres
    visibility: Option<f64>,
    uvi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastSlot {
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwForecastCity,
    list: Vec<OwForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct OwPollutionMain {
    /// OpenWeather's own 1-5 index (1 = good, 5 = very poor). It is banded on
    /// the 0-500 table like every other reading, so live values always land in
    /// "Good".
    aqi: i64,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    main: OwPollutionMain,
    components: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct OwPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeocodeHit {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

/// First condition of a slot, or a neutral placeholder when the list is empty.
fn primary_condition(conditions: &[OwCondition]) -> (String, String, String) {
    conditions
        .first()
        .map(|c| (c.main.clone(), title_case(&c.description), c.icon.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string(), String::new()))
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let (condition, description, icon) = primary_condition(&self.weather);
        WeatherSnapshot {
            city: self.name,
            country: self.sys.country,
            description,
            condition,
            icon,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            wind_direction: self.wind.deg,
            pressure: self.main.pressure,
            visibility: round_1dp(self.visibility.unwrap_or(0.0) / 1000.0),
            uv_index: self.uvi,
            coordinates: Coordinates {
                lat: self.coord.lat,
                lon: self.coord.lon,
            },
        }
    }
}

impl OwForecastSlot {
    fn into_entry(self) -> ForecastEntry {
        let (condition, description, icon) = primary_condition(&self.weather);
        ForecastEntry {
            datetime: self.dt_txt,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            description,
            condition,
            icon,
            wind_speed: self.wind.speed,
            pressure: self.main.pressure,
        }
    }
}

/// Convert a pollution entry: components rounded to 1 dp, CO μg/m³ → mg/m³.
fn pollution_to_snapshot(entry: OwPollutionEntry) -> AirQualitySnapshot {
    let components = entry
        .components
        .into_iter()
        .map(|(name, value)| {
            let value = if name == "co" { value / 1000.0 } else { value };
            (name, round_1dp(value))
        })
        .collect();
    let aqi = u32::try_from(entry.main.aqi.max(0)).unwrap_or(0);
    air_quality::snapshot(aqi, components, false)
}

/// Curated cities whose name contains `query` (case-insensitive), truncated to `limit`.
pub fn curated_cities_matching(query: &str, limit: usize) -> Vec<CityRef> {
    let needle = query.trim().to_lowercase();
    CURATED_CITIES
        .iter()
        .filter(|(name, ..)| name.to_lowercase().contains(&needle))
        .take(limit)
        .map(|&(name, country, state, lat, lon)| CityRef {
            name: name.to_string(),
            country: country.to_string(),
            state: state.to_string(),
            lat,
            lon,
        })
        .collect()
}

impl OpenWeatherClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` with `query` plus the API key, decoding a 2xx JSON body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        subject: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(operation, subject, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("OpenWeather {} for '{}' returned HTTP {}", operation, subject, status);
            return Err(ProviderError::Rejected {
                operation,
                subject: subject.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(operation, subject, e))?;

        serde_json::from_slice(&body)
            .map_err(|e| ProviderError::malformed(operation, subject, e.to_string()))
    }

    /// Fetch current conditions. `country` narrows ambiguous names ("Paris,US").
    pub async fn get_current(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> Result<WeatherSnapshot, ProviderError> {
        let city = clean_city_name(city);
        let location = match country.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => format!("{},{}", city, code),
            None => city.clone(),
        };

        let parsed: OwCurrentResponse = self
            .get_json(
                "current weather",
                &city,
                "/data/2.5/weather",
                &[("q", location), ("units", "metric".to_string())],
            )
            .await?;

        Ok(parsed.into_snapshot())
    }

    /// Fetch every forecast slot the provider offers (5 days × 8 slots).
    pub async fn get_forecast_window(&self, city: &str) -> Result<Forecast, ProviderError> {
        let city = clean_city_name(city);
        let parsed: OwForecastResponse = self
            .get_json(
                "forecast",
                &city,
                "/data/2.5/forecast",
                &[("q", city.clone()), ("units", "metric".to_string())],
            )
            .await?;

        Ok(Forecast {
            city: parsed.city.name,
            country: parsed.city.country,
            entries: parsed.list.into_iter().map(OwForecastSlot::into_entry).collect(),
        })
    }

    /// Fetch the forecast sliced to `days * 8` three-hour slots.
    pub async fn get_forecast(&self, city: &str, days: u32) -> Result<Forecast, ProviderError> {
        let mut forecast = self.get_forecast_window(city).await?;
        forecast.entries.truncate(slots_for_days(days));
        Ok(forecast)
    }

    /// Air-quality reading at known coordinates. `city` is only used for error context.
    pub async fn get_air_quality_at(
        &self,
        city: &str,
        coordinates: Coordinates,
    ) -> Result<AirQualitySnapshot, ProviderError> {
        let parsed: OwPollutionResponse = self
            .get_json(
                "air quality",
                city,
                "/data/2.5/air_pollution",
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                ],
            )
            .await?;

        let entry = parsed
            .list
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed("air quality", city, "empty reading list"))?;

        Ok(pollution_to_snapshot(entry))
    }

    /// Air-quality reading for a city name, resolving coordinates through the
    /// current-weather endpoint first.
    pub async fn get_air_quality(&self, city: &str) -> Result<AirQualitySnapshot, ProviderError> {
        let current = self.get_current(city, None).await?;
        self.get_air_quality_at(&current.city, current.coordinates).await
    }

    /// Geocode `query` through the provider.
    pub async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<CityRef>, ProviderError> {
        let hits: Vec<OwGeocodeHit> = self
            .get_json(
                "geocode",
                query,
                "/geo/1.0/direct",
                &[
                    ("q", query.to_string()),
                    ("limit", limit.clamp(1, GEOCODE_MAX_LIMIT).to_string()),
                ],
            )
            .await?;

        Ok(hits
            .into_iter()
            .map(|h| CityRef {
                name: h.name,
                country: h.country,
                state: h.state.unwrap_or_default(),
                lat: h.lat,
                lon: h.lon,
            })
            .collect())
    }

    /// City search that always answers.
    ///
    /// An empty query returns the curated list without touching the network.
    /// Otherwise the provider is asked first; on failure or an empty result set
    /// the curated list is substring-filtered instead.
    pub async fn search_cities(&self, query: &str, limit: usize) -> Vec<CityRef> {
        let query = clean_city_name(query);
        if query.is_empty() {
            return curated_cities_matching("", limit);
        }

        match self.geocode(&query, limit).await {
            Ok(hits) if !hits.is_empty() => hits.into_iter().take(limit).collect(),
            Ok(_) => {
                tracing::debug!("Geocoding '{}' returned no hits, using curated list", query);
                curated_cities_matching(&query, limit)
            }
            Err(e) => {
                tracing::warn!("City search falling back to curated list: {}", e);
                curated_cities_matching(&query, limit)
            }
        }
    }
}

/// Number of 3-hour slots covering `days` days.
pub fn slots_for_days(days: u32) -> usize {
    (days as usize).saturating_mul(SLOTS_PER_DAY)
}
