//! AQI banding and pollutant chart shaping.

use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::{AirQualitySnapshot, PollutantBreakdown};

/// Severity bands, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub enum AqiCategory {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthySensitive,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl AqiCategory {
    /// Band upper bounds are inclusive: ≤50, ≤100, ≤150, ≤200, ≤300, >300.
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthySensitive,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn health_impact(&self) -> &'static str {
        match self {
            AqiCategory::Good => {
                "Air quality is satisfactory, and air pollution poses little or no risk."
            }
            AqiCategory::Moderate => {
                "Air quality is acceptable. However, there may be a risk for some people, \
                 particularly those who are unusually sensitive to air pollution."
            }
            AqiCategory::UnhealthySensitive => {
                "Members of sensitive groups may experience health effects. \
                 The general public is less likely to be affected."
            }
            AqiCategory::Unhealthy => {
                "Some members of the general public may experience health effects; \
                 members of sensitive groups may experience more serious health effects."
            }
            AqiCategory::VeryUnhealthy => {
                "Health alert: The risk of health effects is increased for everyone."
            }
            AqiCategory::Hazardous => {
                "Health warning of emergency conditions: everyone is more likely to be affected."
            }
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Build a snapshot with category and health impact derived from `aqi`.
pub fn snapshot(aqi: u32, components: BTreeMap<String, f64>, mock: bool) -> AirQualitySnapshot {
    let category = AqiCategory::from_aqi(aqi);
    AirQualitySnapshot {
        aqi,
        category,
        health_impact: category.health_impact().to_string(),
        components,
        mock,
    }
}

/// Chart labels paired with the component keys they are read from.
const CHART_POLLUTANTS: [(&str, &str); 6] = [
    ("PM2.5", "pm2_5"),
    ("PM10", "pm10"),
    ("NO2", "no2"),
    ("O3", "o3"),
    ("SO2", "so2"),
    ("CO", "co"),
];

/// Pollutant breakdown in fixed chart order. Missing components chart as 0.
/// CO is already in mg/m³ at this point.
pub fn pollutant_breakdown(city: &str, snapshot: &AirQualitySnapshot) -> PollutantBreakdown {
    let (pollutants, values) = CHART_POLLUTANTS
        .iter()
        .map(|(label, key)| {
            (
                label.to_string(),
                snapshot.components.get(*key).copied().unwrap_or(0.0),
            )
        })
        .unzip();

    PollutantBreakdown {
        city: city.to_string(),
        pollutants,
        values,
        mock: snapshot.mock,
    }
}
