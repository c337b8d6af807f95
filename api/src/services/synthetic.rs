//! Plausibly-ranged synthetic data.
//!
//! Used as a stand-in when a supplementary provider feed is unavailable, and
//! for the climate-trend endpoint which has no real data source. Every series
//! built here is flagged `mock`.

use chrono::{Duration, Utc};
use rand::Rng;
use std::collections::BTreeMap;

use crate::helpers::round_1dp;
use crate::models::{
    AirQualitySnapshot, ClimateTrends, ConditionHistogram, TemperatureSeries,
};
use crate::services::air_quality;

/// Number of points in a synthetic temperature series (one per day).
const SYNTHETIC_TEMPERATURE_POINTS: i64 = 7;

/// Number of points in each climate trend series.
pub const CLIMATE_TREND_POINTS: usize = 30;

const SYNTHETIC_CONDITIONS: [&str; 5] = ["Clear", "Clouds", "Rain", "Snow", "Thunderstorm"];

/// Component ranges. CO is in mg/m³, the rest in μg/m³.
const COMPONENT_RANGES: [(&str, f64, f64); 8] = [
    ("co", 0.2, 1.0),
    ("no", 0.0, 50.0),
    ("no2", 10.0, 60.0),
    ("o3", 50.0, 120.0),
    ("so2", 5.0, 30.0),
    ("pm2_5", 10.0, 50.0),
    ("pm10", 20.0, 80.0),
    ("nh3", 0.0, 20.0),
];

pub fn air_quality() -> AirQualitySnapshot {
    let mut rng = rand::thread_rng();
    let aqi = rng.gen_range(20..=150);
    let components: BTreeMap<String, f64> = COMPONENT_RANGES
        .iter()
        .map(|&(name, lo, hi)| (name.to_string(), round_1dp(rng.gen_range(lo..=hi))))
        .collect();
    air_quality::snapshot(aqi, components, true)
}

pub fn temperature_series(city: &str) -> TemperatureSeries {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let mut series = TemperatureSeries {
        city: city.to_string(),
        dates: Vec::new(),
        temperatures: Vec::new(),
        humidity: Vec::new(),
        mock: true,
    };
    for day in 0..SYNTHETIC_TEMPERATURE_POINTS {
        let date = now + Duration::days(day);
        series
            .dates
            .push(date.format("%Y-%m-%d %H:%M:%S").to_string());
        series
            .temperatures
            .push(round_1dp(rng.gen_range(15.0..=30.0)));
        series.humidity.push(round_1dp(rng.gen_range(40.0..=80.0)));
    }
    series
}

pub fn condition_histogram(city: &str) -> ConditionHistogram {
    let mut rng = rand::thread_rng();
    ConditionHistogram {
        city: city.to_string(),
        conditions: SYNTHETIC_CONDITIONS.iter().map(|c| c.to_string()).collect(),
        counts: SYNTHETIC_CONDITIONS
            .iter()
            .map(|_| rng.gen_range(5..=15))
            .collect(),
        mock: true,
    }
}

pub fn climate_trends(city: &str) -> ClimateTrends {
    let mut rng = rand::thread_rng();
    let mut trend = |base: f64, lo: f64, hi: f64| -> Vec<f64> {
        (0..CLIMATE_TREND_POINTS)
            .map(|_| round_1dp((base + rng.gen_range(lo..=hi)).max(0.0)))
            .collect()
    };

    ClimateTrends {
        city: city.to_string(),
        temperature_trend: trend(20.0, -5.0, 5.0),
        humidity_trend: trend(60.0, -10.0, 10.0),
        precipitation_trend: trend(2.0, -1.0, 3.0),
        air_quality_trend: trend(50.0, -20.0, 20.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_quality_in_range() {
        for _ in 0..50 {
            let snap = air_quality();
            assert!((20..=150).contains(&snap.aqi));
            assert!(snap.mock);
            assert_eq!(snap.components.len(), COMPONENT_RANGES.len());
            for (name, lo, hi) in COMPONENT_RANGES {
                let v = snap.components[name];
                assert!(v >= lo && v <= hi, "{} = {} outside [{}, {}]", name, v, lo, hi);
            }
            assert_eq!(
                snap.category,
                crate::services::air_quality::AqiCategory::from_aqi(snap.aqi)
            );
        }
    }

    #[test]
    fn test_temperature_series_shape() {
        let series = temperature_series("Lima");
        assert_eq!(series.dates.len(), 7);
        assert_eq!(series.temperatures.len(), 7);
        assert_eq!(series.humidity.len(), 7);
        assert!(series.mock);
        assert!(series.temperatures.iter().all(|t| (15.0..=30.0).contains(t)));
        assert!(series.humidity.iter().all(|h| (40.0..=80.0).contains(h)));
    }

    #[test]
    fn test_condition_histogram_shape() {
        let hist = condition_histogram("Oslo");
        assert_eq!(hist.conditions, SYNTHETIC_CONDITIONS);
        assert!(hist.counts.iter().all(|c| (5..=15).contains(c)));
        assert!(hist.mock);
    }

    #[test]
    fn test_climate_trends_non_negative_and_sized() {
        let trends = climate_trends("Cairo");
        for series in [
            &trends.temperature_trend,
            &trends.humidity_trend,
            &trends.precipitation_trend,
            &trends.air_quality_trend,
        ] {
            assert_eq!(series.len(), CLIMATE_TREND_POINTS);
            assert!(series.iter().all(|v| *v >= 0.0));
        }
        assert!(trends
            .temperature_trend
            .iter()
            .all(|t| (15.0..=25.0).contains(t)));
    }
}
