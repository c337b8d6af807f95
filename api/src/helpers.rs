//! Shared helpers for number rounding and display formatting.
//!
//! Provider values arrive as f64 with arbitrary precision. Everything that
//! leaves the service is rounded to one decimal place through `Decimal` so that
//! midpoints round the same way on every platform.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Round an f64 to 1 decimal place, half away from zero.
///
/// Returns 0.0 for non-finite inputs (NaN, ±Inf).
pub(crate) fn round_1dp(v: f64) -> f64 {
    if !v.is_finite() {
        tracing::warn!("round_1dp received non-finite value {}, defaulting to 0", v);
        return 0.0;
    }
    Decimal::from_f64(v)
        .map(|d| d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

/// Capitalise the first letter of every whitespace-separated word
/// ("light rain" → "Light Rain").
pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim a user-supplied city name and strip surrounding quote characters.
pub(crate) fn clean_city_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Format a value with its unit for display, e.g. `with_unit(12.5, "°C")` → "12.5°C".
pub(crate) fn with_unit(value: f64, unit: &str) -> String {
    if unit.starts_with(char::is_alphabetic) {
        format!("{} {}", value, unit)
    } else {
        format!("{}{}", value, unit)
    }
}
