use std::str::FromStr;

/// Default OpenWeather host. Overridable so tests can point at a mock server.
const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_LLM_MODEL: &str = "llama3.1:latest";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Settings for the language-model backend used by the tutor.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL (e.g. "http://localhost:11434/v1").
    /// `None` puts the tutor in fallback mode.
    pub base_url: Option<String>,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub chat_max_tokens: u32,
    pub explain_max_tokens: u32,
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub llm: LlmConfig,
    pub weather_api_key: String,
    pub openweather_base_url: String,
    /// Timeout applied to every outbound provider call.
    pub http_timeout_secs: u64,
    /// When set, the weather-condition histogram uses the caller's `days`
    /// instead of the fixed 30-day window.
    pub distribution_follows_days: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Lowercase `api_key` and `base_url` are the legacy .env names
        let weather_api_key = get("WEATHER_API_KEY")
            .or_else(|| get("api_key"))
            .unwrap_or_default();
        if weather_api_key.is_empty() {
            tracing::warn!("WEATHER_API_KEY is not set; provider calls will be rejected");
        }

        Ok(Self {
            port: parse_or("PORT", get("PORT"), 8000, "port number")?,
            llm: LlmConfig {
                base_url: get("LLM_BASE_URL")
                    .or_else(|| get("base_url"))
                    .map(|u| u.trim_end_matches('/').to_string()),
                api_key: get("LLM_API_KEY").unwrap_or_else(|| "ollama".to_string()),
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.7, "float")?,
                chat_max_tokens: parse_or(
                    "LLM_CHAT_MAX_TOKENS",
                    get("LLM_CHAT_MAX_TOKENS"),
                    500,
                    "positive integer",
                )?,
                explain_max_tokens: parse_or(
                    "LLM_EXPLAIN_MAX_TOKENS",
                    get("LLM_EXPLAIN_MAX_TOKENS"),
                    600,
                    "positive integer",
                )?,
            },
            weather_api_key,
            openweather_base_url: get("OPENWEATHER_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.to_string()),
            http_timeout_secs: parse_or(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                10,
                "number of seconds",
            )?,
            distribution_follows_days: parse_or(
                "DISTRIBUTION_FOLLOWS_DAYS",
                get("DISTRIBUTION_FOLLOWS_DAYS"),
                false,
                "boolean",
            )?,
        })
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.llm.base_url, None);
        assert_eq!(config.llm.model, "llama3.1:latest");
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.llm.chat_max_tokens, 500);
        assert_eq!(config.llm.explain_max_tokens, 600);
        assert_eq!(config.openweather_base_url, "https://api.openweathermap.org");
        assert_eq!(config.http_timeout_secs, 10);
        assert!(!config.distribution_follows_days);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9001"),
            ("LLM_BASE_URL", "http://localhost:11434/v1/"),
            ("LLM_TEMPERATURE", "0.2"),
            ("WEATHER_API_KEY", "secret"),
            ("DISTRIBUTION_FOLLOWS_DAYS", "true"),
        ])
        .unwrap();

        assert_eq!(config.port, 9001);
        assert_eq!(
            config.llm.base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.weather_api_key, "secret");
        assert!(config.distribution_follows_days);
    }

    #[test]
    fn test_legacy_env_names() {
        let config = config_from(&[
            ("base_url", "http://localhost:11434/v1/"),
            ("api_key", "legacy-weather-key"),
        ])
        .unwrap();

        assert_eq!(
            config.llm.base_url.as_deref(),
            Some("http://localhost:11434/v1")
        );
        assert_eq!(config.weather_api_key, "legacy-weather-key");
        assert_eq!(config.llm.api_key, "ollama");

        let config = config_from(&[
            ("LLM_BASE_URL", "http://llm.internal/v1"),
            ("base_url", "http://localhost:11434/v1"),
            ("WEATHER_API_KEY", "current"),
            ("api_key", "legacy"),
        ])
        .unwrap();
        assert_eq!(config.llm.base_url.as_deref(), Some("http://llm.internal/v1"));
        assert_eq!(config.weather_api_key, "current");
    }

    #[test]
    fn test_blank_value_treated_as_unset() {
        let config = config_from(&[("LLM_BASE_URL", "  ")]).unwrap();
        assert_eq!(config.llm.base_url, None);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = config_from(&[("HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("HTTP_TIMEOUT_SECS"));
    }
}
