use std::{env, str::FromStr, time::Duration};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_PLAYBACK_INTERVAL_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendShape {
    /// `/api/dates` plus one GeoJSON FeatureCollection per date.
    #[default]
    GeoJson,
    /// A single `/data` array of flat point records.
    PointRecords,
}

impl FromStr for BackendShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "geojson" | "polygons" => Ok(BackendShape::GeoJson),
            "points" | "records" => Ok(BackendShape::PointRecords),
            other => Err(format!("unknown backend shape {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub port: u16,
    pub backend_url: String,
    pub backend_shape: BackendShape,
    pub playback_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_shape: BackendShape::default(),
            playback_interval: Duration::from_millis(DEFAULT_PLAYBACK_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let backend_url = lookup("BACKEND_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.backend_url);

        let playback_ms = parse_or(&lookup, "PLAYBACK_INTERVAL_MS", DEFAULT_PLAYBACK_INTERVAL_MS);
        let timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            backend_url,
            backend_shape: parse_or(&lookup, "BACKEND_SHAPE", defaults.backend_shape),
            playback_interval: Duration::from_millis(playback_ms.max(1)),
            request_timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(err) => {
                warn!("ignoring invalid {key}={raw:?}: {err}");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn config_defaults_when_unset() {
        let config = ViewerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
        assert_eq!(config.backend_shape, BackendShape::GeoJson);
        assert_eq!(config.playback_interval, Duration::from_millis(1000));
    }

    #[test]
    fn config_reads_overrides_and_ignores_garbage() {
        let config = ViewerConfig::from_lookup(lookup_from(&[
            ("PORT", "9191"),
            ("BACKEND_URL", "http://backend:8000/"),
            ("BACKEND_SHAPE", "points"),
            ("PLAYBACK_INTERVAL_MS", "soon"),
        ]));
        assert_eq!(config.port, 9191);
        assert_eq!(config.backend_url, "http://backend:8000");
        assert_eq!(config.backend_shape, BackendShape::PointRecords);
        assert_eq!(config.playback_interval, Duration::from_millis(1000));
    }
}
