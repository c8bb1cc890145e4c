use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Access credential shared by the geocoding and directions APIs
    pub access_token: String,
    /// Base URL of the hosted mapping API
    pub api_base: String,
    /// One-shot IP geolocation endpoint
    pub locate_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if the access token is missing.
    pub fn from_env() -> Self {
        Self {
            access_token: required_env("MAPBOX_ACCESS_TOKEN"),
            api_base: env::var("MAPBOX_API_BASE")
                .unwrap_or_else(|_| "https://api.mapbox.com".to_string()),
            locate_url: env::var("LOCATE_URL")
                .unwrap_or_else(|_| "https://ipinfo.io/json".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
