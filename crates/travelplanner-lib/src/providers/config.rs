use std::env;
use std::time::Duration;

/// Default bound on each outbound provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Region appended to free-text geocoding queries.
pub const DEFAULT_GEOCODE_REGION: &str = "Dehradun, India";

const DEFAULT_ORS_BASE_URL: &str = "https://api.openrouteservice.org";
const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Connection settings for the external providers.
///
/// API keys are only ever read from the environment. A provider without a
/// key (or, for the geocoder, with an empty base URL) is left disabled.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub ors_api_key: Option<String>,
    pub ors_base_url: String,
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub nominatim_base_url: Option<String>,
    pub geocode_region: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ors_api_key: None,
            ors_base_url: DEFAULT_ORS_BASE_URL.to_string(),
            openweather_api_key: None,
            openweather_base_url: DEFAULT_OPENWEATHER_BASE_URL.to_string(),
            nominatim_base_url: Some(DEFAULT_NOMINATIM_BASE_URL.to_string()),
            geocode_region: DEFAULT_GEOCODE_REGION.to_string(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            user_agent: concat!("travelplanner/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ProviderConfig {
    /// Load from environment variables.
    ///
    /// - `ORS_API_KEY`, `ORS_BASE_URL`
    /// - `OPENWEATHER_API_KEY`, `OPENWEATHER_BASE_URL`
    /// - `NOMINATIM_BASE_URL` (empty string disables geocoding)
    /// - `GEOCODE_REGION`
    /// - `PROVIDER_TIMEOUT_SECS` (positive integer, default 5)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = match lookup("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "invalid PROVIDER_TIMEOUT_SECS, using default"
                    );
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        let nominatim_base_url = match lookup("NOMINATIM_BASE_URL") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(trim_base_url(&raw)),
            None => defaults.nominatim_base_url,
        };

        Self {
            ors_api_key: non_empty("ORS_API_KEY"),
            ors_base_url: non_empty("ORS_BASE_URL")
                .map(|url| trim_base_url(&url))
                .unwrap_or(defaults.ors_base_url),
            openweather_api_key: non_empty("OPENWEATHER_API_KEY"),
            openweather_base_url: non_empty("OPENWEATHER_BASE_URL")
                .map(|url| trim_base_url(&url))
                .unwrap_or(defaults.openweather_base_url),
            nominatim_base_url,
            geocode_region: non_empty("GEOCODE_REGION").unwrap_or(defaults.geocode_region),
            timeout,
            user_agent: defaults.user_agent,
        }
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
