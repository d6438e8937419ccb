use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{truncate_body, WeatherProvider};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::weather::WeatherSnapshot;

pub(super) const PROVIDER: &str = "openweathermap";

/// OpenWeatherMap current-conditions client (metric units).
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReadings,
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

impl OpenWeatherProvider {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn current(&self, at: GeoPoint) -> Result<WeatherSnapshot> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        debug!(?at, "requesting current weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::ProviderStatus {
                provider: PROVIDER,
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let parsed: CurrentWeather =
            serde_json::from_str(&text).map_err(|err| Error::MalformedPayload {
                provider: PROVIDER,
                message: err.to_string(),
            })?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedPayload {
                provider: PROVIDER,
                message: "response contains no weather conditions".to_string(),
            })?;

        Ok(WeatherSnapshot {
            temperature: parsed.main.temp.round() as i64,
            feels_like: parsed.main.feels_like.round() as i64,
            humidity: parsed.main.humidity.round() as i64,
            description: condition.description,
            wind_speed: parsed.wind.speed,
            icon: condition.icon,
        })
    }
}
