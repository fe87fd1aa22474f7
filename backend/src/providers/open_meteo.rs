use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::{WeatherError, WeatherProvider};
use crate::models::{GeoPoint, WeatherObservation};

pub const OPEN_METEO_DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1";

const HOURLY_FIELDS: &str =
    "temperature_2m,precipitation_probability,weather_code,cloud_cover,is_day";
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Hourly forecast client for Open-Meteo. No credential required.
pub struct OpenMeteoClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    hourly: Option<HourlyForecast>,
}

/// Column-oriented hourly values; any cell may be null.
#[derive(Debug, Default, Deserialize)]
struct HourlyForecast {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<u8>>,
    #[serde(default)]
    weather_code: Vec<Option<u16>>,
    #[serde(default)]
    cloud_cover: Vec<Option<u8>>,
    #[serde(default)]
    is_day: Vec<Option<u8>>,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new(OPEN_METEO_DEFAULT_BASE_URL)
    }
}

impl WeatherProvider for OpenMeteoClient {
    async fn forecast_at(
        &self,
        point: GeoPoint,
        hour: DateTime<Utc>,
    ) -> Result<Option<WeatherObservation>, WeatherError> {
        let url = format!("{}/forecast", self.base_url.trim_end_matches('/'));
        // Querying in GMT keeps the requested slot aligned with our UTC hour key.
        let slot = hour.format(HOUR_FORMAT).to_string();

        let response = self
            .client
            .get(url)
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lng.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("start_hour", slot.clone()),
                ("end_hour", slot),
                ("timezone", "GMT".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api { status, message });
        }

        let forecast: ForecastResponse = response.json().await?;
        first_observation(forecast)
    }
}

fn first_observation(
    forecast: ForecastResponse,
) -> Result<Option<WeatherObservation>, WeatherError> {
    let Some(hourly) = forecast.hourly else {
        return Ok(None);
    };
    let Some(raw_time) = hourly.time.first() else {
        return Ok(None);
    };

    let time = NaiveDateTime::parse_from_str(raw_time, HOUR_FORMAT)
        .map_err(|err| WeatherError::MalformedResponse(format!("time {raw_time:?}: {err}")))?
        .and_utc();

    let (Some(temperature_c), Some(weather_code)) = (
        first_value(&hourly.temperature_2m),
        first_value(&hourly.weather_code),
    ) else {
        return Ok(None);
    };

    Ok(Some(WeatherObservation {
        time,
        temperature_c,
        precipitation_prob_pct: first_value(&hourly.precipitation_probability).unwrap_or(0),
        weather_code,
        cloud_cover_pct: first_value(&hourly.cloud_cover).unwrap_or(0),
        is_day: first_value(&hourly.is_day).map_or(true, |flag| flag != 0),
    }))
}

fn first_value<T: Copy>(column: &[Option<T>]) -> Option<T> {
    column.first().copied().flatten()
}
