use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    Config,
    error::FetchError,
    forecast::reduce_to_daily,
    model::{
        AnimationMode, CurrentWeather, CurrentWeatherResult, ForecastResult, ForecastSample, Icon,
        LocationQuery, capitalize,
    },
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org";

const CURRENT_TIMEOUT: Duration = Duration::from_secs(10);
const FORECAST_TIMEOUT: Duration = Duration::from_secs(12);
const ICON_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    icon_base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(api_key.to_owned()).with_endpoints(&config.base_url, &config.icon_base_url))
    }

    /// Point the client at different data and icon hosts.
    pub fn with_endpoints(mut self, base_url: &str, icon_base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.icon_base_url = icon_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn icon_url(&self, icon_id: &str) -> String {
        format!("{}/img/wn/{}@2x.png", self.icon_base_url, icon_id)
    }

    async fn request(
        &self,
        endpoint: &str,
        query: &LocationQuery,
        timeout: Duration,
    ) -> Result<(StatusCode, String), FetchError> {
        let location = query.composite_location();
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, %location, units = %query.units(), "sending OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", query.units().as_param()),
            ])
            .timeout(timeout)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(%status, bytes = body.len(), "OpenWeather response received");

        Ok((status, body))
    }

    /// Secondary fetch for the condition icon. Any failure yields `None`.
    pub async fn fetch_icon(&self, icon_id: &str) -> Option<Icon> {
        if icon_id.is_empty() {
            return None;
        }

        let url = self.icon_url(icon_id);
        let res = match self.http.get(&url).timeout(ICON_TIMEOUT).send().await {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!(%url, "icon request failed: {e}");
                return None;
            }
        };

        if !res.status().is_success() {
            tracing::warn!(%url, status = %res.status(), "icon request rejected");
            return None;
        }

        match res.bytes().await {
            Ok(bytes) => Some(Icon {
                id: icon_id.to_string(),
                png: bytes.to_vec(),
            }),
            Err(e) => {
                tracing::warn!(%url, "failed to read icon body: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwErrorResponse {
    message: Option<String>,
}

impl OwCurrentResponse {
    fn into_current(self, location: String, query: &LocationQuery) -> CurrentWeatherResult {
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            FetchError::Provider("Provider response contained no weather conditions".to_string())
        })?;

        let description = capitalize(&condition.description);
        let animation_mode = AnimationMode::from_description(&description);

        Ok(CurrentWeather {
            location,
            units: query.units(),
            temperature: self.main.temp,
            feels_like: self.main.feels_like.unwrap_or(self.main.temp),
            description,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            country_code: self.sys.country.unwrap_or_default(),
            sunrise: local_time_of_day(self.sys.sunrise)?,
            sunset: local_time_of_day(self.sys.sunset)?,
            icon_id: condition.icon,
            icon: None,
            animation_mode,
        })
    }
}

impl OwForecastEntry {
    fn into_sample(self) -> Result<ForecastSample, FetchError> {
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            FetchError::Provider(format!(
                "Forecast entry at {} contained no weather conditions",
                self.dt
            ))
        })?;

        Ok(ForecastSample {
            timestamp: self.dt,
            temperature: self.main.temp,
            description: condition.description,
            icon_id: condition.icon,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, query: &LocationQuery) -> CurrentWeatherResult {
        let (status, body) = self.request("weather", query, CURRENT_TIMEOUT).await?;

        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(FetchError::Auth),
            StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound {
                    city: query.city().to_string(),
                });
            }
            _ => return Err(provider_failure(&body, "Unable to fetch weather")),
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        let mut current = parsed.into_current(query.composite_location(), query)?;
        current.icon = self.fetch_icon(&current.icon_id).await;

        tracing::info!(
            location = %current.location,
            mode = ?current.animation_mode,
            "current weather fetched"
        );
        Ok(current)
    }

    async fn fetch_forecast(&self, query: &LocationQuery) -> ForecastResult {
        let (status, body) = self.request("forecast", query, FORECAST_TIMEOUT).await?;

        if status != StatusCode::OK {
            return Err(provider_failure(&body, "Unable to fetch forecast"));
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        let samples = parsed
            .list
            .into_iter()
            .map(OwForecastEntry::into_sample)
            .collect::<Result<Vec<_>, _>>()?;

        let mut days = reduce_to_daily(&samples, &Local);

        // One after another; each failure only drops that day's icon.
        for day in &mut days {
            day.icon = self.fetch_icon(&day.icon_id).await;
        }

        tracing::info!(
            location = %query.composite_location(),
            samples = samples.len(),
            days = days.len(),
            "forecast fetched"
        );
        Ok(days)
    }
}

/// Failure for a non-200 status, preferring the provider's `message` field.
fn provider_failure(body: &str, fallback: &str) -> FetchError {
    let message = serde_json::from_str::<OwErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    FetchError::Provider(message)
}

fn local_time_of_day(ts: i64) -> Result<NaiveTime, FetchError> {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&Local).time())
        .ok_or_else(|| FetchError::Provider(format!("Timestamp {ts} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Units;

    #[test]
    fn icon_url_uses_double_resolution_asset() {
        let client = OpenWeatherClient::new("KEY".into())
            .with_endpoints("http://localhost:1234/", "http://icons.test/");
        assert_eq!(client.icon_url("10d"), "http://icons.test/img/wn/10d@2x.png");
        assert_eq!(client.base_url, "http://localhost:1234");
    }

    #[test]
    fn provider_failure_prefers_message_field() {
        let err = provider_failure(r#"{"cod":"500","message":"internal error"}"#, "fallback");
        assert_eq!(err, FetchError::Provider("internal error".into()));

        let err = provider_failure("<html>oops</html>", "fallback");
        assert_eq!(err, FetchError::Provider("fallback".into()));
    }

    #[test]
    fn current_response_defaults_missing_optional_fields() {
        let body = r#"{
            "main": {"temp": 4.0, "humidity": 80},
            "weather": [{"description": "light snow", "icon": "13n"}],
            "wind": {"speed": 1.5},
            "sys": {"sunrise": 1700000000, "sunset": 1700030000}
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        let query = LocationQuery::new("Oslo", None, Units::Metric).unwrap();
        let current = parsed.into_current("Oslo".into(), &query).unwrap();

        assert_eq!(current.feels_like, 4.0);
        assert_eq!(current.country_code, "");
        assert_eq!(current.description, "Light snow");
        assert_eq!(current.animation_mode, AnimationMode::Snow);
    }

    #[test]
    fn truncated_current_body_is_transport_error() {
        let err = serde_json::from_str::<OwCurrentResponse>(r#"{"main": {"temp": "#).unwrap_err();
        assert_eq!(FetchError::from(err).kind(), crate::ErrorKind::TransportError);
    }

    #[test]
    fn current_response_without_conditions_is_provider_error() {
        let body = r#"{
            "main": {"temp": 4.0, "humidity": 80},
            "weather": [],
            "wind": {"speed": 1.5},
            "sys": {"sunrise": 1700000000, "sunset": 1700030000}
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        let query = LocationQuery::new("Oslo", None, Units::Metric).unwrap();
        let err = parsed.into_current("Oslo".into(), &query).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ProviderError);
    }
}
